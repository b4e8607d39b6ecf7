// Paginated checklist report
//
// Layout happens in millimetres from the top-left corner of an A4 page and is
// a plain value, so pagination can be checked without poking at PDF bytes.
// Rendering flips it into PDF user space (points, origin bottom-left).
use crate::{models::Tool, Result};
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeSet;
use tracing::debug;

pub const REPORT_TITLE: &str = "AI Tools Checklist";

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const LEFT_MARGIN_MM: f32 = 20.0;
pub const DETAIL_INDENT_MM: f32 = 25.0;
pub const TOP_MARGIN_MM: f32 = 20.0;
/// A tool block starting below this line goes to the next page
pub const BOTTOM_MARGIN_MM: f32 = 270.0;

const MM_TO_PT: f32 = 72.0 / 25.4;
const FONT_NAME: &str = "F1";

/// One piece of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    pub lines: Vec<TextLine>,
}

impl ReportPage {
    fn text(&mut self, x: f32, y: f32, font_size: f32, text: impl Into<String>) {
        self.lines.push(TextLine {
            x,
            y,
            font_size,
            text: text.into(),
        });
    }

    /// Does any line on this page start with `prefix`?
    pub fn contains(&self, prefix: &str) -> bool {
        self.lines.iter().any(|l| l.text.starts_with(prefix))
    }
}

/// Every page of the report, positioned but not yet rendered
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<ReportPage>,
}

/// "✓ Tried ⭐ Saved", one of the halves, or "Not marked"
pub fn report_status(tool_id: &str, tried: &BTreeSet<String>, saved: &BTreeSet<String>) -> String {
    let mut parts = Vec::with_capacity(2);
    if tried.contains(tool_id) {
        parts.push("✓ Tried");
    }
    if saved.contains(tool_id) {
        parts.push("⭐ Saved");
    }

    if parts.is_empty() {
        "Not marked".to_string()
    } else {
        parts.join(" ")
    }
}

/// Month/day/year without padding, like the en-US locale prints dates
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

impl ReportLayout {
    /// Lay out the summary and one block per tool
    pub fn build(
        tools: &[Tool],
        tried: &BTreeSet<String>,
        saved: &BTreeSet<String>,
        generated_on: NaiveDate,
    ) -> Self {
        let mut pages = Vec::new();
        let mut page = ReportPage::default();

        page.text(LEFT_MARGIN_MM, 20.0, 20.0, REPORT_TITLE);
        page.text(
            LEFT_MARGIN_MM,
            35.0,
            12.0,
            format!("Generated on: {}", format_report_date(generated_on)),
        );

        let mut y = 50.0;
        page.text(LEFT_MARGIN_MM, y, 14.0, "Summary:");
        y += 10.0;
        page.text(LEFT_MARGIN_MM, y, 10.0, format!("Total Tools: {}", tools.len()));
        y += 7.0;
        page.text(LEFT_MARGIN_MM, y, 10.0, format!("Tried: {}", tried.len()));
        y += 7.0;
        page.text(LEFT_MARGIN_MM, y, 10.0, format!("Saved: {}", saved.len()));
        y += 15.0;

        if !tools.is_empty() {
            page.text(LEFT_MARGIN_MM, y, 14.0, "Tools List:");
            y += 10.0;
        }

        for tool in tools {
            // Only checked between blocks, so a block is never split
            if y > BOTTOM_MARGIN_MM {
                pages.push(std::mem::take(&mut page));
                y = TOP_MARGIN_MM;
            }

            page.text(
                LEFT_MARGIN_MM,
                y,
                12.0,
                format!("{} ({})", tool.name, tool.category),
            );
            y += 7.0;

            page.text(
                DETAIL_INDENT_MM,
                y,
                10.0,
                format!("Status: {}", report_status(&tool.id, tried, saved)),
            );
            y += 5.0;
            page.text(DETAIL_INDENT_MM, y, 10.0, format!("Pricing: {}", tool.pricing));
            y += 5.0;
            page.text(DETAIL_INDENT_MM, y, 10.0, format!("Link: {}", tool.link));
            y += 10.0;
        }

        pages.push(page);
        debug!("Report laid out on {} page(s)", pages.len());
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Render to PDF bytes
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_NAME => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let page_id = Self::render_page(&mut doc, page, pages_id)?;
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            0.0f32.into(),
            0.0f32.into(),
            (PAGE_WIDTH_MM * MM_TO_PT).into(),
            (PAGE_HEIGHT_MM * MM_TO_PT).into(),
        ];
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn render_page(doc: &mut Document, page: &ReportPage, pages_id: ObjectId) -> Result<ObjectId> {
        let mut operations = Vec::with_capacity(page.lines.len() * 5);

        for line in &page.lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![FONT_NAME.into(), line.font_size.into()],
            ));
            operations.push(Operation::new(
                "Td",
                vec![
                    (line.x * MM_TO_PT).into(),
                    ((PAGE_HEIGHT_MM - line.y) * MM_TO_PT).into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))
    }
}

/// Characters WinAnsi puts in 0x80-0x9F, where Latin-1 has control codes
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// The standard fonts only cover WinAnsi; anything else becomes '?'
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        0x80..=0x9F => b'?',
        code @ 0x00..=0xFF => code as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, byte)| *byte)
            .unwrap_or(b'?'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(i: usize) -> Tool {
        Tool {
            id: format!("t{}", i),
            name: format!("Tool {}", i),
            category: "Chat".to_string(),
            pricing: "Free".to_string(),
            link: format!("https://t{}.example", i),
            description: String::new(),
            rating: 4.0,
            popularity: 50,
            featured: false,
        }
    }

    fn tools(n: usize) -> Vec<Tool> {
        (0..n).map(tool).collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn blocks_on(page: &ReportPage) -> usize {
        page.lines.iter().filter(|l| l.text.starts_with("Status: ")).count()
    }

    #[test]
    fn test_empty_report_is_summary_only() {
        let layout = ReportLayout::build(&[], &BTreeSet::new(), &BTreeSet::new(), date());
        assert_eq!(layout.page_count(), 1);

        let page = &layout.pages[0];
        let texts: Vec<&str> = page.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "AI Tools Checklist",
                "Generated on: 3/7/2026",
                "Summary:",
                "Total Tools: 0",
                "Tried: 0",
                "Saved: 0",
            ]
        );
        assert!(!page.contains("Tools List:"));
    }

    #[test]
    fn test_summary_counts_use_whole_sets() {
        // the tried/saved counts are of the sets, not of the filtered tools
        let layout = ReportLayout::build(&tools(1), &set(&["t0", "x", "y"]), &set(&["z"]), date());
        let page = &layout.pages[0];
        assert!(page.contains("Total Tools: 1"));
        assert!(page.contains("Tried: 3"));
        assert!(page.contains("Saved: 1"));
    }

    #[test]
    fn test_tool_block_lines() {
        let layout = ReportLayout::build(&tools(1), &set(&["t0"]), &set(&["t0"]), date());
        let lines = &layout.pages[0].lines;
        let block: Vec<(f32, f32, &str)> = lines[7..]
            .iter()
            .map(|l| (l.x, l.y, l.text.as_str()))
            .collect();

        assert_eq!(lines[6].text, "Tools List:");
        assert_eq!(lines[6].y, 89.0);
        assert_eq!(
            block,
            vec![
                (20.0, 99.0, "Tool 0 (Chat)"),
                (25.0, 106.0, "Status: ✓ Tried ⭐ Saved"),
                (25.0, 111.0, "Pricing: Free"),
                (25.0, 116.0, "Link: https://t0.example"),
            ]
        );
    }

    #[test]
    fn test_status_variants() {
        let tried = set(&["a"]);
        let saved = set(&["b"]);
        assert_eq!(report_status("a", &tried, &saved), "✓ Tried");
        assert_eq!(report_status("b", &tried, &saved), "⭐ Saved");
        assert_eq!(report_status("c", &tried, &saved), "Not marked");
    }

    #[test]
    fn test_pagination_boundaries() {
        let none = BTreeSet::new();

        // blocks start at 99, 126, ... 261 on page one; 288 overflows
        let layout = ReportLayout::build(&tools(7), &none, &none, date());
        assert_eq!(layout.page_count(), 1);
        assert_eq!(blocks_on(&layout.pages[0]), 7);

        let layout = ReportLayout::build(&tools(8), &none, &none, date());
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.pages[1].lines[0].y, TOP_MARGIN_MM);
        assert_eq!(layout.pages[1].lines[0].text, "Tool 7 (Chat)");

        // later pages hold ten blocks: 20, 47, ... 263
        let layout = ReportLayout::build(&tools(17), &none, &none, date());
        assert_eq!(layout.page_count(), 2);
        assert_eq!(blocks_on(&layout.pages[1]), 10);

        let layout = ReportLayout::build(&tools(18), &none, &none, date());
        assert_eq!(layout.page_count(), 3);
        assert_eq!(blocks_on(&layout.pages[2]), 1);
    }

    #[test]
    fn test_blocks_never_split_across_pages() {
        let none = BTreeSet::new();
        let layout = ReportLayout::build(&tools(40), &none, &none, date());

        for page in &layout.pages {
            let headers = page.lines.iter().filter(|l| l.text.ends_with("(Chat)")).count();
            assert_eq!(headers, blocks_on(page));
            assert_eq!(
                page.lines.iter().filter(|l| l.text.starts_with("Link: ")).count(),
                headers
            );
            assert!(page.lines.iter().all(|l| l.y < PAGE_HEIGHT_MM));
        }
        let total: usize = layout.pages.iter().map(blocks_on).sum();
        assert_eq!(total, 40);
    }

    #[test]
    fn test_date_format_is_unpadded() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(format_report_date(d), "10/18/2026");
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Café"), b"Caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("✓ Tried"), b"? Tried".to_vec());
    }

    #[test]
    fn test_win_ansi_high_range() {
        assert_eq!(encode_win_ansi("5€ — ok™"), b"5\x80 \x97 ok\x99".to_vec());
        assert_eq!(encode_win_ansi("“quoted”…"), b"\x93quoted\x94\x85".to_vec());
        // C1 control codes have no glyph
        assert_eq!(encode_win_ansi("a\u{0085}b"), b"a?b".to_vec());
    }

    #[test]
    fn test_render_produces_pdf_with_matching_pages() {
        let none = BTreeSet::new();
        let layout = ReportLayout::build(&tools(18), &none, &none, date());
        let bytes = layout.render().unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}
