use clap::{Args, Parser};
use std::path::PathBuf;
use toolhub_cache::KvCache;
use toolhub_core::{
    categories, featured, filter, Catalog, Config, ExportFormat, Exporter, FilterCriteria,
    JsonFileBackend, KeyValueBackend, Mark, MemoryBackend, SelectionStore, StorageBackend, Tool,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Store = SelectionStore<Box<dyn KeyValueBackend>>;

#[derive(Parser)]
#[command(name = "toolhub")]
#[command(version, about = "Browse, mark and export a catalog of AI tools", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TOOLHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Keep tried/saved marks in memory only for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List tools matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show all categories
    Categories,
    /// Show the featured tools
    Featured,
    /// Show details for one tool
    Show {
        /// Tool id
        id: String,
    },
    /// Mark a tool as tried
    Tried {
        /// Tool id
        id: String,
        /// Unmark instead
        #[arg(long)]
        remove: bool,
    },
    /// Mark a tool as saved
    Saved {
        /// Tool id
        id: String,
        /// Unmark instead
        #[arg(long)]
        remove: bool,
    },
    /// Catalog size and selection counts
    Stats,
    /// Export the filtered list as csv or pdf
    Export {
        /// Output format
        #[arg(value_enum)]
        format: FormatArg,
        #[command(flatten)]
        filters: FilterArgs,
        /// Directory to write into (defaults to the configured one)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Csv,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Case-insensitive text matched against name, description and category
    #[arg(short, long, default_value = "")]
    search: String,
    /// Only these categories (repeatable)
    #[arg(short, long)]
    category: Vec<String>,
    /// Only these pricing labels, e.g. "Free + Paid" (repeatable)
    #[arg(short, long)]
    pricing: Vec<String>,
    /// Minimum rating, inclusive
    #[arg(short = 'r', long, default_value_t = 0.0)]
    min_rating: f64,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new()
            .with_search(self.search.clone())
            .with_min_rating(self.min_rating);
        for c in &self.category {
            criteria.set_category(c, true);
        }
        for p in &self.pricing {
            criteria.set_pricing(p, true);
        }
        criteria
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolhub=info,toolhub_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let catalog = match &config.catalog.path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::bundled()?,
    };

    let Some(command) = cli.command else {
        println!("No command specified. Try --help");
        return Ok(());
    };

    match command {
        Commands::List { filters } => {
            let store = open_store(&config, cli.ephemeral)?;
            let criteria = filters.criteria();
            tracing::info!("Listing tools with {:?}", criteria);

            let visible = filter(catalog.tools(), &criteria);
            if visible.is_empty() {
                println!("No tools found. Try adjusting your search terms or filters.");
            } else {
                for tool in &visible {
                    print_row(tool, &store);
                }
                println!("\n{} of {} tools", visible.len(), catalog.len());
            }
        }
        Commands::Categories => {
            for category in categories(catalog.tools()) {
                println!("{}", category);
            }
        }
        Commands::Featured => {
            let store = open_store(&config, cli.ephemeral)?;
            for tool in featured(catalog.tools()) {
                print_row(&tool, &store);
            }
        }
        Commands::Show { id } => {
            let store = open_store(&config, cli.ephemeral)?;
            let tool = catalog.require(&id)?;
            print_details(tool, &store);
        }
        Commands::Tried { id, remove } => {
            let mut store = open_store(&config, cli.ephemeral)?;
            toggle(&catalog, &mut store, Mark::Tried, &id, !remove)?;
        }
        Commands::Saved { id, remove } => {
            let mut store = open_store(&config, cli.ephemeral)?;
            toggle(&catalog, &mut store, Mark::Saved, &id, !remove)?;
        }
        Commands::Stats => {
            let store = open_store(&config, cli.ephemeral)?;
            println!("{} tools", catalog.len());
            println!("{} tools tried", store.tried_count());
            println!("{} tools saved", store.saved_count());
        }
        Commands::Export {
            format,
            filters,
            out_dir,
        } => {
            let format = ExportFormat::from(format);
            let store = open_store(&config, cli.ephemeral)?;
            let visible = filter(catalog.tools(), &filters.criteria());
            let dir = out_dir.unwrap_or_else(|| config.export.output_dir.clone());

            // A failed export is reported, never fatal
            match Exporter::export_to_dir(format, &visible, store.tried(), store.saved(), &dir) {
                Ok(path) => {
                    println!("{} exported successfully!", format.label());
                    println!("{}", path.display());
                }
                Err(e) => {
                    tracing::error!("{} export error: {}", format.label(), e);
                    eprintln!("Failed to export {}", format.label());
                }
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config, ephemeral: bool) -> anyhow::Result<Store> {
    let backend = if ephemeral {
        StorageBackend::Memory
    } else {
        config.storage.backend
    };

    let backend: Box<dyn KeyValueBackend> = match backend {
        StorageBackend::Memory => Box::new(MemoryBackend::new()),
        StorageBackend::Json => Box::new(JsonFileBackend::open(config.storage.resolved_path()?)),
        StorageBackend::Sqlite => Box::new(KvCache::new(config.storage.resolved_path()?)?),
    };

    Ok(SelectionStore::load(backend))
}

fn toggle(
    catalog: &Catalog,
    store: &mut Store,
    mark: Mark,
    id: &str,
    included: bool,
) -> anyhow::Result<()> {
    let tool = catalog.require(id)?;

    let verb = if included { "marked" } else { "unmarked" };
    if store.set(mark, id, included) {
        println!("{} {} as {}", tool.name, verb, mark.label().to_lowercase());
    } else {
        println!("{} already {} as {}", tool.name, verb, mark.label().to_lowercase());
    }
    Ok(())
}

fn markers(tool: &Tool, store: &Store) -> String {
    format!(
        "[{}{}]",
        if store.is_tried(&tool.id) { 'T' } else { ' ' },
        if store.is_saved(&tool.id) { 'S' } else { ' ' },
    )
}

fn print_row(tool: &Tool, store: &Store) {
    println!(
        "{} {:<20} {:<18} {:<18} ⭐ {:.1}  ({})",
        markers(tool, store),
        tool.name,
        tool.category,
        tool.pricing,
        tool.rating,
        tool.id
    );
}

fn print_details(tool: &Tool, store: &Store) {
    println!("{}{}", tool.name, if tool.featured { "  [Featured]" } else { "" });
    println!("{}", tool.category);
    println!();
    println!("{}", tool.description);
    println!();
    println!("Rating:     {}/5", tool.rating);
    println!(
        "Popularity: {} ({}/100)",
        tool.popularity_level(),
        tool.popularity
    );
    println!("Pricing:    {} ({})", tool.pricing, tool.pricing_tier().label());
    println!("Link:       {}", tool.link);
    println!(
        "Tried:      {}",
        if store.is_tried(&tool.id) { "yes" } else { "no" }
    );
    println!(
        "Saved:      {}",
        if store.is_saved(&tool.id) { "yes" } else { "no" }
    );
}
