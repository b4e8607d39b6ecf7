// Static tool catalog - loaded once, never mutated
use crate::{models::Tool, Error, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Catalog compiled into the binary
const BUNDLED_CATALOG: &str = include_str!("../data/tools.json");

/// The full, ordered list of tools
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: Vec<Tool>,
}

impl Catalog {
    /// The catalog shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Load a catalog from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::CatalogError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&contents)?;
        info!("Loaded {} tools from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse and validate a JSON array of tools
    pub fn from_json(json: &str) -> Result<Self> {
        let tools: Vec<Tool> = serde_json::from_str(json)
            .map_err(|e| Error::CatalogError(format!("Failed to parse catalog: {}", e)))?;
        Self::from_tools(tools)
    }

    pub fn from_tools(tools: Vec<Tool>) -> Result<Self> {
        Self::validate(&tools)?;
        debug!("Catalog ready with {} tools", tools.len());
        Ok(Self { tools })
    }

    fn validate(tools: &[Tool]) -> Result<()> {
        let mut seen = HashSet::new();

        for tool in tools {
            if tool.id.trim().is_empty() {
                return Err(Error::CatalogError(format!(
                    "Tool '{}' has an empty id",
                    tool.name
                )));
            }
            if !seen.insert(tool.id.as_str()) {
                return Err(Error::CatalogError(format!("Duplicate tool id: {}", tool.id)));
            }
            if !(0.0..=5.0).contains(&tool.rating) {
                return Err(Error::CatalogError(format!(
                    "Rating {} of '{}' is outside 0-5",
                    tool.rating, tool.id
                )));
            }
            if tool.popularity > 100 {
                return Err(Error::CatalogError(format!(
                    "Popularity {} of '{}' is outside 0-100",
                    tool.popularity, tool.id
                )));
            }
        }

        Ok(())
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Like `get`, but a missing id is an error
    pub fn require(&self, id: &str) -> Result<&Tool> {
        self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
