//! JSON file I/O for catalogs and results

#![cfg(feature = "serde")]

use crate::catalog::Catalog;
use crate::result::PriceCalculationResult;
use crate::types::*;
use std::path::Path;

impl Catalog {
    /// Load a catalog from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let catalog = serde_json::from_slice(&bytes)
            .map_err(|e| EngineError::Config(format!("Failed to parse catalog: {}", e)))?;
        Ok(catalog)
    }

    /// Save the catalog to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize catalog: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

impl PriceCalculationResult {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize result: {}", e)))
    }

    /// Write the result as pretty-printed JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
