use super::ProductCatalog;
use crate::error::{PersonalizationError, Result};
use crate::models::Product;
use crate::services::profile_builder::ProductTagger;
use std::path::Path;
use tracing::info;

/// Catalog held in memory. Products are tagged with season and occasion
/// when the catalog is built.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: ProductTagger::new().tag_all(products),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Ok(Self::new(products))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PersonalizationError::Catalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;

        info!(
            path = %path.display(),
            products = catalog.products.len(),
            "Loaded product catalog"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn list(&self) -> Vec<Product> {
        self.products.clone()
    }
}
