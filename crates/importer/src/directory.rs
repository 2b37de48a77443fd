//! SKU directory projection.
//!
//! Subscribes to product events and maintains the SKU to (id, kind) lookup
//! the import actions resolve related products through. State lives in
//! memory and is rebuilt by re-dispatching history.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use cataloger_events::{EventEnvelope, EventHandler};
use cataloger_products::{ProductEvent, ProductId, ProductKind, Sku};

use crate::query::ProductQuery;

#[derive(Debug, Default)]
struct DirectoryState {
    by_sku: HashMap<Sku, (ProductId, ProductKind)>,
    sku_by_id: HashMap<ProductId, Sku>,
}

/// Event handler keeping the product directory current.
#[derive(Debug, Default)]
pub struct ProductDirectory {
    state: RwLock<DirectoryState>,
}

impl ProductDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .map(|state| state.by_sku.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventHandler for ProductDirectory {
    fn name(&self) -> &'static str {
        "product-directory"
    }

    fn handle(&self, envelope: &EventEnvelope<JsonValue>) -> anyhow::Result<()> {
        match envelope.event_type() {
            "product.created" => {
                let event: ProductEvent = serde_json::from_value(envelope.payload().clone())?;
                let ProductEvent::Created(created) = event else {
                    anyhow::bail!("payload does not match its event type tag");
                };
                let mut state = self
                    .state
                    .write()
                    .map_err(|_| anyhow::anyhow!("directory lock poisoned"))?;
                state
                    .by_sku
                    .insert(created.sku.clone(), (created.product_id, created.kind));
                state.sku_by_id.insert(created.product_id, created.sku);
            }
            "product.deleted" => {
                let product_id = ProductId::new(envelope.aggregate_id());
                let mut state = self
                    .state
                    .write()
                    .map_err(|_| anyhow::anyhow!("directory lock poisoned"))?;
                if let Some(sku) = state.sku_by_id.remove(&product_id) {
                    state.by_sku.remove(&sku);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl ProductQuery for ProductDirectory {
    fn find_by_sku(&self, sku: &Sku) -> Option<(ProductId, ProductKind)> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.by_sku.get(sku).copied())
    }
}
