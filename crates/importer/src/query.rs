//! Lookup boundaries the import actions resolve codes through.
//!
//! Implementations are projections or read models; the actions only need
//! code-to-id resolution, never full aggregates.

use cataloger_attributes::{AttributeCode, AttributeId, AttributeKind};
use cataloger_designer::TemplateId;
use cataloger_products::{CategoryCode, CategoryId, ProductId, ProductKind, Sku};

pub trait ProductQuery: Send + Sync {
    fn find_by_sku(&self, sku: &Sku) -> Option<(ProductId, ProductKind)>;
}

pub trait TemplateQuery: Send + Sync {
    fn find_by_name(&self, name: &str) -> Option<TemplateId>;
}

pub trait CategoryQuery: Send + Sync {
    fn find_by_code(&self, code: &CategoryCode) -> Option<CategoryId>;
}

pub trait AttributeQuery: Send + Sync {
    fn find_by_code(&self, code: &AttributeCode) -> Option<(AttributeId, AttributeKind)>;
}
