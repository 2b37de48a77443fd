//! The event vocabulary shared by every product kind.
//!
//! All kinds persist the common subset; binding events belong to variable
//! products and child events to variable and grouping products. A kind
//! that receives an event outside its subset reports it as unknown, which
//! the repository surfaces as a corrupt stream.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use cataloger_attributes::{AttributeCode, AttributeId};
use cataloger_designer::TemplateId;
use cataloger_events::Event;

use crate::value::{CategoryId, ProductId, ProductKind, Sku};

/// Event: product created. Carries the full initial shape so creation is a
/// single business operation in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub kind: ProductKind,
    pub sku: Sku,
    pub template_id: TemplateId,
    pub categories: BTreeSet<CategoryId>,
    pub values: BTreeMap<AttributeCode, JsonValue>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: product moved to a different template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTemplateChanged {
    pub product_id: ProductId,
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: product added to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAddedToCategory {
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: product removed from a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRemovedFromCategory {
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: attribute value set for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductValueAdded {
    pub product_id: ProductId,
    pub attribute_code: AttributeCode,
    pub value: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

/// Event: existing attribute value replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductValueChanged {
    pub product_id: ProductId,
    pub attribute_code: AttributeCode,
    pub value: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

/// Event: attribute value removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductValueRemoved {
    pub product_id: ProductId,
    pub attribute_code: AttributeCode,
    pub occurred_at: DateTime<Utc>,
}

/// Event: variable product bound to a select attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBindingAdded {
    pub product_id: ProductId,
    pub attribute_id: AttributeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: binding attribute detached from a variable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductBindingRemoved {
    pub product_id: ProductId,
    pub attribute_id: AttributeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: child product attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChildAdded {
    pub product_id: ProductId,
    pub child_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: child product detached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChildRemoved {
    pub product_id: ProductId,
    pub child_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: product deleted (terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    Created(ProductCreated),
    TemplateChanged(ProductTemplateChanged),
    AddedToCategory(ProductAddedToCategory),
    RemovedFromCategory(ProductRemovedFromCategory),
    ValueAdded(ProductValueAdded),
    ValueChanged(ProductValueChanged),
    ValueRemoved(ProductValueRemoved),
    BindingAdded(ProductBindingAdded),
    BindingRemoved(ProductBindingRemoved),
    ChildAdded(ProductChildAdded),
    ChildRemoved(ProductChildRemoved),
    Deleted(ProductDeleted),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => "product.created",
            ProductEvent::TemplateChanged(_) => "product.template_changed",
            ProductEvent::AddedToCategory(_) => "product.added_to_category",
            ProductEvent::RemovedFromCategory(_) => "product.removed_from_category",
            ProductEvent::ValueAdded(_) => "product.value_added",
            ProductEvent::ValueChanged(_) => "product.value_changed",
            ProductEvent::ValueRemoved(_) => "product.value_removed",
            ProductEvent::BindingAdded(_) => "product.binding_added",
            ProductEvent::BindingRemoved(_) => "product.binding_removed",
            ProductEvent::ChildAdded(_) => "product.child_added",
            ProductEvent::ChildRemoved(_) => "product.child_removed",
            ProductEvent::Deleted(_) => "product.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::Created(e) => e.occurred_at,
            ProductEvent::TemplateChanged(e) => e.occurred_at,
            ProductEvent::AddedToCategory(e) => e.occurred_at,
            ProductEvent::RemovedFromCategory(e) => e.occurred_at,
            ProductEvent::ValueAdded(e) => e.occurred_at,
            ProductEvent::ValueChanged(e) => e.occurred_at,
            ProductEvent::ValueRemoved(e) => e.occurred_at,
            ProductEvent::BindingAdded(e) => e.occurred_at,
            ProductEvent::BindingRemoved(e) => e.occurred_at,
            ProductEvent::ChildAdded(e) => e.occurred_at,
            ProductEvent::ChildRemoved(e) => e.occurred_at,
            ProductEvent::Deleted(e) => e.occurred_at,
        }
    }
}

/// Event type tag of the terminal product event, shared by all kinds.
pub const PRODUCT_DELETED_EVENT: &str = "product.deleted";
