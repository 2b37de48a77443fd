//! State and behaviour shared by every product kind.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use cataloger_core::{
    AggregateId, AggregateRoot, DomainError, DomainResult, EventSourcedAggregate,
};
use cataloger_attributes::AttributeCode;
use cataloger_designer::TemplateId;

use crate::event::{
    ProductAddedToCategory, ProductDeleted, ProductEvent, ProductRemovedFromCategory,
    ProductTemplateChanged, ProductValueAdded, ProductValueChanged, ProductValueRemoved,
};
use crate::value::{CategoryId, ProductId, Sku};

/// The fields every product kind maintains from the common event subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseProduct {
    id: ProductId,
    sku: Option<Sku>,
    template: Option<TemplateId>,
    categories: BTreeSet<CategoryId>,
    values: BTreeMap<AttributeCode, JsonValue>,
    created: bool,
    deleted: bool,
}

impl BaseProduct {
    pub(crate) fn blank(id: AggregateId) -> Self {
        Self {
            id: ProductId(id),
            sku: None,
            template: None,
            categories: BTreeSet::new(),
            values: BTreeMap::new(),
            created: false,
            deleted: false,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.id
    }

    pub(crate) fn product_id_ref(&self) -> &ProductId {
        &self.id
    }

    pub fn sku(&self) -> Option<&Sku> {
        self.sku.as_ref()
    }

    pub fn template(&self) -> Option<TemplateId> {
        self.template
    }

    pub fn categories(&self) -> &BTreeSet<CategoryId> {
        &self.categories
    }

    pub fn value(&self, attribute_code: &AttributeCode) -> Option<&JsonValue> {
        self.values.get(attribute_code)
    }

    pub fn values(&self) -> &BTreeMap<AttributeCode, JsonValue> {
        &self.values
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn ensure_live(&self) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.deleted {
            return Err(DomainError::conflict("product is deleted"));
        }
        Ok(())
    }

    /// Applies an event from the common subset. Returns `false` for the
    /// kind-specific variants so callers can handle or reject them.
    pub(crate) fn apply_common(&mut self, event: &ProductEvent) -> bool {
        match event {
            ProductEvent::Created(e) => {
                self.id = e.product_id;
                self.sku = Some(e.sku.clone());
                self.template = Some(e.template_id);
                self.categories = e.categories.clone();
                self.values = e.values.clone();
                self.created = true;
                true
            }
            ProductEvent::TemplateChanged(e) => {
                self.template = Some(e.template_id);
                true
            }
            ProductEvent::AddedToCategory(e) => {
                self.categories.insert(e.category_id);
                true
            }
            ProductEvent::RemovedFromCategory(e) => {
                self.categories.remove(&e.category_id);
                true
            }
            ProductEvent::ValueAdded(e) => {
                self.values.insert(e.attribute_code.clone(), e.value.clone());
                true
            }
            ProductEvent::ValueChanged(e) => {
                self.values.insert(e.attribute_code.clone(), e.value.clone());
                true
            }
            ProductEvent::ValueRemoved(e) => {
                self.values.remove(&e.attribute_code);
                true
            }
            ProductEvent::Deleted(_) => {
                self.deleted = true;
                true
            }
            ProductEvent::BindingAdded(_)
            | ProductEvent::BindingRemoved(_)
            | ProductEvent::ChildAdded(_)
            | ProductEvent::ChildRemoved(_) => false,
        }
    }
}

/// Behaviour common to every product kind, provided on top of the shared
/// base state. Mutations validate against current state and enqueue exactly
/// one pending event per logical change.
pub trait Product:
    EventSourcedAggregate<Event = ProductEvent> + AggregateRoot<Id = ProductId>
{
    fn base(&self) -> &BaseProduct;
    fn base_mut(&mut self) -> &mut BaseProduct;

    fn product_id(&self) -> ProductId {
        self.base().product_id()
    }

    /// Move the product to another template; a no-op when unchanged.
    fn change_template(
        &mut self,
        template_id: TemplateId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if self.base().template() == Some(template_id) {
            return Ok(());
        }
        let product_id = self.product_id();
        self.record(ProductEvent::TemplateChanged(ProductTemplateChanged {
            product_id,
            template_id,
            occurred_at,
        }))
    }

    /// Reconcile category membership against a target set, emitting one
    /// add/remove event per difference.
    fn change_categories(
        &mut self,
        categories: BTreeSet<CategoryId>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        let product_id = self.product_id();
        let current = self.base().categories().clone();
        for category_id in current.difference(&categories).copied() {
            self.record(ProductEvent::RemovedFromCategory(ProductRemovedFromCategory {
                product_id,
                category_id,
                occurred_at,
            }))?;
        }
        for category_id in categories.difference(&current).copied() {
            self.record(ProductEvent::AddedToCategory(ProductAddedToCategory {
                product_id,
                category_id,
                occurred_at,
            }))?;
        }
        Ok(())
    }

    /// Set one attribute value. Emits added or changed depending on current
    /// state; a no-op when the value is already in place.
    fn set_value(
        &mut self,
        attribute_code: AttributeCode,
        value: JsonValue,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        let product_id = self.product_id();
        match self.base().value(&attribute_code) {
            Some(current) if *current == value => Ok(()),
            Some(_) => self.record(ProductEvent::ValueChanged(ProductValueChanged {
                product_id,
                attribute_code,
                value,
                occurred_at,
            })),
            None => self.record(ProductEvent::ValueAdded(ProductValueAdded {
                product_id,
                attribute_code,
                value,
                occurred_at,
            })),
        }
    }

    fn remove_value(
        &mut self,
        attribute_code: AttributeCode,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if self.base().value(&attribute_code).is_none() {
            return Err(DomainError::conflict(format!(
                "product has no value for attribute '{attribute_code}'"
            )));
        }
        let product_id = self.product_id();
        self.record(ProductEvent::ValueRemoved(ProductValueRemoved {
            product_id,
            attribute_code,
            occurred_at,
        }))
    }

    /// Reconcile attribute values against a target map, emitting one
    /// added/changed/removed event per difference.
    fn change_attributes(
        &mut self,
        values: BTreeMap<AttributeCode, JsonValue>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        let current = self.base().values().clone();
        for attribute_code in current.keys() {
            if !values.contains_key(attribute_code) {
                self.remove_value(attribute_code.clone(), occurred_at)?;
            }
        }
        for (attribute_code, value) in values {
            self.set_value(attribute_code, value, occurred_at)?;
        }
        Ok(())
    }

    /// Mark the product as logically deleted (terminal).
    fn delete(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.base().ensure_live()?;
        let product_id = self.product_id();
        self.record(ProductEvent::Deleted(ProductDeleted {
            product_id,
            occurred_at,
        }))
    }
}
