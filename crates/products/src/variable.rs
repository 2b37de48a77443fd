//! Variable product: a parent whose variants are driven by select-attribute
//! bindings, with simple products as children.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use cataloger_core::{
    AggregateId, AggregateRoot, AggregateState, DomainError, DomainResult,
    EventSourcedAggregate, UnknownEvent,
};
use cataloger_attributes::{AttributeCode, AttributeId, AttributeKind};
use cataloger_designer::TemplateId;
use cataloger_events::Event;

use crate::base::{BaseProduct, Product};
use crate::event::{
    ProductBindingAdded, ProductBindingRemoved, ProductChildAdded, ProductChildRemoved,
    ProductCreated, ProductEvent, PRODUCT_DELETED_EVENT,
};
use crate::value::{CategoryId, ProductId, ProductKind, Sku};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableProduct {
    base: BaseProduct,
    bindings: BTreeSet<AttributeId>,
    children: BTreeSet<ProductId>,
    state: AggregateState<ProductEvent>,
}

impl VariableProduct {
    /// Domain factory: a brand-new variable product with its initial pending
    /// event.
    pub fn create(
        id: ProductId,
        sku: Sku,
        template_id: TemplateId,
        categories: BTreeSet<CategoryId>,
        values: BTreeMap<AttributeCode, JsonValue>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut product = <Self as EventSourcedAggregate>::blank(id.0);
        product.record(ProductEvent::Created(ProductCreated {
            product_id: id,
            kind: ProductKind::Variable,
            sku,
            template_id,
            categories,
            values,
            occurred_at,
        }))?;
        Ok(product)
    }

    pub fn kind(&self) -> ProductKind {
        ProductKind::Variable
    }

    pub fn bindings(&self) -> &BTreeSet<AttributeId> {
        &self.bindings
    }

    pub fn children(&self) -> &BTreeSet<ProductId> {
        &self.children
    }

    pub fn has_child(&self, child_id: ProductId) -> bool {
        self.children.contains(&child_id)
    }

    /// Bind a select attribute; variants are distinguished by its options.
    pub fn add_binding(
        &mut self,
        attribute_id: AttributeId,
        attribute_kind: AttributeKind,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if attribute_kind != AttributeKind::Select {
            return Err(DomainError::validation(
                "variable products bind only select attributes",
            ));
        }
        if self.bindings.contains(&attribute_id) {
            return Err(DomainError::conflict("attribute is already bound"));
        }
        let product_id = self.product_id();
        self.record(ProductEvent::BindingAdded(ProductBindingAdded {
            product_id,
            attribute_id,
            occurred_at,
        }))
    }

    pub fn remove_binding(
        &mut self,
        attribute_id: AttributeId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if !self.bindings.contains(&attribute_id) {
            return Err(DomainError::conflict("attribute is not bound"));
        }
        let product_id = self.product_id();
        self.record(ProductEvent::BindingRemoved(ProductBindingRemoved {
            product_id,
            attribute_id,
            occurred_at,
        }))
    }

    /// Attach a child variant. Only simple products qualify.
    pub fn add_child(
        &mut self,
        child_id: ProductId,
        child_kind: ProductKind,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if child_kind != ProductKind::Simple {
            return Err(DomainError::validation(
                "variable product children must be simple products",
            ));
        }
        if self.children.contains(&child_id) {
            return Err(DomainError::conflict("product is already a child"));
        }
        let product_id = self.product_id();
        self.record(ProductEvent::ChildAdded(ProductChildAdded {
            product_id,
            child_id,
            occurred_at,
        }))
    }

    pub fn remove_child(
        &mut self,
        child_id: ProductId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if !self.children.contains(&child_id) {
            return Err(DomainError::conflict("product is not a child"));
        }
        let product_id = self.product_id();
        self.record(ProductEvent::ChildRemoved(ProductChildRemoved {
            product_id,
            child_id,
            occurred_at,
        }))
    }
}

impl Product for VariableProduct {
    fn base(&self) -> &BaseProduct {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseProduct {
        &mut self.base
    }
}

impl AggregateRoot for VariableProduct {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        self.base.product_id_ref()
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

impl EventSourcedAggregate for VariableProduct {
    type Event = ProductEvent;

    const AGGREGATE_TYPE: &'static str = "product.variable";

    fn blank(id: AggregateId) -> Self {
        Self {
            base: BaseProduct::blank(id),
            bindings: BTreeSet::new(),
            children: BTreeSet::new(),
            state: AggregateState::new(),
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        self.base.product_id().0
    }

    fn state(&self) -> &AggregateState<Self::Event> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AggregateState<Self::Event> {
        &mut self.state
    }

    fn apply(&mut self, event: &Self::Event) -> Result<(), UnknownEvent> {
        match event {
            ProductEvent::Created(e) if e.kind != ProductKind::Variable => {
                Err(UnknownEvent {
                    aggregate_type: Self::AGGREGATE_TYPE,
                    event_type: event.event_type().to_string(),
                })
            }
            ProductEvent::BindingAdded(e) => {
                self.bindings.insert(e.attribute_id);
                Ok(())
            }
            ProductEvent::BindingRemoved(e) => {
                self.bindings.remove(&e.attribute_id);
                Ok(())
            }
            ProductEvent::ChildAdded(e) => {
                self.children.insert(e.child_id);
                Ok(())
            }
            ProductEvent::ChildRemoved(e) => {
                self.children.remove(&e.child_id);
                Ok(())
            }
            _ => {
                // Remaining variants all belong to the common subset.
                self.base.apply_common(event);
                Ok(())
            }
        }
    }

    fn deleted_event_type() -> Option<&'static str> {
        Some(PRODUCT_DELETED_EVENT)
    }
}
