//! Grouping product: a curated bundle of simple products.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use cataloger_core::{
    AggregateId, AggregateRoot, AggregateState, DomainError, DomainResult,
    EventSourcedAggregate, UnknownEvent,
};
use cataloger_attributes::AttributeCode;
use cataloger_designer::TemplateId;
use cataloger_events::Event;

use crate::base::{BaseProduct, Product};
use crate::event::{
    ProductChildAdded, ProductChildRemoved, ProductCreated, ProductEvent,
    PRODUCT_DELETED_EVENT,
};
use crate::value::{CategoryId, ProductId, ProductKind, Sku};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingProduct {
    base: BaseProduct,
    children: BTreeSet<ProductId>,
    state: AggregateState<ProductEvent>,
}

impl GroupingProduct {
    /// Domain factory: a brand-new grouping product with its initial pending
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
            kind: ProductKind::Grouping,
            sku,
            template_id,
            categories,
            values,
            occurred_at,
        }))?;
        Ok(product)
    }

    pub fn kind(&self) -> ProductKind {
        ProductKind::Grouping
    }

    pub fn children(&self) -> &BTreeSet<ProductId> {
        &self.children
    }

    pub fn has_child(&self, child_id: ProductId) -> bool {
        self.children.contains(&child_id)
    }

    /// Add a product to the group. Only simple products qualify.
    pub fn add_child(
        &mut self,
        child_id: ProductId,
        child_kind: ProductKind,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.base().ensure_live()?;
        if child_kind != ProductKind::Simple {
            return Err(DomainError::validation(
                "grouping product children must be simple products",
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

impl Product for GroupingProduct {
    fn base(&self) -> &BaseProduct {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseProduct {
        &mut self.base
    }
}

impl AggregateRoot for GroupingProduct {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        self.base.product_id_ref()
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

impl EventSourcedAggregate for GroupingProduct {
    type Event = ProductEvent;

    const AGGREGATE_TYPE: &'static str = "product.grouping";

    fn blank(id: AggregateId) -> Self {
        Self {
            base: BaseProduct::blank(id),
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
            ProductEvent::Created(e) if e.kind != ProductKind::Grouping => {
                Err(UnknownEvent {
                    aggregate_type: Self::AGGREGATE_TYPE,
                    event_type: event.event_type().to_string(),
                })
            }
            ProductEvent::BindingAdded(_) | ProductEvent::BindingRemoved(_) => {
                Err(UnknownEvent {
                    aggregate_type: Self::AGGREGATE_TYPE,
                    event_type: event.event_type().to_string(),
                })
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
                self.base.apply_common(event);
                Ok(())
            }
        }
    }

    fn deleted_event_type() -> Option<&'static str> {
        Some(PRODUCT_DELETED_EVENT)
    }
}
