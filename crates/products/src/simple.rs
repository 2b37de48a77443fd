//! Simple product: a standalone sellable item.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use cataloger_core::{
    AggregateId, AggregateRoot, AggregateState, DomainResult, EventSourcedAggregate,
    UnknownEvent,
};
use cataloger_attributes::AttributeCode;
use cataloger_designer::TemplateId;
use cataloger_events::Event;

use crate::base::{BaseProduct, Product};
use crate::event::{ProductCreated, ProductEvent, PRODUCT_DELETED_EVENT};
use crate::value::{CategoryId, ProductId, ProductKind, Sku};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleProduct {
    base: BaseProduct,
    state: AggregateState<ProductEvent>,
}

impl SimpleProduct {
    /// Domain factory: a brand-new simple product with its initial pending
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
            kind: ProductKind::Simple,
            sku,
            template_id,
            categories,
            values,
            occurred_at,
        }))?;
        Ok(product)
    }

    pub fn kind(&self) -> ProductKind {
        ProductKind::Simple
    }
}

impl Product for SimpleProduct {
    fn base(&self) -> &BaseProduct {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseProduct {
        &mut self.base
    }
}

impl AggregateRoot for SimpleProduct {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        self.base.product_id_ref()
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

impl EventSourcedAggregate for SimpleProduct {
    type Event = ProductEvent;

    const AGGREGATE_TYPE: &'static str = "product.simple";

    fn blank(id: AggregateId) -> Self {
        Self {
            base: BaseProduct::blank(id),
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
        if let ProductEvent::Created(e) = event {
            if e.kind != ProductKind::Simple {
                return Err(UnknownEvent {
                    aggregate_type: Self::AGGREGATE_TYPE,
                    event_type: event.event_type().to_string(),
                });
            }
        }
        if self.base.apply_common(event) {
            Ok(())
        } else {
            Err(UnknownEvent {
                aggregate_type: Self::AGGREGATE_TYPE,
                event_type: event.event_type().to_string(),
            })
        }
    }

    fn deleted_event_type() -> Option<&'static str> {
        Some(PRODUCT_DELETED_EVENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ProductChildAdded;
    use serde_json::json;

    fn test_product() -> SimpleProduct {
        SimpleProduct::create(
            ProductId::new(AggregateId::new()),
            Sku::new("SNKRS-01").unwrap(),
            TemplateId::new(AggregateId::new()),
            BTreeSet::new(),
            BTreeMap::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_child_events() {
        let mut product = test_product();
        let event = ProductEvent::ChildAdded(ProductChildAdded {
            product_id: product.product_id(),
            child_id: ProductId::new(AggregateId::new()),
            occurred_at: Utc::now(),
        });

        let err = product.apply(&event).unwrap_err();
        assert_eq!(err.aggregate_type, "product.simple");
        assert_eq!(err.event_type, "product.child_added");
    }

    #[test]
    fn set_value_emits_added_then_changed() {
        let mut product = test_product();
        product.pop_events();
        let code = AttributeCode::new("color").unwrap();

        product
            .set_value(code.clone(), json!("red"), Utc::now())
            .unwrap();
        product
            .set_value(code.clone(), json!("blue"), Utc::now())
            .unwrap();
        product
            .set_value(code.clone(), json!("blue"), Utc::now())
            .unwrap();

        let events = product.pop_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProductEvent::ValueAdded(_)));
        assert!(matches!(events[1], ProductEvent::ValueChanged(_)));
        assert_eq!(product.base().value(&code), Some(&json!("blue")));
    }

    #[test]
    fn change_categories_emits_diff_events() {
        let a = CategoryId::new(AggregateId::new());
        let b = CategoryId::new(AggregateId::new());
        let c = CategoryId::new(AggregateId::new());
        let mut product = SimpleProduct::create(
            ProductId::new(AggregateId::new()),
            Sku::new("SNKRS-01").unwrap(),
            TemplateId::new(AggregateId::new()),
            [a, b].into_iter().collect(),
            BTreeMap::new(),
            Utc::now(),
        )
        .unwrap();
        product.pop_events();

        product
            .change_categories([b, c].into_iter().collect(), Utc::now())
            .unwrap();

        let events = product.pop_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| matches!(
            e,
            ProductEvent::RemovedFromCategory(r) if r.category_id == a
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            ProductEvent::AddedToCategory(r) if r.category_id == c
        )));
        assert_eq!(
            product.base().categories(),
            &[b, c].into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn pop_events_drains_once() {
        let mut product = test_product();
        assert_eq!(product.pop_events().len(), 1);
        assert!(product.pop_events().is_empty());
    }
}
