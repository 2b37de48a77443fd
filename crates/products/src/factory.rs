//! Product factory: first-time creation across kinds.
//!
//! Used only for brand-new products; rehydration goes through each kind's
//! blank-instance path in the repository.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use cataloger_core::DomainResult;
use cataloger_attributes::AttributeCode;
use cataloger_designer::TemplateId;

use crate::grouping::GroupingProduct;
use crate::simple::SimpleProduct;
use crate::value::{CategoryId, ProductId, ProductKind, Sku};
use crate::variable::VariableProduct;

/// A freshly created product of whichever kind the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyProduct {
    Simple(SimpleProduct),
    Variable(VariableProduct),
    Grouping(GroupingProduct),
}

impl AnyProduct {
    pub fn kind(&self) -> ProductKind {
        match self {
            AnyProduct::Simple(_) => ProductKind::Simple,
            AnyProduct::Variable(_) => ProductKind::Variable,
            AnyProduct::Grouping(_) => ProductKind::Grouping,
        }
    }

    pub fn into_simple(self) -> Option<SimpleProduct> {
        match self {
            AnyProduct::Simple(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_variable(self) -> Option<VariableProduct> {
        match self {
            AnyProduct::Variable(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_grouping(self) -> Option<GroupingProduct> {
        match self {
            AnyProduct::Grouping(p) => Some(p),
            _ => None,
        }
    }
}

pub struct ProductFactory;

impl ProductFactory {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        kind: ProductKind,
        id: ProductId,
        sku: Sku,
        template_id: TemplateId,
        categories: BTreeSet<CategoryId>,
        values: BTreeMap<AttributeCode, JsonValue>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<AnyProduct> {
        Ok(match kind {
            ProductKind::Simple => AnyProduct::Simple(SimpleProduct::create(
                id,
                sku,
                template_id,
                categories,
                values,
                occurred_at,
            )?),
            ProductKind::Variable => AnyProduct::Variable(VariableProduct::create(
                id,
                sku,
                template_id,
                categories,
                values,
                occurred_at,
            )?),
            ProductKind::Grouping => AnyProduct::Grouping(GroupingProduct::create(
                id,
                sku,
                template_id,
                categories,
                values,
                occurred_at,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cataloger_core::{AggregateId, AggregateRoot, EventSourcedAggregate};
    use crate::base::Product;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn factory_creates_the_requested_kind() {
        let product = ProductFactory::create(
            ProductKind::Variable,
            ProductId::new(AggregateId::new()),
            Sku::new("SNKRS-VAR").unwrap(),
            TemplateId::new(AggregateId::new()),
            BTreeSet::new(),
            BTreeMap::new(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(product.kind(), ProductKind::Variable);
        assert!(product.into_variable().is_some());
    }

    /// One observable mutation on a simple product.
    #[derive(Debug, Clone)]
    enum Mutation {
        SetValue(String, i64),
        RemoveValue(String),
        ChangeTemplate(u128),
        AddCategory(u128),
    }

    fn mutation_strategy() -> impl Strategy<Value = Mutation> {
        let code = prop::sample::select(vec!["color", "size", "weight", "material"]);
        prop_oneof![
            (code.clone(), any::<i64>()).prop_map(|(c, v)| Mutation::SetValue(c.to_string(), v)),
            code.prop_map(|c| Mutation::RemoveValue(c.to_string())),
            any::<u128>().prop_map(Mutation::ChangeTemplate),
            any::<u128>().prop_map(Mutation::AddCategory),
        ]
    }

    fn apply_mutation(product: &mut SimpleProduct, mutation: &Mutation) {
        let now = Utc::now();
        match mutation {
            Mutation::SetValue(code, v) => {
                let code = cataloger_attributes::AttributeCode::new(code.clone()).unwrap();
                product.set_value(code, json!(v), now).unwrap();
            }
            Mutation::RemoveValue(code) => {
                let code = cataloger_attributes::AttributeCode::new(code.clone()).unwrap();
                // Absent values are a caller error; skip those here.
                if product.base().value(&code).is_some() {
                    product.remove_value(code, now).unwrap();
                }
            }
            Mutation::ChangeTemplate(raw) => {
                let template =
                    TemplateId::new(AggregateId::from_uuid(uuid::Uuid::from_u128(*raw)));
                product.change_template(template, now).unwrap();
            }
            Mutation::AddCategory(raw) => {
                let category =
                    CategoryId::new(AggregateId::from_uuid(uuid::Uuid::from_u128(*raw)));
                let mut categories = product.base().categories().clone();
                categories.insert(category);
                product.change_categories(categories, now).unwrap();
            }
        }
    }

    proptest! {
        // Replay determinism: any mutation sequence replays to the same
        // observable state the live instance had.
        #[test]
        fn replay_matches_live_state(mutations in prop::collection::vec(mutation_strategy(), 0..16)) {
            let id = ProductId::new(AggregateId::new());
            let mut live = SimpleProduct::create(
                id,
                Sku::new("PROP-01").unwrap(),
                TemplateId::new(AggregateId::new()),
                BTreeSet::new(),
                BTreeMap::new(),
                Utc::now(),
            )
            .unwrap();
            for mutation in &mutations {
                apply_mutation(&mut live, mutation);
            }

            let history = live.pop_events();
            let event_count = history.len() as u64;
            let mut replayed = <SimpleProduct as EventSourcedAggregate>::blank(id.0);
            replayed.replay(history).unwrap();

            prop_assert_eq!(replayed.base(), live.base());
            prop_assert_eq!(replayed.version(), event_count);
            prop_assert!(!replayed.has_pending_events());
        }
    }
}
