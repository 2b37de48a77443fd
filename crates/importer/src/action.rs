//! Import actions: create-or-update products from source rows.
//!
//! Each action resolves codes through the query boundaries, then goes
//! through the repository: an unknown SKU becomes a fresh aggregate, a
//! known one is loaded, reconciled against the row and saved. Store and
//! repository errors propagate; only lookup misses become import errors.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::instrument;

use cataloger_core::AggregateId;
use cataloger_attributes::{AttributeCode, AttributeId, AttributeKind};
use cataloger_designer::TemplateId;
use cataloger_infra::Repository;
use cataloger_products::{
    CategoryCode, CategoryId, GroupingProduct, Product, ProductId, ProductKind,
    SimpleProduct, Sku, VariableProduct,
};

use crate::error::ImportError;
use crate::query::{AttributeQuery, CategoryQuery, ProductQuery, TemplateQuery};

/// One source row describing a product, after field-level parsing.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub sku: Sku,
    pub template: String,
    pub categories: Vec<CategoryCode>,
    pub values: BTreeMap<AttributeCode, JsonValue>,
}

/// Lookup services shared by every product import action.
pub struct ImportContext<'a> {
    pub products: &'a dyn ProductQuery,
    pub templates: &'a dyn TemplateQuery,
    pub categories: &'a dyn CategoryQuery,
    pub attributes: &'a dyn AttributeQuery,
}

impl ImportContext<'_> {
    fn resolve_template(&self, name: &str) -> Result<TemplateId, ImportError> {
        self.templates
            .find_by_name(name)
            .ok_or_else(|| ImportError::MissingTemplate(name.to_string()))
    }

    fn resolve_categories(
        &self,
        codes: &[CategoryCode],
    ) -> Result<BTreeSet<CategoryId>, ImportError> {
        codes
            .iter()
            .map(|code| {
                self.categories
                    .find_by_code(code)
                    .ok_or_else(|| ImportError::MissingCategory(code.to_string()))
            })
            .collect()
    }

    fn resolve_binding(&self, code: &AttributeCode) -> Result<AttributeId, ImportError> {
        let (attribute_id, kind) = self
            .attributes
            .find_by_code(code)
            .ok_or_else(|| ImportError::BindingAttributeNotFound(code.to_string()))?;
        if kind != AttributeKind::Select {
            return Err(ImportError::IncorrectBindingAttribute(code.to_string()));
        }
        Ok(attribute_id)
    }

    fn resolve_simple_child(&self, sku: &Sku) -> Result<ProductId, ImportError> {
        let (child_id, kind) = self
            .products
            .find_by_sku(sku)
            .ok_or_else(|| ImportError::RelatedProductNotFound(sku.to_string()))?;
        if kind != ProductKind::Simple {
            return Err(ImportError::RelatedProductIncorrectType(sku.to_string()));
        }
        Ok(child_id)
    }

    fn existing_id(
        &self,
        sku: &Sku,
        expected_kind: ProductKind,
    ) -> Result<Option<ProductId>, ImportError> {
        match self.products.find_by_sku(sku) {
            None => Ok(None),
            Some((id, kind)) if kind == expected_kind => Ok(Some(id)),
            Some(_) => Err(ImportError::KindMismatch(sku.to_string())),
        }
    }
}

/// Imports simple products.
pub struct SimpleProductImportAction<R> {
    repository: R,
}

impl<R: Repository<SimpleProduct>> SimpleProductImportAction<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, ctx, row), fields(sku = %row.sku))]
    pub fn import(
        &self,
        ctx: &ImportContext<'_>,
        row: &ProductRow,
    ) -> Result<ProductId, ImportError> {
        let template_id = ctx.resolve_template(&row.template)?;
        let categories = ctx.resolve_categories(&row.categories)?;
        let now = Utc::now();

        let mut product = match ctx.existing_id(&row.sku, ProductKind::Simple)? {
            Some(id) => self
                .repository
                .load(id.0)?
                .ok_or_else(|| ImportError::RelatedProductNotFound(row.sku.to_string()))?,
            None => SimpleProduct::create(
                ProductId::new(AggregateId::new()),
                row.sku.clone(),
                template_id,
                categories.clone(),
                row.values.clone(),
                now,
            )?,
        };

        product.change_template(template_id, now)?;
        product.change_categories(categories, now)?;
        product.change_attributes(row.values.clone(), now)?;
        self.repository.save(&mut product)?;
        Ok(product.product_id())
    }
}

/// One source row describing a variable product.
#[derive(Debug, Clone)]
pub struct VariableProductRow {
    pub product: ProductRow,
    pub bindings: Vec<AttributeCode>,
    pub children: Vec<Sku>,
}

/// Imports variable products, reconciling bindings and children.
pub struct VariableProductImportAction<R> {
    repository: R,
}

impl<R: Repository<VariableProduct>> VariableProductImportAction<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, ctx, row), fields(sku = %row.product.sku))]
    pub fn import(
        &self,
        ctx: &ImportContext<'_>,
        row: &VariableProductRow,
    ) -> Result<ProductId, ImportError> {
        let template_id = ctx.resolve_template(&row.product.template)?;
        let categories = ctx.resolve_categories(&row.product.categories)?;
        let bindings: BTreeSet<AttributeId> = row
            .bindings
            .iter()
            .map(|code| ctx.resolve_binding(code))
            .collect::<Result<_, _>>()?;
        let children: BTreeSet<ProductId> = row
            .children
            .iter()
            .map(|sku| ctx.resolve_simple_child(sku))
            .collect::<Result<_, _>>()?;
        let now = Utc::now();

        let mut product = match ctx.existing_id(&row.product.sku, ProductKind::Variable)? {
            Some(id) => self
                .repository
                .load(id.0)?
                .ok_or_else(|| ImportError::RelatedProductNotFound(row.product.sku.to_string()))?,
            None => VariableProduct::create(
                ProductId::new(AggregateId::new()),
                row.product.sku.clone(),
                template_id,
                categories.clone(),
                row.product.values.clone(),
                now,
            )?,
        };

        product.change_template(template_id, now)?;
        product.change_categories(categories, now)?;
        product.change_attributes(row.product.values.clone(), now)?;

        let current_bindings = product.bindings().clone();
        for attribute_id in current_bindings.difference(&bindings) {
            product.remove_binding(*attribute_id, now)?;
        }
        for attribute_id in bindings.difference(&current_bindings) {
            product.add_binding(*attribute_id, AttributeKind::Select, now)?;
        }
        let current_children = product.children().clone();
        for child_id in current_children.difference(&children) {
            product.remove_child(*child_id, now)?;
        }
        for child_id in children.difference(&current_children) {
            product.add_child(*child_id, ProductKind::Simple, now)?;
        }

        self.repository.save(&mut product)?;
        Ok(product.product_id())
    }
}

/// One source row describing a grouping product.
#[derive(Debug, Clone)]
pub struct GroupingProductRow {
    pub product: ProductRow,
    pub children: Vec<Sku>,
}

/// Imports grouping products, reconciling group membership.
pub struct GroupingProductImportAction<R> {
    repository: R,
}

impl<R: Repository<GroupingProduct>> GroupingProductImportAction<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, ctx, row), fields(sku = %row.product.sku))]
    pub fn import(
        &self,
        ctx: &ImportContext<'_>,
        row: &GroupingProductRow,
    ) -> Result<ProductId, ImportError> {
        let template_id = ctx.resolve_template(&row.product.template)?;
        let categories = ctx.resolve_categories(&row.product.categories)?;
        let children: BTreeSet<ProductId> = row
            .children
            .iter()
            .map(|sku| ctx.resolve_simple_child(sku))
            .collect::<Result<_, _>>()?;
        let now = Utc::now();

        let mut product = match ctx.existing_id(&row.product.sku, ProductKind::Grouping)? {
            Some(id) => self
                .repository
                .load(id.0)?
                .ok_or_else(|| ImportError::RelatedProductNotFound(row.product.sku.to_string()))?,
            None => GroupingProduct::create(
                ProductId::new(AggregateId::new()),
                row.product.sku.clone(),
                template_id,
                categories.clone(),
                row.product.values.clone(),
                now,
            )?,
        };

        product.change_template(template_id, now)?;
        product.change_categories(categories, now)?;
        product.change_attributes(row.product.values.clone(), now)?;

        let current_children = product.children().clone();
        for child_id in current_children.difference(&children) {
            product.remove_child(*child_id, now)?;
        }
        for child_id in children.difference(&current_children) {
            product.add_child(*child_id, ProductKind::Simple, now)?;
        }

        self.repository.save(&mut product)?;
        Ok(product.product_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ProductDirectory;
    use cataloger_events::EventDispatcher;
    use cataloger_infra::{AggregateRepository, InMemoryEventStore};
    use std::collections::HashMap;
    use std::sync::Arc;

    struct FixedTemplates(HashMap<String, TemplateId>);

    impl TemplateQuery for FixedTemplates {
        fn find_by_name(&self, name: &str) -> Option<TemplateId> {
            self.0.get(name).copied()
        }
    }

    struct FixedCategories(HashMap<CategoryCode, CategoryId>);

    impl CategoryQuery for FixedCategories {
        fn find_by_code(&self, code: &CategoryCode) -> Option<CategoryId> {
            self.0.get(code).copied()
        }
    }

    struct FixedAttributes(HashMap<AttributeCode, (AttributeId, AttributeKind)>);

    impl AttributeQuery for FixedAttributes {
        fn find_by_code(&self, code: &AttributeCode) -> Option<(AttributeId, AttributeKind)> {
            self.0.get(code).copied()
        }
    }

    struct Fixture {
        store: Arc<InMemoryEventStore>,
        dispatcher: Arc<EventDispatcher>,
        directory: Arc<ProductDirectory>,
        templates: FixedTemplates,
        categories: FixedCategories,
        attributes: FixedAttributes,
        template_name: String,
    }

    impl Fixture {
        fn new() -> Self {
            let directory = Arc::new(ProductDirectory::new());
            let dispatcher = Arc::new(
                EventDispatcher::builder()
                    .subscribe("product.created", 0, directory.clone())
                    .subscribe("product.deleted", 0, directory.clone())
                    .build(),
            );
            let template_name = "Shoes".to_string();
            let templates = FixedTemplates(
                [(template_name.clone(), TemplateId::new(AggregateId::new()))]
                    .into_iter()
                    .collect(),
            );
            Self {
                store: Arc::new(InMemoryEventStore::new()),
                dispatcher,
                directory,
                templates,
                categories: FixedCategories(HashMap::new()),
                attributes: FixedAttributes(HashMap::new()),
                template_name,
            }
        }

        fn context(&self) -> ImportContext<'_> {
            ImportContext {
                products: self.directory.as_ref(),
                templates: &self.templates,
                categories: &self.categories,
                attributes: &self.attributes,
            }
        }

        fn simple_action(
            &self,
        ) -> SimpleProductImportAction<
            AggregateRepository<SimpleProduct, Arc<InMemoryEventStore>, Arc<EventDispatcher>>,
        > {
            SimpleProductImportAction::new(AggregateRepository::new(
                self.store.clone(),
                self.dispatcher.clone(),
            ))
        }

        fn variable_action(
            &self,
        ) -> VariableProductImportAction<
            AggregateRepository<VariableProduct, Arc<InMemoryEventStore>, Arc<EventDispatcher>>,
        > {
            VariableProductImportAction::new(AggregateRepository::new(
                self.store.clone(),
                self.dispatcher.clone(),
            ))
        }

        fn row(&self, sku: &str) -> ProductRow {
            ProductRow {
                sku: Sku::new(sku).unwrap(),
                template: self.template_name.clone(),
                categories: Vec::new(),
                values: BTreeMap::new(),
            }
        }
    }

    #[test]
    fn imports_a_new_simple_product_and_registers_it() {
        let fixture = Fixture::new();
        let action = fixture.simple_action();

        let id = action
            .import(&fixture.context(), &fixture.row("SNKRS-01"))
            .unwrap();

        assert_eq!(
            fixture
                .directory
                .find_by_sku(&Sku::new("SNKRS-01").unwrap()),
            Some((id, ProductKind::Simple))
        );
    }

    #[test]
    fn second_import_updates_instead_of_duplicating() {
        let fixture = Fixture::new();
        let action = fixture.simple_action();
        let first_id = action
            .import(&fixture.context(), &fixture.row("SNKRS-01"))
            .unwrap();

        let mut row = fixture.row("SNKRS-01");
        row.values.insert(
            AttributeCode::new("color").unwrap(),
            serde_json::json!("red"),
        );
        let second_id = action.import(&fixture.context(), &row).unwrap();

        assert_eq!(first_id, second_id);
        let repository: AggregateRepository<SimpleProduct, _, _> =
            AggregateRepository::new(fixture.store.clone(), fixture.dispatcher.clone());
        let product = repository.load(first_id.0).unwrap().unwrap();
        assert_eq!(
            product.base().value(&AttributeCode::new("color").unwrap()),
            Some(&serde_json::json!("red"))
        );
    }

    #[test]
    fn missing_template_fails_the_row() {
        let fixture = Fixture::new();
        let action = fixture.simple_action();
        let mut row = fixture.row("SNKRS-01");
        row.template = "Nope".to_string();

        let err = action.import(&fixture.context(), &row).unwrap_err();
        assert!(matches!(err, ImportError::MissingTemplate(_)));
    }

    #[test]
    fn variable_import_attaches_simple_children_and_select_bindings() {
        let mut fixture = Fixture::new();
        let color = AttributeCode::new("color").unwrap();
        fixture.attributes.0.insert(
            color.clone(),
            (AttributeId::new(AggregateId::new()), AttributeKind::Select),
        );
        fixture
            .simple_action()
            .import(&fixture.context(), &fixture.row("SNKRS-01"))
            .unwrap();

        let action = fixture.variable_action();
        let row = VariableProductRow {
            product: fixture.row("SNKRS-VAR"),
            bindings: vec![color],
            children: vec![Sku::new("SNKRS-01").unwrap()],
        };
        let id = action.import(&fixture.context(), &row).unwrap();

        let repository: AggregateRepository<VariableProduct, _, _> =
            AggregateRepository::new(fixture.store.clone(), fixture.dispatcher.clone());
        let product = repository.load(id.0).unwrap().unwrap();
        assert_eq!(product.children().len(), 1);
        assert_eq!(product.bindings().len(), 1);
    }

    #[test]
    fn non_select_binding_attribute_is_rejected() {
        let mut fixture = Fixture::new();
        let name = AttributeCode::new("name").unwrap();
        fixture.attributes.0.insert(
            name.clone(),
            (AttributeId::new(AggregateId::new()), AttributeKind::Text),
        );

        let action = fixture.variable_action();
        let row = VariableProductRow {
            product: fixture.row("SNKRS-VAR"),
            bindings: vec![name],
            children: Vec::new(),
        };

        let err = action.import(&fixture.context(), &row).unwrap_err();
        assert!(matches!(err, ImportError::IncorrectBindingAttribute(_)));
    }

    #[test]
    fn variable_child_must_resolve_to_a_simple_product() {
        let fixture = Fixture::new();
        fixture
            .variable_action()
            .import(
                &fixture.context(),
                &VariableProductRow {
                    product: fixture.row("SNKRS-VAR"),
                    bindings: Vec::new(),
                    children: Vec::new(),
                },
            )
            .unwrap();

        let row = VariableProductRow {
            product: fixture.row("SNKRS-PARENT"),
            bindings: Vec::new(),
            children: vec![Sku::new("SNKRS-VAR").unwrap()],
        };
        let err = fixture
            .variable_action()
            .import(&fixture.context(), &row)
            .unwrap_err();
        assert!(matches!(err, ImportError::RelatedProductIncorrectType(_)));

        let missing = VariableProductRow {
            product: fixture.row("SNKRS-PARENT"),
            bindings: Vec::new(),
            children: vec![Sku::new("GHOST-01").unwrap()],
        };
        let err = fixture
            .variable_action()
            .import(&fixture.context(), &missing)
            .unwrap_err();
        assert!(matches!(err, ImportError::RelatedProductNotFound(_)));
    }
}
