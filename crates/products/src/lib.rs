//! `cataloger-products`: simple, variable and grouping product aggregates
//! sharing one event vocabulary.

pub mod base;
pub mod event;
pub mod factory;
pub mod grouping;
pub mod simple;
pub mod value;
pub mod variable;

pub use base::{BaseProduct, Product};
pub use event::{
    ProductAddedToCategory, ProductBindingAdded, ProductBindingRemoved, ProductChildAdded,
    ProductChildRemoved, ProductCreated, ProductDeleted, ProductEvent,
    ProductRemovedFromCategory, ProductTemplateChanged, ProductValueAdded,
    ProductValueChanged, ProductValueRemoved, PRODUCT_DELETED_EVENT,
};
pub use factory::{AnyProduct, ProductFactory};
pub use grouping::GroupingProduct;
pub use simple::SimpleProduct;
pub use value::{CategoryCode, CategoryId, ProductId, ProductKind, Sku};
pub use variable::VariableProduct;
