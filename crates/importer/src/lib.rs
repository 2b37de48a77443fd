//! `cataloger-importer`: create-or-update import actions over the
//! repository boundary, plus the SKU directory projection that feeds them.

pub mod action;
pub mod directory;
pub mod error;
pub mod query;

pub use action::{
    GroupingProductImportAction, GroupingProductRow, ImportContext, ProductRow,
    SimpleProductImportAction, VariableProductImportAction, VariableProductRow,
};
pub use directory::ProductDirectory;
pub use error::ImportError;
pub use query::{AttributeQuery, CategoryQuery, ProductQuery, TemplateQuery};
