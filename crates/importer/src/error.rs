//! Import failures, wrapping core errors into source-row-facing messages.

use thiserror::Error;

use cataloger_core::DomainError;
use cataloger_infra::RepositoryError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("template '{0}' not found")]
    MissingTemplate(String),

    #[error("category '{0}' not found")]
    MissingCategory(String),

    #[error("product '{0}' already exists as a different kind")]
    KindMismatch(String),

    #[error("related product '{0}' not found")]
    RelatedProductNotFound(String),

    #[error("related product '{0}' is not a simple product")]
    RelatedProductIncorrectType(String),

    #[error("binding attribute '{0}' not found")]
    BindingAttributeNotFound(String),

    #[error("attribute '{0}' cannot be used as a binding")]
    IncorrectBindingAttribute(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
