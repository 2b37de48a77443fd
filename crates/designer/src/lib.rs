//! `cataloger-designer`: product templates built from positioned elements.

pub mod element;
pub mod template;

pub use element::{Position, Size, TemplateElement};
pub use template::{
    MultimediaId, Template, TemplateCreated, TemplateDeleted, TemplateElementAdded,
    TemplateElementChanged, TemplateElementRemoved, TemplateEvent, TemplateId,
    TemplateImageAdded, TemplateImageRemoved, TemplateNameChanged,
};
