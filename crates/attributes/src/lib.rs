//! `cataloger-attributes`: attribute identity and the attribute group
//! aggregate.

pub mod attribute;
pub mod group;

pub use attribute::{AttributeCode, AttributeId, AttributeKind};
pub use group::{
    AttributeGroup, AttributeGroupCreated, AttributeGroupDeleted, AttributeGroupEvent,
    AttributeGroupId, AttributeGroupLabelChanged, TranslatedLabel,
};
