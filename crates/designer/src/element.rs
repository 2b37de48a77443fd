//! Template elements: positioned building blocks of a product template.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use cataloger_core::{Entity, ValueObject};

/// Grid position of an element (top-left cell).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl ValueObject for Position {}

/// Grid footprint of an element.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ValueObject for Size {}

/// One element placed on a template.
///
/// Elements are entities identified by their grid position: changing an
/// element keeps its position and replaces the rest. `element_type` selects
/// the widget (e.g. "attribute", "section", "image"); `properties` carries
/// the type-specific configuration as opaque JSON, the same way it arrives
/// from the designer UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateElement {
    pub position: Position,
    pub size: Size,
    pub element_type: String,
    pub properties: JsonValue,
}

impl TemplateElement {
    pub fn new(
        position: Position,
        size: Size,
        element_type: impl Into<String>,
        properties: JsonValue,
    ) -> Self {
        Self {
            position,
            size,
            element_type: element_type.into(),
            properties,
        }
    }
}

impl Entity for TemplateElement {
    type Id = Position;

    fn id(&self) -> &Self::Id {
        &self.position
    }
}
