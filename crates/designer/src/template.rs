//! Product template aggregate.
//!
//! A template is a named grid of elements that drives the product edit
//! screen. Elements are addressed by their grid position; at most one
//! element may occupy a position.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cataloger_core::{
    AggregateId, AggregateRoot, AggregateState, DomainError, DomainResult,
    EventSourcedAggregate, UnknownEvent,
};
use cataloger_events::Event;

use crate::element::{Position, TemplateElement};

/// Template identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub AggregateId);

impl TemplateId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a multimedia asset referenced by a template cover image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultimediaId(pub AggregateId);

impl MultimediaId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MultimediaId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Event: template created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCreated {
    pub template_id: TemplateId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: template renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateNameChanged {
    pub template_id: TemplateId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: cover image attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateImageAdded {
    pub template_id: TemplateId,
    pub image_id: MultimediaId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: cover image detached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateImageRemoved {
    pub template_id: TemplateId,
    pub image_id: MultimediaId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: element placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateElementAdded {
    pub template_id: TemplateId,
    pub element: TemplateElement,
    pub occurred_at: DateTime<Utc>,
}

/// Event: element at an occupied position replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateElementChanged {
    pub template_id: TemplateId,
    pub element: TemplateElement,
    pub occurred_at: DateTime<Utc>,
}

/// Event: element removed from the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateElementRemoved {
    pub template_id: TemplateId,
    pub position: Position,
    pub occurred_at: DateTime<Utc>,
}

/// Event: template deleted (terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDeleted {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateEvent {
    Created(TemplateCreated),
    NameChanged(TemplateNameChanged),
    ImageAdded(TemplateImageAdded),
    ImageRemoved(TemplateImageRemoved),
    ElementAdded(TemplateElementAdded),
    ElementChanged(TemplateElementChanged),
    ElementRemoved(TemplateElementRemoved),
    Deleted(TemplateDeleted),
}

impl Event for TemplateEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TemplateEvent::Created(_) => "designer.template.created",
            TemplateEvent::NameChanged(_) => "designer.template.name_changed",
            TemplateEvent::ImageAdded(_) => "designer.template.image_added",
            TemplateEvent::ImageRemoved(_) => "designer.template.image_removed",
            TemplateEvent::ElementAdded(_) => "designer.template.element_added",
            TemplateEvent::ElementChanged(_) => "designer.template.element_changed",
            TemplateEvent::ElementRemoved(_) => "designer.template.element_removed",
            TemplateEvent::Deleted(_) => "designer.template.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TemplateEvent::Created(e) => e.occurred_at,
            TemplateEvent::NameChanged(e) => e.occurred_at,
            TemplateEvent::ImageAdded(e) => e.occurred_at,
            TemplateEvent::ImageRemoved(e) => e.occurred_at,
            TemplateEvent::ElementAdded(e) => e.occurred_at,
            TemplateEvent::ElementChanged(e) => e.occurred_at,
            TemplateEvent::ElementRemoved(e) => e.occurred_at,
            TemplateEvent::Deleted(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: product template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    id: TemplateId,
    name: String,
    image: Option<MultimediaId>,
    elements: BTreeMap<Position, TemplateElement>,
    created: bool,
    deleted: bool,
    state: AggregateState<TemplateEvent>,
}

impl Template {
    /// Domain factory: a brand-new template with its initial pending event.
    pub fn create(
        id: TemplateId,
        name: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("template name must not be blank"));
        }
        let mut template = <Self as EventSourcedAggregate>::blank(id.0);
        template.record(TemplateEvent::Created(TemplateCreated {
            template_id: id,
            name,
            occurred_at,
        }))?;
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> Option<MultimediaId> {
        self.image
    }

    pub fn elements(&self) -> impl Iterator<Item = &TemplateElement> {
        self.elements.values()
    }

    pub fn element_at(&self, position: Position) -> Option<&TemplateElement> {
        self.elements.get(&position)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn ensure_live(&self) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.deleted {
            return Err(DomainError::conflict("template is deleted"));
        }
        Ok(())
    }

    /// Rename the template; a no-op when the name is unchanged.
    pub fn change_name(
        &mut self,
        name: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_live()?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("template name must not be blank"));
        }
        if self.name == name {
            return Ok(());
        }
        self.record(TemplateEvent::NameChanged(TemplateNameChanged {
            template_id: self.id,
            name,
            occurred_at,
        }))
    }

    /// Attach a cover image. Replacing an existing image requires removing
    /// it first.
    pub fn add_image(
        &mut self,
        image_id: MultimediaId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_live()?;
        if self.image.is_some() {
            return Err(DomainError::conflict("template already has an image"));
        }
        self.record(TemplateEvent::ImageAdded(TemplateImageAdded {
            template_id: self.id,
            image_id,
            occurred_at,
        }))
    }

    pub fn remove_image(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_live()?;
        let Some(image_id) = self.image else {
            return Err(DomainError::conflict("template has no image"));
        };
        self.record(TemplateEvent::ImageRemoved(TemplateImageRemoved {
            template_id: self.id,
            image_id,
            occurred_at,
        }))
    }

    /// Place an element on a free grid position.
    pub fn add_element(
        &mut self,
        element: TemplateElement,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_live()?;
        if self.elements.contains_key(&element.position) {
            return Err(DomainError::conflict(format!(
                "position ({}, {}) is already occupied",
                element.position.x, element.position.y
            )));
        }
        self.record(TemplateEvent::ElementAdded(TemplateElementAdded {
            template_id: self.id,
            element,
            occurred_at,
        }))
    }

    /// Replace the element at an occupied grid position.
    pub fn change_element(
        &mut self,
        element: TemplateElement,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_live()?;
        match self.elements.get(&element.position) {
            None => Err(DomainError::conflict(format!(
                "no element at position ({}, {})",
                element.position.x, element.position.y
            ))),
            Some(current) if *current == element => Ok(()),
            Some(_) => self.record(TemplateEvent::ElementChanged(TemplateElementChanged {
                template_id: self.id,
                element,
                occurred_at,
            })),
        }
    }

    pub fn remove_element(
        &mut self,
        position: Position,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_live()?;
        if !self.elements.contains_key(&position) {
            return Err(DomainError::conflict(format!(
                "no element at position ({}, {})",
                position.x, position.y
            )));
        }
        self.record(TemplateEvent::ElementRemoved(TemplateElementRemoved {
            template_id: self.id,
            position,
            occurred_at,
        }))
    }

    /// Mark the template as logically deleted (terminal).
    pub fn delete(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_live()?;
        self.record(TemplateEvent::Deleted(TemplateDeleted {
            template_id: self.id,
            occurred_at,
        }))
    }
}

impl AggregateRoot for Template {
    type Id = TemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

impl EventSourcedAggregate for Template {
    type Event = TemplateEvent;

    const AGGREGATE_TYPE: &'static str = "designer.template";

    fn blank(id: AggregateId) -> Self {
        Self {
            id: TemplateId(id),
            name: String::new(),
            image: None,
            elements: BTreeMap::new(),
            created: false,
            deleted: false,
            state: AggregateState::new(),
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        self.id.0
    }

    fn state(&self) -> &AggregateState<Self::Event> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AggregateState<Self::Event> {
        &mut self.state
    }

    fn apply(&mut self, event: &Self::Event) -> Result<(), UnknownEvent> {
        match event {
            TemplateEvent::Created(e) => {
                self.id = e.template_id;
                self.name = e.name.clone();
                self.created = true;
            }
            TemplateEvent::NameChanged(e) => {
                self.name = e.name.clone();
            }
            TemplateEvent::ImageAdded(e) => {
                self.image = Some(e.image_id);
            }
            TemplateEvent::ImageRemoved(_) => {
                self.image = None;
            }
            TemplateEvent::ElementAdded(e) => {
                self.elements.insert(e.element.position, e.element.clone());
            }
            TemplateEvent::ElementChanged(e) => {
                self.elements.insert(e.element.position, e.element.clone());
            }
            TemplateEvent::ElementRemoved(e) => {
                self.elements.remove(&e.position);
            }
            TemplateEvent::Deleted(_) => {
                self.deleted = true;
            }
        }
        Ok(())
    }

    fn deleted_event_type() -> Option<&'static str> {
        Some("designer.template.deleted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Size;
    use serde_json::json;

    fn test_template() -> Template {
        Template::create(
            TemplateId::new(AggregateId::new()),
            "Shoes",
            Utc::now(),
        )
        .unwrap()
    }

    fn attribute_element(x: u32, y: u32) -> TemplateElement {
        TemplateElement::new(
            Position::new(x, y),
            Size::new(2, 1),
            "attribute",
            json!({ "attribute_code": "color", "required": false }),
        )
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Template::create(TemplateId::new(AggregateId::new()), "  ", Utc::now());
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn add_element_rejects_occupied_position() {
        let mut template = test_template();
        template
            .add_element(attribute_element(0, 0), Utc::now())
            .unwrap();

        let err = template
            .add_element(attribute_element(0, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn change_element_requires_existing_element() {
        let mut template = test_template();
        let err = template
            .change_element(attribute_element(3, 4), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn change_element_to_same_value_is_a_no_op() {
        let mut template = test_template();
        template
            .add_element(attribute_element(1, 1), Utc::now())
            .unwrap();
        template.pop_events();

        template
            .change_element(attribute_element(1, 1), Utc::now())
            .unwrap();
        assert!(!template.has_pending_events());
    }

    #[test]
    fn second_image_requires_removing_the_first() {
        let mut template = test_template();
        let first = MultimediaId::new(AggregateId::new());
        template.add_image(first, Utc::now()).unwrap();

        let err = template
            .add_image(MultimediaId::new(AggregateId::new()), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        template.remove_image(Utc::now()).unwrap();
        template
            .add_image(MultimediaId::new(AggregateId::new()), Utc::now())
            .unwrap();
    }

    #[test]
    fn replay_rebuilds_grid_and_version() {
        let mut source = test_template();
        source
            .add_element(attribute_element(0, 0), Utc::now())
            .unwrap();
        source
            .add_element(attribute_element(0, 1), Utc::now())
            .unwrap();
        source
            .remove_element(Position::new(0, 0), Utc::now())
            .unwrap();
        let id = *source.id();
        let history = source.pop_events();

        let mut replayed = <Template as EventSourcedAggregate>::blank(id.0);
        replayed.replay(history).unwrap();

        assert_eq!(replayed.version(), 4);
        assert!(replayed.element_at(Position::new(0, 0)).is_none());
        assert!(replayed.element_at(Position::new(0, 1)).is_some());
        assert!(!replayed.has_pending_events());
    }

    #[test]
    fn deleted_template_rejects_element_changes() {
        let mut template = test_template();
        template.delete(Utc::now()).unwrap();

        let err = template
            .add_element(attribute_element(0, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
