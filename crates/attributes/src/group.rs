//! Attribute group aggregate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cataloger_core::{
    AggregateId, AggregateRoot, AggregateState, DomainError, DomainResult,
    EventSourcedAggregate, UnknownEvent, ValueObject,
};
use cataloger_events::Event;

use crate::attribute::AttributeCode;

/// Attribute group identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeGroupId(pub AggregateId);

impl AttributeGroupId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AttributeGroupId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Per-language label, keyed by language tag (e.g. "en_GB").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedLabel(BTreeMap<String, String>);

impl TranslatedLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.0.insert(language.into(), label.into());
        self
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ValueObject for TranslatedLabel {}

/// Event: attribute group created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroupCreated {
    pub group_id: AttributeGroupId,
    pub code: AttributeCode,
    pub label: TranslatedLabel,
    pub occurred_at: DateTime<Utc>,
}

/// Event: attribute group label changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroupLabelChanged {
    pub group_id: AttributeGroupId,
    pub label: TranslatedLabel,
    pub occurred_at: DateTime<Utc>,
}

/// Event: attribute group deleted (terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroupDeleted {
    pub group_id: AttributeGroupId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeGroupEvent {
    Created(AttributeGroupCreated),
    LabelChanged(AttributeGroupLabelChanged),
    Deleted(AttributeGroupDeleted),
}

impl Event for AttributeGroupEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AttributeGroupEvent::Created(_) => "attribute.group.created",
            AttributeGroupEvent::LabelChanged(_) => "attribute.group.label_changed",
            AttributeGroupEvent::Deleted(_) => "attribute.group.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AttributeGroupEvent::Created(e) => e.occurred_at,
            AttributeGroupEvent::LabelChanged(e) => e.occurred_at,
            AttributeGroupEvent::Deleted(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: attribute group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    id: AttributeGroupId,
    code: Option<AttributeCode>,
    label: TranslatedLabel,
    created: bool,
    deleted: bool,
    state: AggregateState<AttributeGroupEvent>,
}

impl AttributeGroup {
    /// Domain factory: a brand-new group with its initial pending event.
    pub fn create(
        id: AttributeGroupId,
        code: AttributeCode,
        label: TranslatedLabel,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut group = <Self as EventSourcedAggregate>::blank(id.0);
        group.record(AttributeGroupEvent::Created(AttributeGroupCreated {
            group_id: id,
            code,
            label,
            occurred_at,
        }))?;
        Ok(group)
    }

    pub fn code(&self) -> Option<&AttributeCode> {
        self.code.as_ref()
    }

    pub fn label(&self) -> &TranslatedLabel {
        &self.label
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn ensure_live(&self) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.deleted {
            return Err(DomainError::conflict("attribute group is deleted"));
        }
        Ok(())
    }

    /// Replace the translated label; a no-op when nothing changes.
    pub fn change_label(
        &mut self,
        label: TranslatedLabel,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_live()?;
        if self.label == label {
            return Ok(());
        }
        self.record(AttributeGroupEvent::LabelChanged(AttributeGroupLabelChanged {
            group_id: self.id,
            label,
            occurred_at,
        }))
    }

    /// Mark the group as logically deleted (terminal).
    pub fn delete(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_live()?;
        self.record(AttributeGroupEvent::Deleted(AttributeGroupDeleted {
            group_id: self.id,
            occurred_at,
        }))
    }
}

impl AggregateRoot for AttributeGroup {
    type Id = AttributeGroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

impl EventSourcedAggregate for AttributeGroup {
    type Event = AttributeGroupEvent;

    const AGGREGATE_TYPE: &'static str = "attribute.group";

    fn blank(id: AggregateId) -> Self {
        Self {
            id: AttributeGroupId(id),
            code: None,
            label: TranslatedLabel::new(),
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
            AttributeGroupEvent::Created(e) => {
                self.id = e.group_id;
                self.code = Some(e.code.clone());
                self.label = e.label.clone();
                self.created = true;
            }
            AttributeGroupEvent::LabelChanged(e) => {
                self.label = e.label.clone();
            }
            AttributeGroupEvent::Deleted(_) => {
                self.deleted = true;
            }
        }
        Ok(())
    }

    fn deleted_event_type() -> Option<&'static str> {
        Some("attribute.group.deleted")
    }
}
