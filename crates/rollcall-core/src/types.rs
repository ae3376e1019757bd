//! Participant identity and template helpers shared across the engine.

use serde::{Deserialize, Serialize};

/// The substitution placeholder every message template carries.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Identifier of a chat participant, as reported by the transport.
///
/// Stored as a string so numeric chat ids and opaque handles share one
/// representation in the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A registered chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant identifier.
    pub id: ParticipantId,
    /// Text substituted for the placeholder. May carry markup (mentions).
    pub label: String,
}

/// Whether a template carries the name placeholder.
pub fn has_placeholder(template: &str) -> bool {
    template.contains(NAME_PLACEHOLDER)
}

/// Substitute a participant label into a template.
pub fn render_template(template: &str, label: &str) -> String {
    template.replace(NAME_PLACEHOLDER, label)
}
