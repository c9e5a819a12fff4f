use serde::Serialize;
use std::fmt;

/// A player as the rest of the crate sees them: the display name used in the
/// pitch event and daily tables, and the numeric provider id when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerIdentity {
    pub name: String,
    pub id: Option<i64>,
}

impl PlayerIdentity {
    pub fn resolved(name: impl Into<String>, id: i64) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }

    /// The id as stored in the text `player_id` columns.
    pub fn id_text(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} ({})", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}
