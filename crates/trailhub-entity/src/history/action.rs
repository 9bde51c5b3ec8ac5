//! The closed set of action kinds.

use serde::{Deserialize, Serialize};

/// Documented action kinds.
///
/// Entries store their action verbatim; this enum is the read-time
/// classification. Anything outside the set is displayed as an update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Cancel,
    Revision,
}

impl ActionKind {
    /// All kinds, in documentation order.
    pub const ALL: [ActionKind; 5] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Cancel,
        Self::Revision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Cancel => "cancel",
            Self::Revision => "revision",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "cancel" => Some(Self::Cancel),
            "revision" => Some(Self::Revision),
            _ => None,
        }
    }

    /// Classify a stored action string, defaulting to [`ActionKind::Update`].
    pub fn classify(s: &str) -> Self {
        Self::from_str(&s.trim().to_ascii_lowercase()).unwrap_or(Self::Update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_names() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_defaults_to_update() {
        assert_eq!(ActionKind::classify("archive"), ActionKind::Update);
        assert_eq!(ActionKind::classify(""), ActionKind::Update);
        assert_eq!(ActionKind::classify(" cancel "), ActionKind::Cancel);
        assert_eq!(ActionKind::classify("Delete"), ActionKind::Delete);
    }
}
