//! Strongly-typed ID types for workflow entities.
//!
//! IDs are opaque strings. Freshly minted IDs are a prefixed ULID
//! (`node_01H...`), which keeps them unique and sortable by creation time,
//! but any non-empty string is accepted so that graphs loaded from storage
//! keep the identifiers they were saved with (`trigger-1`, nanoid values, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed string ID wrapper.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mints a new ID from a freshly generated ULID.
            #[must_use]
            pub fn generate() -> Self {
                Self::from_ulid(Ulid::new())
            }

            /// Creates a prefixed ID from a ULID.
            #[must_use]
            pub fn from_ulid(ulid: Ulid) -> Self {
                Self(format!("{}_{}", $prefix, ulid))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the ULID embedded in a minted ID, if this is one.
            #[must_use]
            pub fn ulid(&self) -> Option<Ulid> {
                let raw = self.0.strip_prefix(concat!($prefix, "_"))?;
                Ulid::from_str(raw).ok()
            }

            /// Returns the prefix used for minted IDs.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: "identifier must not be empty".to_string(),
                    });
                }
                Ok(Self(s.to_string()))
            }
        }

        // Stored ids go through the same blank check as parsed ones.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                String::deserialize(deserializer)?
                    .parse()
                    .map_err(serde::de::Error::custom)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<Ulid> for $name {
            fn from(ulid: Ulid) -> Self {
                Self::from_ulid(ulid)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_id!(
    /// Unique identifier for a workflow definition.
    WorkflowId,
    "wf"
);

define_id!(
    /// Unique identifier for a node within a workflow graph.
    NodeId,
    "node"
);

define_id!(
    /// Unique identifier for an edge within a workflow graph.
    EdgeId,
    "edge"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix() {
        let id = NodeId::generate();
        assert!(id.as_str().starts_with("node_"));
        assert!(id.ulid().is_some());
    }

    #[test]
    fn workflow_id_display_format() {
        let id = WorkflowId::generate();
        assert!(id.to_string().starts_with("wf_"));
    }

    #[test]
    fn stored_ids_parse_verbatim() {
        let id: NodeId = "trigger-1".parse().expect("should parse");
        assert_eq!(id, "trigger-1");
        assert!(id.ulid().is_none());
    }

    #[test]
    fn parse_rejects_blank() {
        let result: Result<EdgeId, _> = "   ".parse();
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "EdgeId");
    }

    #[test]
    fn generated_ids_are_distinct() {
        use std::collections::HashSet;

        let ids: HashSet<_> = (0..64).map(|_| EdgeId::generate()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = NodeId::from("action-1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"action-1\"");
        let parsed: NodeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }

    #[test]
    fn blank_ids_do_not_deserialize() {
        for raw in ["\"\"", "\"  \""] {
            let err = serde_json::from_str::<NodeId>(raw).unwrap_err();
            assert!(err.to_string().contains("must not be empty"), "{err}");
            assert!(serde_json::from_str::<EdgeId>(raw).is_err());
            assert!(serde_json::from_str::<WorkflowId>(raw).is_err());
        }
    }
}
