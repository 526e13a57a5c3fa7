//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`StageId`] with a [`Slug`] even though both are `String` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers - UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline execution run (one call to the engine's drive loop).
///
/// Generated fresh for every run; recorded on the `pipeline_run` span so all
/// activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers - String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a stage by its registered name within a pipeline.
    ///
    /// Stage names are unique per engine and are the keys of the transition table.
    StageId
}

impl StageId {
    /// Creates a stage identifier from a compile-time name.
    ///
    /// Stage implementations use this for their fixed names; an empty literal
    /// is a programming error and is caught in debug builds.
    pub fn from_static(name: &'static str) -> Self {
        debug_assert!(!name.is_empty(), "stage names must not be empty");
        Self(name.to_owned())
    }
}

string_id! {
    /// A filesystem-safe article slug: lowercase ASCII letters, digits and
    /// single hyphens, never starting or ending with a hyphen.
    ///
    /// Construct with [`Slug::sanitize`] to derive one from arbitrary text;
    /// [`Slug::new`] accepts the value verbatim.
    Slug
}

impl Slug {
    /// Derives a slug from free text, returning `None` when nothing usable remains.
    ///
    /// Runs of characters outside `[a-z0-9]` (after ASCII lowercasing) collapse
    /// into a single `-`.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let mut out = String::with_capacity(raw.len());
        let mut pending_dash = false;
        for c in raw.chars().map(|c| c.to_ascii_lowercase()) {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c);
            } else {
                pending_dash = true;
            }
        }
        Self::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_id_rejects_empty() {
        assert!(StageId::new("").is_none());
        assert_eq!(StageId::new("planning").unwrap().as_str(), "planning");
    }

    #[test]
    fn slug_keeps_already_safe_values() {
        assert_eq!(Slug::sanitize("rust-guide").unwrap().as_str(), "rust-guide");
    }

    #[test]
    fn slug_collapses_unsafe_runs() {
        let slug = Slug::sanitize("  Rust: A Guide / 2024!! ").unwrap();
        assert_eq!(slug.as_str(), "rust-a-guide-2024");
    }

    #[test]
    fn slug_strips_path_separators() {
        let slug = Slug::sanitize("../../etc/passwd").unwrap();
        assert_eq!(slug.as_str(), "etc-passwd");
    }

    #[test]
    fn slug_with_no_usable_characters_is_none() {
        assert!(Slug::sanitize("!!! ///").is_none());
        assert!(Slug::sanitize("").is_none());
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(PipelineRunId::new_random(), PipelineRunId::new_random());
    }
}
