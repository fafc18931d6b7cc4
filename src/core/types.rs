//! Common types used across rhop modules.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Capability kind a plugin belongs to.
///
/// The category of a plugin is derived from the capability contract it
/// implements and cannot be set independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Category {
    /// Row-transforming units used in pipelines
    Transform,
    /// Task-executing units used in workflows
    Action,
}

impl Category {
    /// All categories known to this build.
    pub const ALL: [Category; 2] = [Category::Transform, Category::Action];

    /// The category name as it appears in listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Transform => "Transform",
            Category::Action => "Action",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Transform" => Ok(Category::Transform),
            "Action" => Ok(Category::Action),
            other => Err(format!("unknown plugin category '{}'", other)),
        }
    }
}
