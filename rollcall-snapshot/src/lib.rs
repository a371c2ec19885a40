//! Read-only access to a published community snapshot.
//!
//! The snapshot is one JSON document describing VRC worlds, VRC groups and
//! Discord servers, with users referenced by their position in a shared
//! display-name table. Lookups never fail loudly: malformed or missing data
//! reads as `None` or `false`.

mod accessors;
mod error;
mod file_time;
mod models;
mod path;
mod queries;

pub use error::{LookupError, Result, SnapshotError};
pub use file_time::file_time_to_utc;
pub use models::{Kind, Permission, Platform};

use serde_json::Value;
use tracing::trace;

use crate::path::{Step, walk};

/// An immutable, parsed snapshot document.
///
/// A new fetch produces a new `Snapshot`; an existing one is never patched.
#[derive(Debug, Clone)]
pub struct Snapshot {
  root: Value,
}

impl Snapshot {
  /// Parse fetched text. The document root must be an object.
  pub fn from_json(text: &str) -> Result<Self> {
    let root: Value = serde_json::from_str(text)?;
    Self::from_value(root)
  }

  pub fn from_value(root: Value) -> Result<Self> {
    match root {
      Value::Object(_) => Ok(Self { root }),
      other => Err(SnapshotError::NotAnObject(Kind::of(&other))),
    }
  }

  fn lookup(&self, steps: &[Step<'_>]) -> Option<&Value> {
    walk(&self.root, steps)
      .inspect_err(|err| trace!(%err, "snapshot lookup failed"))
      .ok()
  }
}
