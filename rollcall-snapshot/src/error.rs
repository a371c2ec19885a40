use thiserror::Error;

use crate::models::Kind;

/// Why a fetched payload could not become a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("invalid json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("document root must be an object, found {0}")]
  NotAnObject(Kind),
}

/// Why a single lookup into a snapshot failed.
///
/// Never surfaced through the public accessors; those collapse every variant
/// into `None`. Kept so failures can be traced with their cause.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
  #[error("cannot look up '{key}' in a {found} node")]
  NotAnObject { key: String, found: Kind },

  #[error("field '{key}' is missing")]
  MissingField { key: String },

  #[error("field '{key}' is {found}, expected {expected}")]
  WrongKind {
    key: String,
    expected: Kind,
    found: Kind,
  },

  #[error("index {index} is outside a table of {len} names")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("slot {0} does not hold an index")]
  NotAnIndex(usize),

  #[error("slot {0} of the name table is not a string")]
  NameNotAString(usize),

  #[error("display name is not in the name table")]
  UnknownUser,
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
