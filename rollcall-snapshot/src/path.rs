//! Declarative field paths into the document.
//!
//! Every accessor is a short chain of `(field, expected kind)` steps run by
//! [`walk`]. A step fails if the current node is not an object, the field is
//! absent, or the field has the wrong kind; the first failure ends the walk.

use serde_json::Value;

use crate::error::LookupError;
use crate::models::Kind;

/// One hop of a path: the field to read and the kind it must have.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step<'k> {
  pub key: &'k str,
  pub kind: Kind,
}

impl<'k> Step<'k> {
  pub fn object(key: &'k str) -> Self {
    Self { key, kind: Kind::Object }
  }

  pub fn array(key: &'k str) -> Self {
    Self { key, kind: Kind::Array }
  }

  pub fn string(key: &'k str) -> Self {
    Self { key, kind: Kind::String }
  }

  pub fn number(key: &'k str) -> Self {
    Self { key, kind: Kind::Number }
  }

  pub fn boolean(key: &'k str) -> Self {
    Self { key, kind: Kind::Boolean }
  }
}

/// Accept `node` only if it has the expected kind.
pub(crate) fn expect<'a>(node: &'a Value, kind: Kind, key: &str) -> Result<&'a Value, LookupError> {
  let found = Kind::of(node);
  if found == kind {
    Ok(node)
  } else {
    Err(LookupError::WrongKind {
      key: key.to_string(),
      expected: kind,
      found,
    })
  }
}

fn field<'a>(node: &'a Value, step: &Step<'_>) -> Result<&'a Value, LookupError> {
  let map = node.as_object().ok_or_else(|| LookupError::NotAnObject {
    key: step.key.to_string(),
    found: Kind::of(node),
  })?;
  let child = map.get(step.key).ok_or_else(|| LookupError::MissingField {
    key: step.key.to_string(),
  })?;
  expect(child, step.kind, step.key)
}

/// Follow `steps` from `root`, stopping at the first failed step.
pub(crate) fn walk<'a>(root: &'a Value, steps: &[Step<'_>]) -> Result<&'a Value, LookupError> {
  steps.iter().try_fold(root, |node, step| field(node, step))
}

/// Read a file-time number. Floats are truncated toward zero.
pub(crate) fn as_file_time(node: &Value) -> Option<i64> {
  if let Some(ticks) = node.as_i64() {
    return Some(ticks);
  }
  let ticks = node.as_f64()?;
  (ticks.is_finite() && ticks >= i64::MIN as f64 && ticks < i64::MAX as f64)
    .then(|| ticks.trunc() as i64)
}

/// Read a non-negative count. Floats are truncated toward zero.
pub(crate) fn as_count(node: &Value) -> Option<u32> {
  if let Some(count) = node.as_u64() {
    return u32::try_from(count).ok();
  }
  let count = node.as_f64()?;
  (count.is_finite() && count >= 0.0 && count <= u32::MAX as f64).then(|| count.trunc() as u32)
}

/// Read a position in the display-name table. Fractional values are not indices.
pub(crate) fn as_index(node: &Value) -> Option<usize> {
  if let Some(index) = node.as_u64() {
    return usize::try_from(index).ok();
  }
  let index = node.as_f64()?;
  (index.is_finite() && index >= 0.0 && index.fract() == 0.0 && index <= u32::MAX as f64)
    .then(|| index as usize)
}
