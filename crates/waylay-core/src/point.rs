//! Canonical interception-point keys and call hints

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Caller-supplied side-channel data for one wrapped call, read-only
/// across the hook chain.
pub type Hints = HashMap<String, Value>;

/// Interned name of an interception point.
///
/// Cheap to clone, hash, and store; every registration and dispatch API
/// accepts anything `Into<PointName>`, so call sites usually pass a plain
/// string literal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PointName(Arc<str>);

impl PointName {
    /// View the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PointName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for PointName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&PointName> for PointName {
    fn from(name: &PointName) -> Self {
        name.clone()
    }
}

impl AsRef<str> for PointName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
