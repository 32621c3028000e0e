//! Structured cache keys
//!
//! A key is the operation name plus its ordered parameters, so two queries
//! for the same operation with different parameters occupy distinct entries.

use std::fmt;

/// Cache key: operation name + ordered `(name, value)` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    operation: String,
    params: Vec<(String, String)>,
}

impl QueryKey {
    /// Create a key for an operation with no parameters.
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into(), params: Vec::new() }
    }

    /// Append a parameter. Parameter order is significant.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Operation name this key belongs to.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Parameter value by name, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Key for the active estimates list.
    pub fn estimates_active() -> Self {
        Self::new("estimates.list").with_param("view", "active")
    }

    /// Key for the trashed estimates list.
    pub fn estimates_trash() -> Self {
        Self::new("estimates.list").with_param("view", "trash")
    }

    /// Key for a single estimate.
    pub fn estimate(id: &str) -> Self {
        Self::new("estimates.get").with_param("id", id)
    }

    /// Key for the invoices list.
    pub fn invoices() -> Self {
        Self::new("invoices.list")
    }

    /// Key for the portal users list.
    pub fn users() -> Self {
        Self::new("users.list")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        for (name, value) in &self.params {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_with_different_params_are_distinct() {
        assert_ne!(QueryKey::estimates_active(), QueryKey::estimates_trash());
        assert_eq!(QueryKey::estimates_active(), QueryKey::estimates_active());
    }

    #[test]
    fn display_includes_params() {
        let key = QueryKey::new("estimates.list").with_param("view", "trash");
        assert_eq!(key.to_string(), "estimates.list;view=trash");
    }

    #[test]
    fn param_lookup() {
        let key = QueryKey::estimate("est-1");
        assert_eq!(key.param("id"), Some("est-1"));
        assert_eq!(key.param("view"), None);
    }
}
