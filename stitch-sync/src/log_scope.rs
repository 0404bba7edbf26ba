//! Hierarchical log targets passed explicitly into each component.
//!
//! Components never reach for a process-wide logger object; they carry a
//! `LogScope` and log through the `log` facade with the scope's dotted name as
//! the target, e.g. `stitch.pull.actions`.

use std::fmt;

/// Dotted, hierarchical log target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogScope(String);

impl LogScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `stitch` → `stitch.<segment>`.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}.{segment}", self.0))
    }

    /// The target string handed to `log` macros.
    pub fn target(&self) -> &str {
        &self.0
    }
}

impl Default for LogScope {
    fn default() -> Self {
        Self::new("stitch")
    }
}

impl fmt::Display for LogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_appends_dotted_segment() {
        let root = LogScope::default();
        let pull = root.child("pull").child("backend-script");
        assert_eq!(pull.target(), "stitch.pull.backend-script");
        assert_eq!(root.target(), "stitch");
    }
}
