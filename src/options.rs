use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Knobs for one stub build. Missing keys deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubOptions {
    /// Deepest inner-class nesting followed before the build fails.
    pub max_nesting_depth: usize,
    /// Look up and attach `Outer$Inner.class` siblings.
    pub resolve_inner_classes: bool,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            resolve_inner_classes: true,
        }
    }
}
