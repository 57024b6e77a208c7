//! Driver configuration.
//!
//! Options deserialize from camelCase JSON with every field defaulted:
//!
//! ```json
//! { "verify": true, "verbosity": 0, "policy": { "maxUnionMembers": 4 }, "diagnosticScope": "file" }
//! ```

use anyfix_solver::UnionPolicy;
use serde::{Deserialize, Serialize};

/// Which diagnostics the safety check counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticScope {
    /// Only the file containing the binding.
    #[default]
    File,
    /// Every file in the program.
    Program,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverOptions {
    /// Re-check after each edit and revert edits that add diagnostics.
    /// `false` keeps every inferred annotation.
    pub verify: bool,
    /// Above zero, reverted edits record the diagnostics they introduced.
    pub verbosity: u8,
    pub policy: UnionPolicy,
    pub diagnostic_scope: DiagnosticScope,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            verify: true,
            verbosity: 0,
            policy: UnionPolicy::default(),
            diagnostic_scope: DiagnosticScope::File,
        }
    }
}

impl DriverOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// No verification: every inferred annotation is kept.
    pub fn no_revert() -> Self {
        DriverOptions {
            verify: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
