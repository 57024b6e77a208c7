//! What the driver did, per binding, file, pass and program.

use anyfix_common::Diagnostic;
use anyfix_infer::NodeId;
use serde::Serialize;

/// Terminal state of one binding's transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SiteOutcome {
    NoAny,
    NoTypeFound,
    Committed {
        annotation: String,
    },
    Reverted {
        annotation: String,
        /// Diagnostics the edit introduced; only recorded when verbose.
        introduced: Vec<Diagnostic>,
    },
    Failed {
        annotation: String,
        error: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingReport {
    pub binding: NodeId,
    pub name: String,
    pub changed: usize,
    pub sites_observed: usize,
    pub outcome: SiteOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: String,
    pub changes_applied: usize,
    pub anys_observed: usize,
    /// Every binding that was implicitly `any` when visited.
    pub sites: Vec<BindingReport>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub pass: u32,
    pub changes: usize,
    pub anys_observed: usize,
    pub files: Vec<FileReport>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramReport {
    pub passes: Vec<PassReport>,
    pub total_changes: usize,
    pub converged: bool,
}

impl ProgramReport {
    /// Committed annotations across all passes, with their file names.
    pub fn committed(&self) -> impl Iterator<Item = (&str, &BindingReport)> {
        self.passes.iter().flat_map(|pass| {
            pass.files.iter().flat_map(|file| {
                file.sites
                    .iter()
                    .filter(|site| matches!(site.outcome, SiteOutcome::Committed { .. }))
                    .map(move |site| (file.file.as_str(), site))
            })
        })
    }

    /// Sites of the final pass that still have no annotation.
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, &BindingReport)> {
        self.passes.last().into_iter().flat_map(|pass| {
            pass.files.iter().flat_map(|file| {
                file.sites
                    .iter()
                    .filter(|site| !matches!(site.outcome, SiteOutcome::Committed { .. }))
                    .map(move |site| (file.file.as_str(), site))
            })
        })
    }
}
