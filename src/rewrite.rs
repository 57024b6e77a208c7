//! One-call rewriting of in-memory sources.

use anyfix_driver::{DriverOptions, ProgramReport, run_to_fixpoint_transaction};
use anyfix_infer::SemanticModel;
use anyfix_program::{Program, ProgramError};
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RewriteSettings {
    /// Load the built-in lib declarations.
    pub include_lib: bool,
    /// Roll every committed edit back after the run.
    pub dry_run: bool,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        RewriteSettings {
            include_lib: true,
            dry_run: false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutput {
    /// `(name, text)` per input file; the original text after a dry run.
    pub files: Vec<(String, String)>,
    pub report: ProgramReport,
    pub diagnostics_before: usize,
    pub diagnostics_after: usize,
}

impl RewriteOutput {
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, text)| text.as_str())
    }
}

/// Parse `sources` as one program, annotate it to a fixpoint and emit it.
pub fn rewrite_sources<I, N, T>(
    sources: I,
    options: &DriverOptions,
    settings: RewriteSettings,
) -> Result<RewriteOutput, ProgramError>
where
    I: IntoIterator<Item = (N, T)>,
    N: Into<String>,
    T: Into<String>,
{
    let mut program = Program::with_options(sources, settings.include_lib)?;
    let diagnostics_before = program.all_diagnostics().len();

    let (operation, report) = run_to_fixpoint_transaction(&mut program, options);
    if settings.dry_run {
        tracing::info!(
            changes = report.total_changes,
            "dry run, rolling back committed annotations"
        );
        operation.revert(&mut program);
    }

    let diagnostics_after = program.all_diagnostics().len();
    tracing::debug!(
        files = program.files().len(),
        diagnostics_before,
        diagnostics_after,
        "rewrite finished"
    );
    Ok(RewriteOutput {
        files: program.emit_all(),
        report,
        diagnostics_before,
        diagnostics_after,
    })
}
