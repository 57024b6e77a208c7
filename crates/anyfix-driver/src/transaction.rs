//! The per-binding transaction.
//!
//! ```text
//! candidates collected -> unified -> tentatively applied -> committed
//!                                                        -> reverted
//! ```
//!
//! A binding that is not implicitly `any` stops before collection (`NoAny`);
//! one whose evidence unifies to nothing stops after it (`NoTypeFound`).
//! With verification enabled the diagnostic count is read before and after
//! the edit, and an edit that raises it is reverted.

use crate::options::{DiagnosticScope, DriverOptions};
use crate::report::{BindingReport, FileReport, SiteOutcome};
use crate::revertable::RevertableOperation;
use anyfix_common::{Diagnostic, messages_introduced};
use anyfix_infer::{
    FileId, InferenceOutcome, MutationError, NodeId, SemanticModel, infer_binding_type,
};

pub struct Driver {
    options: DriverOptions,
}

impl Driver {
    pub fn new(options: DriverOptions) -> Self {
        Driver { options }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Run the transaction for one binding.
    ///
    /// The returned operation undoes a committed edit; it is empty for every
    /// other outcome.
    pub fn process_binding<M: SemanticModel + 'static>(
        &self,
        model: &mut M,
        binding: NodeId,
    ) -> (RevertableOperation<M>, BindingReport) {
        let name = model.binding_name(binding);
        let report = |changed, sites_observed, outcome| BindingReport {
            binding,
            name: name.clone(),
            changed,
            sites_observed,
            outcome,
        };

        let annotation = match infer_binding_type(&*model, binding, &self.options.policy) {
            InferenceOutcome::NoAny => {
                return (RevertableOperation::none(), report(0, 0, SiteOutcome::NoAny));
            }
            InferenceOutcome::NoTypeFound => {
                tracing::debug!(binding = binding.0, %name, "no type found");
                return (
                    RevertableOperation::observed(1),
                    report(0, 1, SiteOutcome::NoTypeFound),
                );
            }
            InferenceOutcome::TypeFound(found) => found.render(),
        };
        tracing::debug!(binding = binding.0, %name, %annotation, "unified candidates");

        let file = model.file_of(binding);
        let before = self
            .options
            .verify
            .then(|| self.diagnostics_snapshot(model, file));

        let operation = match apply_annotation(model, binding, &annotation) {
            Ok(operation) => operation,
            Err(error) => {
                tracing::error!(
                    binding = binding.0,
                    %name,
                    %annotation,
                    %error,
                    "failed to apply inferred annotation"
                );
                return (
                    RevertableOperation::observed(1),
                    report(
                        0,
                        1,
                        SiteOutcome::Failed {
                            annotation,
                            error: error.to_string(),
                        },
                    ),
                );
            }
        };
        tracing::debug!(binding = binding.0, %annotation, "tentatively applied");

        if let Some(before) = before {
            let after = self.diagnostics_snapshot(model, file);
            if after.len() > before.len() {
                let introduced = if self.options.verbosity > 0 {
                    messages_introduced(&before, &after)
                } else {
                    Vec::new()
                };
                for diagnostic in &introduced {
                    tracing::info!(
                        %name,
                        %annotation,
                        code = diagnostic.code,
                        message = %diagnostic.message_text,
                        "reverting annotation"
                    );
                }
                tracing::debug!(
                    binding = binding.0,
                    before = before.len(),
                    after = after.len(),
                    "diagnostics increased, reverting"
                );
                operation.revert(model);
                return (
                    RevertableOperation::observed(1),
                    report(
                        0,
                        1,
                        SiteOutcome::Reverted {
                            annotation,
                            introduced,
                        },
                    ),
                );
            }
        }

        tracing::debug!(binding = binding.0, %annotation, "committed");
        (
            operation,
            report(1, 1, SiteOutcome::Committed { annotation }),
        )
    }

    /// Process every binding of `file` in source order and keep the edits.
    pub fn process_file<M: SemanticModel + 'static>(&self, model: &mut M, file: FileId) -> FileReport {
        let (_committed, report) = self.process_file_transaction(model, file);
        report
    }

    /// Like [`process_file`](Self::process_file), returning the composed
    /// operation so the caller can undo the whole file.
    pub fn process_file_transaction<M: SemanticModel + 'static>(
        &self,
        model: &mut M,
        file: FileId,
    ) -> (RevertableOperation<M>, FileReport) {
        let file_name = model.file_name(file);
        let _span = tracing::info_span!("process_file", file = %file_name).entered();

        let mut operation = RevertableOperation::none();
        let mut sites = Vec::new();
        for binding in model.bindings(file) {
            let (site_operation, site) = self.process_binding(model, binding);
            operation = operation.combine(site_operation);
            if site.outcome != SiteOutcome::NoAny {
                sites.push(site);
            }
        }

        let report = FileReport {
            file: file_name,
            changes_applied: operation.count_changes_done(),
            anys_observed: operation.count_of_anys(),
            sites,
        };
        tracing::debug!(
            changes = report.changes_applied,
            anys = report.anys_observed,
            "file processed"
        );
        (operation, report)
    }

    fn diagnostics_snapshot<M: SemanticModel>(&self, model: &M, file: FileId) -> Vec<Diagnostic> {
        match self.options.diagnostic_scope {
            DiagnosticScope::File => model.diagnostics(file),
            DiagnosticScope::Program => model
                .files()
                .into_iter()
                .flat_map(|file| model.diagnostics(file))
                .collect(),
        }
    }
}

/// Set `binding`'s annotation to `annotation`; the operation restores the
/// previous annotation (or its absence).
fn apply_annotation<M: SemanticModel + 'static>(
    model: &mut M,
    binding: NodeId,
    annotation: &str,
) -> Result<RevertableOperation<M>, MutationError> {
    let previous = model.declared_type_text(binding);
    model.set_declared_type(binding, annotation)?;
    Ok(RevertableOperation::new(1, 1, move |model: &mut M| {
        match previous {
            Some(text) => {
                if let Err(error) = model.set_declared_type(binding, &text) {
                    tracing::error!(binding = binding.0, %error, "failed to restore annotation");
                }
            }
            None => model.remove_declared_type(binding),
        }
    }))
}
