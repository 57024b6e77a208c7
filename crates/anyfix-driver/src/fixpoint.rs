//! Whole-program passes until a pass changes nothing.

use crate::options::DriverOptions;
use crate::report::{PassReport, ProgramReport};
use crate::revertable::RevertableOperation;
use crate::transaction::Driver;
use anyfix_common::limits::MAX_FIXPOINT_PASSES;
use anyfix_infer::SemanticModel;

/// Annotate the whole program, keeping every committed edit.
///
/// An annotation committed in one pass can supply evidence for bindings
/// visited earlier in that pass, so passes repeat until one commits nothing.
pub fn run_to_fixpoint<M: SemanticModel + 'static>(
    model: &mut M,
    options: &DriverOptions,
) -> ProgramReport {
    let (_committed, report) = run_to_fixpoint_transaction(model, options);
    report
}

/// Like [`run_to_fixpoint`], returning one operation that undoes the run.
pub fn run_to_fixpoint_transaction<M: SemanticModel + 'static>(
    model: &mut M,
    options: &DriverOptions,
) -> (RevertableOperation<M>, ProgramReport) {
    let driver = Driver::new(options.clone());
    let mut total = RevertableOperation::none();
    let mut report = ProgramReport::default();

    for pass in 1..=MAX_FIXPOINT_PASSES {
        let _span = tracing::info_span!("pass", pass).entered();

        let mut pass_operation = RevertableOperation::none();
        let mut files = Vec::new();
        for file in model.files() {
            let (file_operation, file_report) = driver.process_file_transaction(model, file);
            pass_operation = pass_operation.combine(file_operation);
            files.push(file_report);
        }

        let changes = pass_operation.count_changes_done();
        tracing::debug!(changes, anys = pass_operation.count_of_anys(), "pass finished");
        report.passes.push(PassReport {
            pass,
            changes,
            anys_observed: pass_operation.count_of_anys(),
            files,
        });
        total = total.combine(pass_operation);

        if changes == 0 {
            report.converged = true;
            break;
        }
    }

    if !report.converged {
        tracing::warn!(
            passes = MAX_FIXPOINT_PASSES,
            "stopped before reaching a fixpoint"
        );
    }
    report.total_changes = total.count_changes_done();
    (total, report)
}
