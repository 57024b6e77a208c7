//! Apply inferred annotations one binding at a time, keeping an edit only
//! when it does not increase the diagnostic count.
//!
//! - [`RevertableOperation`]: composable, undoable unit of mutation.
//! - [`Driver`]: the per-binding and per-file transaction.
//! - [`run_to_fixpoint`]: whole-program passes until nothing changes.

pub mod options;
pub use options::{DiagnosticScope, DriverOptions};

pub mod revertable;
pub use revertable::RevertableOperation;

pub mod report;
pub use report::{BindingReport, FileReport, PassReport, ProgramReport, SiteOutcome};

pub mod transaction;
pub use transaction::Driver;

pub mod fixpoint;
pub use fixpoint::{run_to_fixpoint, run_to_fixpoint_transaction};
