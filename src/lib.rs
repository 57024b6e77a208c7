//! anyfix: replace implicit `any` with types inferred from usage.
//!
//! Every binding whose type is implicitly `any` is annotated with a type
//! unified from the places it is used; an annotation is kept only when it does
//! not increase the number of diagnostics. The work is split across crates:
//!
//! - [`common`]: diagnostics, positions, limits.
//! - [`solver`]: the host type query interface, type models and unification.
//! - [`infer`]: the semantic model interface and usage-based inference.
//! - [`driver`]: the annotate-check-revert transaction and fixpoint loop.
//! - [`program`]: the TypeScript-subset reference host.
//!
//! [`rewrite_sources`] ties them together for callers that just want
//! rewritten text.

pub use anyfix_common as common;
pub use anyfix_driver as driver;
pub use anyfix_infer as infer;
pub use anyfix_program as program;
pub use anyfix_solver as solver;

pub use anyfix_driver::{DiagnosticScope, DriverOptions, ProgramReport, SiteOutcome};
pub use anyfix_program::{Program, ProgramError};

pub mod tracing_config;

pub mod rewrite;
pub use rewrite::{RewriteOutput, RewriteSettings, rewrite_sources};
