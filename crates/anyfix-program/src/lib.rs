//! Reference host for the anyfix rewriter.
//!
//! A checker for a small TypeScript subset: functions, arrow functions,
//! classes, variables, destructuring, object/array/template literals, type
//! aliases, interfaces and the usual operators. It exists so the driver has
//! a real program to rewrite; [`Program`] implements
//! [`anyfix_infer::SemanticModel`].
//!
//! Pipeline: [`scanner`] -> [`parser`] -> [`binder`] -> [`checker`], with
//! types interned in [`types::TypeTable`] and related by [`relation`].

pub mod ast;
pub mod binder;
pub mod checker;
pub mod error;
pub mod lib_prelude;
pub mod parser;
pub mod program;
pub mod relation;
pub mod scanner;
pub mod types;

pub use error::{ParseError, ProgramError};
pub use parser::parse_type_text;
pub use program::{AnnotationOverride, Program, SourceFile};
