//! Centralized limits and thresholds for the anyfix rewriter.
//!
//! Keeping these in one place prevents duplicate definitions with
//! inconsistent values between the core and the reference host.

// =============================================================================
// Type Model Limits
// =============================================================================

/// Maximum nesting depth when expanding a host type into a type model.
///
/// Children past this depth become opaque models carrying the host's display
/// text. Aliased types stop expanding earlier since they render by name.
///
/// ```typescript
/// // Anonymous, deeply nested object types are cut off:
/// declare const deep: { a: { b: { c: { d: { e: { f: { g: { h: { i: number } } } } } } } } };
/// ```
pub const MAX_TYPE_MODEL_DEPTH: u32 = 12;

/// Default number of distinct candidate types that may be joined into a
/// union annotation before the unifier widens (or gives up).
///
/// ```typescript
/// f(1); f(4); f(3); f(2);   // x: 1 | 4 | 3 | 2
/// f(5);                     // x: number
/// ```
pub const DEFAULT_MAX_UNION_MEMBERS: usize = 4;

// =============================================================================
// Driver Limits
// =============================================================================

/// Maximum number of whole-program passes before the fixpoint loop stops.
///
/// Every committed pass adds at least one annotation and annotations are
/// never removed by a commit, so a well-behaved host converges long before
/// this. The cap only guards against a host whose diagnostics oscillate.
pub const MAX_FIXPOINT_PASSES: u32 = 64;

// =============================================================================
// Reference Host Limits
// =============================================================================

/// Maximum depth for expression type checking in the reference host.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum depth for structural assignability checks.
pub const MAX_ASSIGNABILITY_DEPTH: u32 = 100;

/// Maximum number of alias hops followed when resolving a named type.
pub const MAX_ALIAS_RESOLUTION_HOPS: u32 = 64;
