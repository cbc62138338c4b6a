//! Semantic analysis module
//!
//! Provides the lexical scope model and the read-reference classification
//! shared by the dispatch engine and the scope-aware rules.

pub mod refs;
pub mod scope;

pub use refs::{PatternBinding, is_read_reference, pattern_bindings, tdz_availability};
pub use scope::{
    DeclarationInfo, DeclarationKind, HoistTarget, Reference, Scope, ScopeId, ScopeKind,
    ScopeModel,
};
