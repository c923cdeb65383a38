//! External interfaces toward the host bundler.
//!
//! The bundler itself (module graph, watching, transforms, caching) is an
//! external collaborator; it is consumed only through two narrow contracts:
//! resolve an identifier to a module descriptor, and transform source text.
//! This module decorates both.

pub mod hooks;

pub use hooks::{
    scan_for_native_usage, CompatWarning, DelegateTransformer, ResolverHook, TransformError,
    TransformHook, TransformOutput,
};
