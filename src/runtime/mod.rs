//! Runtime layer: the value model, the interception proxies, the layered
//! fallback policy, and stand-in synthesis.
//!
//! ## Interception Flow
//!
//! When application code accesses a wrapped module:
//!
//! ```text
//! proxy.get("getItem")
//!      ↓
//! 1. Key exists on the target?        → wrap and return it
//! 2. Null but object-shaped name?     → nested fallback object
//! 3. Missing: shape-specific synth    → emitter/context/component/hook/
//!    recognized by name?                listener stand-in
//! 4. Declared fallback rule?          → rule value
//! 5. Last resort                      → callable-and-chainable safe stub
//! ```
//!
//! Calls route failures (synchronous throws and rejected promise results)
//! through the [`fallback::FallbackPolicy`]; only the `Strict` strategy lets
//! the original error cross the proxy boundary.

pub mod builtins;
pub mod fallback;
pub mod proxy;
pub mod shapes;
pub mod synthesize;
pub mod value;

pub use fallback::{FailureRecord, FallbackBehavior, FallbackOutcome, FallbackPolicy, FallbackRule};
pub use proxy::{CallFailure, Interceptor, ModuleProxy};
pub use synthesize::{ExportDescriptor, ExportKind, ModuleDescriptor, ModuleLoader, Synthesizer};
pub use value::Value;
