//! # webshim - Mobile-to-Web Compatibility Engine
//!
//! A build-time and runtime compatibility shim that lets mobile-oriented
//! JavaScript application code run in a web context:
//! - Build-time resolution policy that redirects mobile-only modules to
//!   web-backed substitutes, user overrides, or synthesized stand-ins
//! - Runtime interception layer that wraps loaded modules so missing
//!   properties, failing calls, and rejected promises degrade gracefully
//! - Best-effort static export scanner (PEG-based) for modules that cannot
//!   be loaded in the current process
//! - Layered fallback policy with per-call, per-module, built-in, and
//!   naming-convention rules
//!
//! ## Quick Start
//!
//! ### Resolving an identifier for the web
//!
//! ```
//! use webshim::resolver::config::ShimConfig;
//! use webshim::resolver::policy::{ResolutionEngine, ResolvedModule, ResolveError, DelegateResolver};
//!
//! struct PassThrough;
//! impl DelegateResolver for PassThrough {
//!     fn resolve(&mut self, identifier: &str, _platform: &str) -> Result<ResolvedModule, ResolveError> {
//!         Ok(ResolvedModule::bare(identifier))
//!     }
//! }
//!
//! let engine = ResolutionEngine::new(ShimConfig::new());
//! let mut delegate = PassThrough;
//! let resolved = engine.resolve("react-native", "web", &mut delegate).unwrap();
//! // "react-native" is redirected to the built-in web substitute
//! assert_eq!(resolved.identifier, "react-native-web");
//! ```
//!
//! ### Wrapping a loaded module
//!
//! ```
//! use webshim::resolver::config::ShimConfig;
//! use webshim::runtime::proxy::Interceptor;
//! use webshim::runtime::value::Value;
//!
//! let interceptor = Interceptor::new(&ShimConfig::new().force_web());
//! let module = Value::object(vec![]);
//! let proxy = interceptor.intercept("some-native-module", module);
//!
//! // Missing members never panic and never surface raw errors:
//! let result = proxy.get("getDeviceName").call(vec![]).unwrap();
//! assert_eq!(result, Value::Null);
//! ```
//!
//! ## Architecture
//!
//! - **[`scanner`]** - PEG-based static export extraction
//! - **[`resolver`]** - Build-time layer
//!   - **[`resolver::classify`]** - Mobile-only identifier classification
//!   - **[`resolver::registry`]** - Tiered substitution mappings
//!   - **[`resolver::policy`]** - Resolution policy engine
//!   - **[`resolver::environment`]** - Web/native environment detection
//! - **[`runtime`]** - Runtime layer
//!   - **[`runtime::proxy`]** - Interception layer (proxies)
//!   - **[`runtime::fallback`]** - Layered fallback policy
//!   - **[`runtime::synthesize`]** - Stand-in module synthesis
//!   - **[`runtime::builtins`]** - Built-in fallback rules for well-known packages
//! - **[`bundler`]** - Resolver/transform hook decorators for the host bundler

#[macro_use]
extern crate lazy_static;

pub mod bundler;
pub mod resolver;
pub mod runtime;
pub mod scanner;
