//! Build-time layer: classification, mappings, and the resolution policy.
//!
//! ## Resolution Order
//!
//! When the bundler asks for an identifier on a web target:
//!
//! ```text
//! resolve("react-native-camera", "web")
//!      ↓
//! 1. Excluded by configuration?   → delegate unchanged
//! 2. Override tier mapping?       → delegate the substitute
//! 3. User-map tier mapping?       → delegate the substitute
//! 4. Built-in tier mapping?       → delegate the substitute
//! 5. Mobile-only (classifier) or  → synthesize a stand-in
//!    force-included?
//! 6. Otherwise                    → delegate unchanged
//! ```
//!
//! On a non-web target every identifier is delegated unchanged - the shim
//! never alters the native build.
//!
//! ### Key Components
//!
//! - **[`classify`]**: eight-rule mobile-only classification with optional
//!   package-metadata probes
//! - **[`registry`]**: the three mapping tiers
//! - **[`policy`]**: the engine combining both over a delegate resolver
//! - **[`environment`]**: web/native detection shared with the runtime layer
//! - **[`config`]**: the configuration surface everything reads from

pub mod classify;
pub mod config;
pub mod environment;
pub mod policy;
pub mod registry;

pub use classify::{classify, Classification, Classifier, Confidence, PackageMetadata};
pub use config::{ConfigError, FallbackStrategy, ShimConfig, Verbosity};
pub use environment::{Environment, EnvironmentDetector};
pub use policy::{
    mock_identifier, Decision, DelegateResolver, ResolutionEngine, ResolveError, ResolvedModule,
};
pub use registry::{MappingEntry, MappingRegistry, MappingTier};
