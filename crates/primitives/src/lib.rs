//! Identifier primitives shared by the catalog build pipeline and the runtime.
//!
//! - [`ProviderId`]: cheap-to-clone provider identifier.
//! - [`ProviderRegistry`]: the closed set of provider ids a build accepts.
//! - [`ItemRef`]: a `(provider, item)` pair, parsed from `"<provider>:<item>"`.
//! - [`CapabilityPath`]: a dotted path into an item's capability tree.

mod capability;
mod provider;
mod spec;

pub use capability::CapabilityPath;
pub use provider::{BUILTIN_PROVIDERS, ProviderId, ProviderRegistry};
pub use spec::{ItemRef, SpecError};
