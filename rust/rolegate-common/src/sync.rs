//! Cross-target bound compatability trait
//!
//! Stores and clocks are shared across threads on native targets, but
//! `wasm32-unknown-unknown` has no threads and many of its types are not
//! `Send`. On wasm the trait effectively represents no new bound; on other
//! targets it represents `Send + Sync`.

#[allow(missing_docs)]
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<S> ConditionalSync for S where S: Send + Sync {}

#[allow(missing_docs)]
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSync {}

#[cfg(target_arch = "wasm32")]
impl<S> ConditionalSync for S {}
