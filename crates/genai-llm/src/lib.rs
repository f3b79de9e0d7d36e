//! Multi-provider model client factory.
//!
//! The Model Factory produces cached `ChatModel` instances keyed by
//! `(provider, model name, temperature)`. Instances live for the process
//! lifetime; nothing here invalidates a cached client.

pub mod factory;
pub mod provider;

pub use factory::ModelFactory;
