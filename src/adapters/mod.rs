// Adapters layer: concrete implementations of the domain ports for external systems.

#[cfg(feature = "kafka")]
pub mod kafka;
pub mod postgres;
