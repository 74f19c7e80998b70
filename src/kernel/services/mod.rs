//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the engine.
//! - `adapters`: tokio / OS specific implementations.

pub mod adapters;
pub mod bus;
pub mod ports;

pub use bus::{engine_bus, EngineBusReceiver, EngineBusSender, EngineMessage};
