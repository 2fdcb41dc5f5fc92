//! Enphase Envoy Local API Client
//!
//! Talks to an Envoy solar gateway on the local network: polls the
//! `/production.json` summary, or follows the digest-authenticated
//! `/stream/meter` push stream of per-phase meter readings.

pub mod config;
mod digest;
pub mod envoy;
pub mod error;
pub mod handlers;
pub mod meter_stream;
mod production;
pub mod readings;

// Re-export commonly used types for easier access
pub use envoy::{DecodePolicy, Envoy, EnvoyOptions};
pub use error::EnvoyError;
pub use readings::{MeterPayload, PhaseReading, ProductionReading, ProductionSnapshot, ThreePhase};
pub use tokio_util::sync::CancellationToken;
