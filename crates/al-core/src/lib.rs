//! al-core: Shared types for the EAX emulation and ambisonic decoding crates
//!
//! Provides the millibel/gain conversions used throughout the EAX numeric
//! model, the 16-byte `Guid` wire type, and the JSON configuration layer.

mod config;
mod error;
mod guid;
mod units;

pub use config::*;
pub use error::*;
pub use guid::*;
pub use units::*;
