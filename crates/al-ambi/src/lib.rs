//! al-ambi: Ambisonic panning and B-Format decoding
//!
//! ## Panning
//! - ACN/N3D spherical harmonics up to 3rd order
//! - Source spread via zonal-harmonic attenuation
//! - N3D/SN3D/FuMa scale tables and index maps
//!
//! ## Decoding
//! - `.ambdec` v3 parser with line-numbered errors
//! - Speaker label → output channel mapping
//! - Single- and dual-band decoders with a streaming crossover

pub mod ambdec;
pub mod coeffs;
pub mod decoder;
pub mod defs;
pub mod speakers;
pub mod splitter;

mod error;

pub use ambdec::{AmbDecConf, AmbDecSpeaker};
pub use coeffs::{
    AmbiCoeffs, BFChannelConfig, calc_ambi_coeffs, calc_angle_coeffs, calc_direction_coeffs,
    compute_pan_gains,
};
pub use decoder::{BFormatDec, DecoderMatrix};
pub use defs::{AmbiNorm, get_hf_order_scales};
pub use error::*;
pub use speakers::{Channel, channel_from_label, make_speaker_map};
pub use splitter::BandSplitter;
