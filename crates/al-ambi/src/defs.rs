//! Ambisonic channel layout, scale tables and index maps
//!
//! Everything is ACN-ordered and N3D-normalized internally. The scale
//! tables give the factor applied to content in another normalization;
//! decoder coefficients are divided by them.

use crate::error::{AmbiError, AmbiResult};
use serde::{Deserialize, Serialize};

/// Highest supported order
pub const MAX_AMBI_ORDER: usize = 3;

/// Channels needed for a full-sphere signal of `order`
pub const fn ambi_channels_from_order(order: usize) -> usize {
    (order + 1) * (order + 1)
}

/// Channels needed for a horizontal-only signal of `order`
pub const fn ambi_2d_channels_from_order(order: usize) -> usize {
    order * 2 + 1
}

pub const MAX_AMBI_CHANNELS: usize = ambi_channels_from_order(MAX_AMBI_ORDER);
pub const MAX_AMBI_2D_CHANNELS: usize = ambi_2d_channels_from_order(MAX_AMBI_ORDER);

/// ACN channel masks by order. Fourth order only appears in `.ambdec` masks.
pub const AMBI_0ORDER_MASK: u32 = 0x0000_0001;
pub const AMBI_1ORDER_MASK: u32 = 0x0000_000f;
pub const AMBI_2ORDER_MASK: u32 = 0x0000_01ff;
pub const AMBI_3ORDER_MASK: u32 = 0x0000_ffff;
pub const AMBI_4ORDER_MASK: u32 = 0x01ff_ffff;

/// ACN channels carrying height information
pub const AMBI_PERIPHONIC_MASK: u32 = 0x00fe_7ce4;

/// Coefficient normalization of ambisonic content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmbiNorm {
    N3D,
    SN3D,
    FuMa,
}

impl AmbiNorm {
    /// Per-ACN factors from this normalization to N3D
    pub fn scales(self) -> &'static [f32; MAX_AMBI_CHANNELS] {
        match self {
            Self::N3D => &FROM_N3D,
            Self::SN3D => &FROM_SN3D,
            Self::FuMa => &FROM_FUMA,
        }
    }
}

pub const FROM_N3D: [f32; MAX_AMBI_CHANNELS] = [1.0; MAX_AMBI_CHANNELS];

pub const FROM_SN3D: [f32; MAX_AMBI_CHANNELS] = [
    1.000000000, // ACN  0, sqrt(1)
    1.732050808, // ACN  1, sqrt(3)
    1.732050808, // ACN  2, sqrt(3)
    1.732050808, // ACN  3, sqrt(3)
    2.236067978, // ACN  4, sqrt(5)
    2.236067978, // ACN  5, sqrt(5)
    2.236067978, // ACN  6, sqrt(5)
    2.236067978, // ACN  7, sqrt(5)
    2.236067978, // ACN  8, sqrt(5)
    2.645751311, // ACN  9, sqrt(7)
    2.645751311, // ACN 10, sqrt(7)
    2.645751311, // ACN 11, sqrt(7)
    2.645751311, // ACN 12, sqrt(7)
    2.645751311, // ACN 13, sqrt(7)
    2.645751311, // ACN 14, sqrt(7)
    2.645751311, // ACN 15, sqrt(7)
];

pub const FROM_FUMA: [f32; MAX_AMBI_CHANNELS] = [
    1.414213562, // ACN  0 (W), sqrt(2)
    1.732050808, // ACN  1 (Y), sqrt(3)
    1.732050808, // ACN  2 (Z), sqrt(3)
    1.732050808, // ACN  3 (X), sqrt(3)
    1.936491673, // ACN  4 (V), sqrt(15)/2
    1.936491673, // ACN  5 (T), sqrt(15)/2
    2.236067978, // ACN  6 (R), sqrt(5)
    1.936491673, // ACN  7 (S), sqrt(15)/2
    1.936491673, // ACN  8 (U), sqrt(15)/2
    2.091650066, // ACN  9 (Q), sqrt(35/8)
    1.972026594, // ACN 10 (O), sqrt(35)/3
    2.231093404, // ACN 11 (M), sqrt(224/45)
    2.645751311, // ACN 12 (K), sqrt(7)
    2.231093404, // ACN 13 (L), sqrt(224/45)
    1.972026594, // ACN 14 (N), sqrt(35)/3
    2.091650066, // ACN 15 (P), sqrt(35/8)
];

/// FuMa channel order → ACN
pub const FROM_FUMA_INDEX: [usize; MAX_AMBI_CHANNELS] = [
    0,  // W
    3,  // X
    1,  // Y
    2,  // Z
    6,  // R
    7,  // S
    5,  // T
    8,  // U
    4,  // V
    12, // K
    13, // L
    11, // M
    14, // N
    10, // O
    15, // P
    9,  // Q
];

/// Horizontal FuMa channel order → ACN
pub const FROM_FUMA_2D_INDEX: [usize; MAX_AMBI_2D_CHANNELS] = [
    0,  // W
    3,  // X
    1,  // Y
    8,  // U
    4,  // V
    15, // P
    9,  // Q
];

/// Horizontal channel order → ACN
pub const FROM_ACN_2D_INDEX: [usize; MAX_AMBI_2D_CHANNELS] = [0, 1, 3, 4, 8, 9, 15];

pub const ORDER_FROM_CHANNEL: [usize; MAX_AMBI_CHANNELS] = [0, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3];

pub const ORDER_FROM_2D_CHANNEL: [usize; MAX_AMBI_2D_CHANNELS] = [0, 1, 1, 2, 2, 3, 3];

// Per-order HF gains of a decoder of the given order
const DECODER_HF_SCALE_1O: [f32; MAX_AMBI_ORDER + 1] = [1.0, 1.0, 0.0, 0.0];
const DECODER_HF_SCALE_2O: [f32; MAX_AMBI_ORDER + 1] = [7.453_56e-1, 1.0, 1.0, 0.0];
const DECODER_HF_SCALE_3O: [f32; MAX_AMBI_ORDER + 1] = [5.897_922e-1, 8.796_939e-1, 1.0, 1.0];

fn decoder_hf_scales(order: usize) -> &'static [f32; MAX_AMBI_ORDER + 1] {
    match order {
        0 | 1 => &DECODER_HF_SCALE_1O,
        2 => &DECODER_HF_SCALE_2O,
        _ => &DECODER_HF_SCALE_3O,
    }
}

/// Per-order HF gains for rendering an `in_order` signal on an `out_order`
/// decoder. Orders above `in_order` are left at zero.
pub fn get_hf_order_scales(in_order: usize, out_order: usize) -> AmbiResult<[f32; MAX_AMBI_ORDER + 1]> {
    if out_order < in_order {
        return Err(AmbiError::InvalidOrder(format!(
            "cannot render order {in_order} on an order {out_order} decoder"
        )));
    }
    if out_order > MAX_AMBI_ORDER {
        return Err(AmbiError::InvalidOrder(format!(
            "order {out_order} above maximum {MAX_AMBI_ORDER}"
        )));
    }

    let target = decoder_hf_scales(out_order);
    let input = decoder_hf_scales(in_order);

    let mut scales = [0.0; MAX_AMBI_ORDER + 1];
    for (i, scale) in scales.iter_mut().enumerate().take(in_order + 1) {
        *scale = input[i] / target[i];
    }
    Ok(scales)
}

/// Highest order covered by an ACN channel mask
pub fn order_from_mask(mask: u32) -> usize {
    if mask > AMBI_3ORDER_MASK {
        4
    } else if mask > AMBI_2ORDER_MASK {
        3
    } else if mask > AMBI_1ORDER_MASK {
        2
    } else if mask > AMBI_0ORDER_MASK {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_channel_counts() {
        assert_eq!(MAX_AMBI_CHANNELS, 16);
        assert_eq!(MAX_AMBI_2D_CHANNELS, 7);
        assert_eq!(ambi_channels_from_order(1), 4);
        assert_eq!(ambi_2d_channels_from_order(2), 5);
    }

    #[test]
    fn test_index_maps_are_consistent() {
        for (i, &acn) in FROM_ACN_2D_INDEX.iter().enumerate() {
            assert_eq!(ORDER_FROM_CHANNEL[acn], ORDER_FROM_2D_CHANNEL[i]);
            assert_eq!(AMBI_PERIPHONIC_MASK & (1 << acn), 0, "ACN {acn} is horizontal");
        }
        let mut seen = [false; MAX_AMBI_CHANNELS];
        for &acn in &FROM_FUMA_INDEX {
            seen[acn] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_hf_order_scales() {
        assert_eq!(get_hf_order_scales(1, 1).unwrap(), [1.0, 1.0, 0.0, 0.0]);

        let scales = get_hf_order_scales(1, 3).unwrap();
        assert_relative_eq!(scales[0], 1.0 / 0.589_792, epsilon = 1e-4);
        assert_relative_eq!(scales[1], 1.0 / 0.879_694, epsilon = 1e-4);
        assert_eq!(scales[2], 0.0);

        let same = get_hf_order_scales(3, 3).unwrap();
        assert!(same.iter().all(|&s| (s - 1.0).abs() < 1e-6));

        assert!(matches!(get_hf_order_scales(3, 1), Err(AmbiError::InvalidOrder(_))));
    }

    #[test]
    fn test_order_from_mask() {
        assert_eq!(order_from_mask(AMBI_1ORDER_MASK), 1);
        assert_eq!(order_from_mask(0x10b), 2);
        assert_eq!(order_from_mask(AMBI_3ORDER_MASK), 3);
        assert_eq!(order_from_mask(AMBI_4ORDER_MASK), 4);
    }
}
