//! Panning coefficients
//!
//! Closed-form N3D spherical harmonics up to third order. Directions use
//! ambisonic axes: Y left, Z up, X front.

use crate::defs::{MAX_AMBI_CHANNELS, ORDER_FROM_CHANNEL};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// One coefficient per ACN channel
pub type AmbiCoeffs = [f32; MAX_AMBI_CHANNELS];

/// Where a mix channel reads its ambisonic signal from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BFChannelConfig {
    pub scale: f32,
    /// ACN index
    pub index: usize,
}

/// Encoder coefficients for a unit direction `(y, z, x)`.
///
/// A positive `spread` (radians) widens the source into a spherical cap,
/// attenuating higher orders and raising the level by up to 3 dB at full
/// spread.
pub fn calc_ambi_coeffs(y: f32, z: f32, x: f32, spread: f32) -> AmbiCoeffs {
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, yz, xz) = (x * y, y * z, x * z);

    let mut coeffs = [
        // Zeroth order
        1.0,
        // First order
        1.732_050_8 * y,
        1.732_050_8 * z,
        1.732_050_8 * x,
        // Second order
        3.872_983_3 * xy,
        3.872_983_3 * yz,
        1.118_034 * (3.0 * zz - 1.0),
        3.872_983_3 * xz,
        1.936_491_7 * (xx - yy),
        // Third order
        2.091_650_1 * (y * (3.0 * xx - yy)),
        10.246_951 * (z * xy),
        1.620_185_2 * (y * (5.0 * zz - 1.0)),
        1.322_875_7 * (z * (5.0 * zz - 3.0)),
        1.620_185_2 * (x * (5.0 * zz - 1.0)),
        5.123_475_4 * (z * (xx - yy)),
        2.091_650_1 * (x * (xx - 3.0 * yy)),
    ];

    if spread > 0.0 {
        let ca = (spread * 0.5).cos();
        let scale = (1.0 + spread / TAU).sqrt();

        let zh = [
            scale,
            0.5 * (ca + 1.0) * scale,
            0.5 * (ca + 1.0) * ca * scale,
            0.125 * (ca + 1.0) * (5.0 * ca * ca - 1.0) * scale,
        ];
        for (acn, coeff) in coeffs.iter_mut().enumerate() {
            *coeff *= zh[ORDER_FROM_CHANNEL[acn]];
        }
    }

    coeffs
}

/// Coefficients for an OpenAL-space direction `[x, y, z]` (right-handed,
/// -Z front)
pub fn calc_direction_coeffs(dir: [f32; 3], spread: f32) -> AmbiCoeffs {
    calc_ambi_coeffs(-dir[0], dir[1], -dir[2], spread)
}

/// Coefficients for spherical angles in radians. Azimuth is positive to the
/// right, elevation positive upward.
pub fn calc_angle_coeffs(azimuth: f32, elevation: f32, spread: f32) -> AmbiCoeffs {
    let x = azimuth.sin() * elevation.cos();
    let y = elevation.sin();
    let z = -azimuth.cos() * elevation.cos();
    calc_direction_coeffs([x, y, z], spread)
}

/// Gain per mix channel: `map[i].scale * coeffs[map[i].index] * in_gain`
pub fn compute_pan_gains(ambi_map: &[BFChannelConfig], coeffs: &AmbiCoeffs, in_gain: f32) -> Vec<f32> {
    ambi_map
        .iter()
        .map(|chan| chan.scale * coeffs.get(chan.index).copied().unwrap_or(0.0) * in_gain)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_front_direction() {
        // OpenAL front is -Z, which is ambisonic +X
        let c = calc_direction_coeffs([0.0, 0.0, -1.0], 0.0);
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 0.0);
        assert_relative_eq!(c[2], 0.0);
        assert_relative_eq!(c[3], 3.0_f32.sqrt(), epsilon = 1e-6);
        // sqrt(15)/2
        assert_relative_eq!(c[8], 1.936_491_7, epsilon = 1e-6);
        // sqrt(35/8)
        assert_relative_eq!(c[15], 2.091_650_1, epsilon = 1e-6);
    }

    #[test]
    fn test_angles_match_direction() {
        // 90 degrees right is OpenAL +X, ambisonic -Y
        let c = calc_angle_coeffs(FRAC_PI_2, 0.0, 0.0);
        assert_relative_eq!(c[1], -3.0_f32.sqrt(), epsilon = 1e-5);
        assert!(c[3].abs() < 1e-5);

        let up = calc_angle_coeffs(0.0, FRAC_PI_2, 0.0);
        assert_relative_eq!(up[2], 3.0_f32.sqrt(), epsilon = 1e-5);
        // sqrt(5)/2 * (3 - 1)
        assert_relative_eq!(up[6], 2.236_068, epsilon = 1e-5);
    }

    #[test]
    fn test_unit_energy_at_first_order() {
        let c = calc_angle_coeffs(0.7, 0.3, 0.0);
        let first = (c[1] * c[1] + c[2] * c[2] + c[3] * c[3]) / 3.0;
        assert_relative_eq!(first, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_full_spread() {
        let plain = calc_ambi_coeffs(0.0, 0.0, 1.0, 0.0);
        let wide = calc_ambi_coeffs(0.0, 0.0, 1.0, 2.0 * PI);

        // +3 dB on the omni channel, everything directional vanishes
        assert_relative_eq!(wide[0], 2.0_f32.sqrt(), epsilon = 1e-6);
        assert!(wide[3].abs() < 1e-6);
        assert!(wide[8].abs() < 1e-6);
        assert_relative_eq!(plain[0], 1.0);
    }

    #[test]
    fn test_pan_gains() {
        let coeffs = calc_ambi_coeffs(0.0, 0.0, 1.0, 0.0);
        let map = [
            BFChannelConfig { scale: 1.0, index: 0 },
            BFChannelConfig { scale: 0.5, index: 3 },
            BFChannelConfig { scale: 1.0, index: 99 },
        ];
        let gains = compute_pan_gains(&map, &coeffs, 0.5);
        assert_eq!(gains.len(), 3);
        assert_relative_eq!(gains[0], 0.5);
        assert_relative_eq!(gains[1], 0.25 * 3.0_f32.sqrt(), epsilon = 1e-6);
        assert_eq!(gains[2], 0.0);
    }
}
