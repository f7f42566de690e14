//! Direct and room low-pass parameters
//!
//! Obstruction, occlusion and exclusion all reduce to a pair of millibel
//! sums (full band and high frequency) that are converted to linear gains
//! for the shared low-pass filter.

use super::props::{Eax50SourceProperties, SendProperties};
use crate::fx_slot_index::EAX_MAX_FX_SLOTS;
use al_core::{clamp_f32, level_mb_to_gain};

/// Linear low-pass gains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassParam {
    pub gain: f32,
    pub gain_hf: f32,
}

impl LowpassParam {
    fn from_mb(gain_mb: f32, gain_hf_mb: f32, max_gain: f32) -> Self {
        Self {
            gain: clamp_f32(level_mb_to_gain(gain_mb), 0.0, max_gain),
            gain_hf: clamp_f32(level_mb_to_gain(gain_hf_mb), 0.0, max_gain),
        }
    }
}

/// Share of an occlusion level that reaches one path at low frequencies.
///
/// `occlusion * max(path_ratio * lf_ratio, path_ratio + lf_ratio - 1)`
pub fn calculate_dst_occlusion_mb(src_occlusion_mb: i32, path_ratio: f32, lf_ratio: f32) -> f32 {
    let ratio_1 = path_ratio + lf_ratio - 1.0;
    let ratio_2 = path_ratio * lf_ratio;
    src_occlusion_mb as f32 * ratio_2.max(ratio_1)
}

/// Direct path: source levels, obstruction, and the occlusion of the source
/// and of every active send
pub fn direct_filter_param(
    source: &Eax50SourceProperties,
    sends: &[SendProperties; EAX_MAX_FX_SLOTS],
    active: &[bool; EAX_MAX_FX_SLOTS],
    max_gain: f32,
) -> LowpassParam {
    let mut gain_mb = source.direct as f32
        + source.obstruction as f32 * source.obstruction_lf_ratio
        + calculate_dst_occlusion_mb(
            source.occlusion,
            source.occlusion_direct_ratio,
            source.occlusion_lf_ratio,
        );

    let mut gain_hf_mb = source.direct_hf as f32
        + source.obstruction as f32
        + source.occlusion as f32 * source.occlusion_direct_ratio;

    for send in sends.iter().zip(active).filter(|(_, on)| **on).map(|(s, _)| s) {
        gain_mb += calculate_dst_occlusion_mb(send.occlusion, send.occlusion_direct_ratio, send.occlusion_lf_ratio);
        gain_hf_mb += send.occlusion as f32 * send.occlusion_direct_ratio;
    }

    LowpassParam::from_mb(gain_mb, gain_hf_mb, max_gain)
}

/// Room path into one FX slot. Only the slot's occlusion level takes part;
/// its LF ratio is ignored.
pub fn room_filter_param(
    source: &Eax50SourceProperties,
    send: &SendProperties,
    slot_occlusion: i32,
    max_gain: f32,
) -> LowpassParam {
    let gain_mb = (source.room + send.send) as f32
        + calculate_dst_occlusion_mb(
            source.occlusion,
            source.occlusion_room_ratio,
            source.occlusion_lf_ratio,
        )
        + calculate_dst_occlusion_mb(send.occlusion, send.occlusion_room_ratio, send.occlusion_lf_ratio)
        + source.exclusion as f32 * source.exclusion_lf_ratio
        + send.exclusion as f32 * send.exclusion_lf_ratio;

    let gain_hf_mb = (source.room_hf + send.send_hf) as f32
        + (slot_occlusion + source.occlusion) as f32 * source.occlusion_room_ratio
        + send.occlusion as f32 * send.occlusion_room_ratio
        + (source.exclusion + send.exclusion) as f32;

    LowpassParam::from_mb(gain_mb, gain_hf_mb, max_gain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_occlusion_pass_through() {
        assert_relative_eq!(calculate_dst_occlusion_mb(-1200, 1.0, 1.0), -1200.0);
        assert_relative_eq!(calculate_dst_occlusion_mb(-1000, 0.0, 0.0), 0.0);
        // max(0.25, 0.75) picks the additive form
        assert_relative_eq!(calculate_dst_occlusion_mb(-1000, 1.0, 0.75), -750.0);
        // max(1.5 * 0.25, 1.5 + 0.25 - 1) = 0.75
        assert_relative_eq!(calculate_dst_occlusion_mb(-1000, 1.5, 0.25), -750.0);
    }

    #[test]
    fn test_defaults_are_unity() {
        let source = Eax50SourceProperties::default();
        let sends = [SendProperties::default(); EAX_MAX_FX_SLOTS];
        let active = [false, true, false, false];

        let direct = direct_filter_param(&source, &sends, &active, 1.0);
        assert_relative_eq!(direct.gain, 1.0);
        assert_relative_eq!(direct.gain_hf, 1.0);

        let room = room_filter_param(&source, &sends[1], 0, 1.0);
        assert_relative_eq!(room.gain, 1.0);
        assert_relative_eq!(room.gain_hf, 1.0);
    }

    #[test]
    fn test_direct_obstruction() {
        let source = Eax50SourceProperties {
            obstruction: -2000,
            obstruction_lf_ratio: 0.5,
            ..Default::default()
        };
        let sends = [SendProperties::default(); EAX_MAX_FX_SLOTS];
        let param = direct_filter_param(&source, &sends, &[false; EAX_MAX_FX_SLOTS], 1.0);
        // -1000 mB and -2000 mB
        assert_relative_eq!(param.gain, 10.0_f32.powf(-0.5), epsilon = 1e-6);
        assert_relative_eq!(param.gain_hf, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_direct_counts_only_active_sends() {
        let source = Eax50SourceProperties::default();
        let mut sends = [SendProperties::default(); EAX_MAX_FX_SLOTS];
        sends[2].occlusion = -2000;
        sends[2].occlusion_lf_ratio = 1.0;

        let idle = direct_filter_param(&source, &sends, &[true, false, false, false], 1.0);
        assert_relative_eq!(idle.gain_hf, 1.0);

        let busy = direct_filter_param(&source, &sends, &[false, false, true, false], 1.0);
        assert_relative_eq!(busy.gain, 0.1, epsilon = 1e-6);
        assert_relative_eq!(busy.gain_hf, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_room_exclusion_and_slot_occlusion() {
        let source = Eax50SourceProperties {
            exclusion: -1000,
            exclusion_lf_ratio: 0.0,
            occlusion_room_ratio: 1.0,
            ..Default::default()
        };
        let send = SendProperties::default();

        let param = room_filter_param(&source, &send, -1000, 1.0);
        // Exclusion LF ratio 0 keeps the full band untouched
        assert_relative_eq!(param.gain, 1.0);
        // -1000 (slot occlusion) - 1000 (exclusion)
        assert_relative_eq!(param.gain_hf, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_gain_clamp() {
        let source = Eax50SourceProperties {
            direct: 1000,
            ..Default::default()
        };
        let sends = [SendProperties::default(); EAX_MAX_FX_SLOTS];
        let active = [false; EAX_MAX_FX_SLOTS];

        assert_relative_eq!(direct_filter_param(&source, &sends, &active, 1.0).gain, 1.0);
        let boosted = direct_filter_param(&source, &sends, &active, 4.0);
        assert_relative_eq!(boosted.gain, 10.0_f32.powf(0.5), epsilon = 1e-5);
    }
}
