//! `.ambdec` speaker label → output channel mapping

use crate::ambdec::AmbDecConf;
use crate::error::{AmbiError, AmbiResult};
use al_core::OutputLayout;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of auxiliary channels a label can address
pub const MAX_AUX_CHANNELS: u8 = 16;

/// Output channel positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    FrontLeft,
    FrontRight,
    FrontCenter,
    Lfe,
    BackLeft,
    BackRight,
    BackCenter,
    SideLeft,
    SideRight,
    Aux(u8),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aux(n) => write!(f, "Aux{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

const QUAD: [Channel; 4] = [
    Channel::FrontLeft,
    Channel::FrontRight,
    Channel::BackLeft,
    Channel::BackRight,
];

const X51: [Channel; 6] = [
    Channel::FrontLeft,
    Channel::FrontRight,
    Channel::FrontCenter,
    Channel::Lfe,
    Channel::SideLeft,
    Channel::SideRight,
];

const X51_REAR: [Channel; 6] = [
    Channel::FrontLeft,
    Channel::FrontRight,
    Channel::FrontCenter,
    Channel::Lfe,
    Channel::BackLeft,
    Channel::BackRight,
];

const X61: [Channel; 7] = [
    Channel::FrontLeft,
    Channel::FrontRight,
    Channel::FrontCenter,
    Channel::Lfe,
    Channel::BackCenter,
    Channel::SideLeft,
    Channel::SideRight,
];

const X71: [Channel; 8] = [
    Channel::FrontLeft,
    Channel::FrontRight,
    Channel::FrontCenter,
    Channel::Lfe,
    Channel::BackLeft,
    Channel::BackRight,
    Channel::SideLeft,
    Channel::SideRight,
];

/// Output channels of a layout, in buffer order
pub fn layout_channels(layout: OutputLayout) -> &'static [Channel] {
    match layout {
        OutputLayout::Quad => &QUAD,
        OutputLayout::X51 => &X51,
        OutputLayout::X51Rear => &X51_REAR,
        OutputLayout::X61 => &X61,
        OutputLayout::X71 => &X71,
    }
}

fn aux_from_label(label: &str) -> Option<Channel> {
    let digits = label.strip_prefix("AUX")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (n < MAX_AUX_CHANNELS).then_some(Channel::Aux(n))
}

/// Channel a speaker label drives on `layout`.
///
/// 5.1 surrounds are named inconsistently in the wild, so `LS`/`RS` land on
/// the back pair of a rear 5.1 and `LB`/`RB` on the side pair of a side 5.1.
pub fn channel_from_label(label: &str, layout: OutputLayout) -> Option<Channel> {
    let channel = match label {
        "LF" => Channel::FrontLeft,
        "RF" => Channel::FrontRight,
        "CE" => Channel::FrontCenter,
        "CB" => Channel::BackCenter,
        "LS" if layout == OutputLayout::X51Rear => Channel::BackLeft,
        "RS" if layout == OutputLayout::X51Rear => Channel::BackRight,
        "LS" => Channel::SideLeft,
        "RS" => Channel::SideRight,
        "LB" if layout == OutputLayout::X51 => Channel::SideLeft,
        "RB" if layout == OutputLayout::X51 => Channel::SideRight,
        "LB" => Channel::BackLeft,
        "RB" => Channel::BackRight,
        _ => return aux_from_label(label),
    };
    Some(channel)
}

/// Output buffer index for every speaker of `conf`, in speaker order
pub fn make_speaker_map(conf: &AmbDecConf, layout: OutputLayout) -> AmbiResult<Vec<usize>> {
    let channels = layout_channels(layout);

    conf.speakers
        .iter()
        .map(|speaker| {
            let Some(channel) = channel_from_label(&speaker.name, layout) else {
                log::error!("[AmbDec] Unrecognized speaker name: {}", speaker.name);
                return Err(AmbiError::UnknownSpeaker(speaker.name.clone()));
            };

            channels.iter().position(|&c| c == channel).ok_or_else(|| {
                log::error!("[AmbDec] No {channel} channel on {layout:?} for speaker {}", speaker.name);
                AmbiError::UnknownSpeaker(format!("{} ({channel} not in {layout:?})", speaker.name))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambdec::AmbDecSpeaker;
    use crate::defs::AmbiNorm;

    fn conf_with(names: &[&str]) -> AmbDecConf {
        AmbDecConf {
            description: String::new(),
            version: 3,
            chan_mask: 0xf,
            freq_bands: 1,
            coeff_scale: AmbiNorm::N3D,
            xover_freq: 0.0,
            xover_ratio: 0.0,
            speakers: names
                .iter()
                .map(|name| AmbDecSpeaker {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
            lf_order_gain: [1.0; 4],
            lf_matrix: Vec::new(),
            hf_order_gain: [1.0; 4],
            hf_matrix: Vec::new(),
        }
    }

    #[test]
    fn test_surround_aliasing() {
        assert_eq!(channel_from_label("LS", OutputLayout::X51), Some(Channel::SideLeft));
        assert_eq!(channel_from_label("LS", OutputLayout::X51Rear), Some(Channel::BackLeft));
        assert_eq!(channel_from_label("RB", OutputLayout::X51), Some(Channel::SideRight));
        assert_eq!(channel_from_label("RB", OutputLayout::X71), Some(Channel::BackRight));
    }

    #[test]
    fn test_aux_labels() {
        assert_eq!(channel_from_label("AUX0", OutputLayout::X71), Some(Channel::Aux(0)));
        assert_eq!(channel_from_label("AUX15", OutputLayout::X71), Some(Channel::Aux(15)));
        assert_eq!(channel_from_label("AUX16", OutputLayout::X71), None);
        assert_eq!(channel_from_label("AUX3x", OutputLayout::X71), None);
        assert_eq!(channel_from_label("AUX", OutputLayout::X71), None);
    }

    #[test]
    fn test_speaker_map_x51() {
        let conf = conf_with(&["LF", "RF", "CE", "LB", "RB"]);
        let map = make_speaker_map(&conf, OutputLayout::X51).unwrap();
        assert_eq!(map, vec![0, 1, 2, 4, 5]);
    }

    #[test]
    fn test_speaker_map_quad() {
        let conf = conf_with(&["LF", "RF", "LB", "RB"]);
        assert_eq!(make_speaker_map(&conf, OutputLayout::Quad).unwrap(), vec![0, 1, 2, 3]);

        // Quad has no center
        let conf = conf_with(&["LF", "CE"]);
        assert!(matches!(
            make_speaker_map(&conf, OutputLayout::Quad),
            Err(AmbiError::UnknownSpeaker(_))
        ));
    }

    #[test]
    fn test_unknown_label() {
        let conf = conf_with(&["LF", "XYZ"]);
        match make_speaker_map(&conf, OutputLayout::X71) {
            Err(AmbiError::UnknownSpeaker(name)) => assert_eq!(name, "XYZ"),
            other => panic!("expected UnknownSpeaker, got {other:?}"),
        }
    }
}
