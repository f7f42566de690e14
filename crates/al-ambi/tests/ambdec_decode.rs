//! `.ambdec` → B-Format decode integration tests
//!
//! Parses decoder definitions, maps their speakers onto output layouts
//! and runs panned or constant signals through `BFormatDec`:
//! - Single-band horizontal square on quad
//! - Dual-band periphonic 5.0 on 5.1 side and rear layouts
//! - File loading and layout mismatches

use al_ambi::decoder::BUFFER_SIZE;
use al_ambi::{
    AmbDecConf, AmbiError, AmbiNorm, BFormatDec, DecoderMatrix, calc_angle_coeffs, make_speaker_map,
};
use al_core::{AmbiConfig, OutputLayout};
use approx::assert_relative_eq;
use std::f32::consts::FRAC_PI_4;

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

const SQUARE: &str = "\
/description First-order square
/version 3
/dec/chan_mask b
/dec/freq_bands 1
/dec/speakers 4
/dec/coeff_scale n3d
/opt/input_scale n3d
/opt/nfeff_comp none
/opt/delay_comp on
/opt/level_comp on
/speakers/{
add_spkr LF 1.5  45.0 0.0
add_spkr RF 1.5 -45.0 0.0
add_spkr LB 1.5  135.0 0.0
add_spkr RB 1.5 -135.0 0.0
/}
/matrix/{
order_gain 1.0 1.0 0.0 0.0
add_row 0.25  0.141421  0.141421
add_row 0.25 -0.141421  0.141421
add_row 0.25  0.141421 -0.141421
add_row 0.25 -0.141421 -0.141421
/}
/end
";

const FIVE: &str = "\
/description Dual-band 5.0
/version 3
/dec/chan_mask f
/dec/freq_bands 2
/dec/speakers 5
/dec/coeff_scale sn3d
/opt/xover_freq 400.0
/opt/xover_ratio 0.0
/speakers/{
add_spkr LF 1.0  30.0 0.0
add_spkr RF 1.0 -30.0 0.0
add_spkr CE 1.0   0.0 0.0
add_spkr LS 1.0  110.0 0.0
add_spkr RS 1.0 -110.0 0.0
/}
/lfmatrix/{
order_gain 1.0 1.0 0.0 0.0
add_row 0.3 0.1 0.0 0.1
add_row 0.3 -0.1 0.0 0.1
add_row 0.2 0.0 0.0 0.1
add_row 0.4 0.1 0.0 -0.1
add_row 0.4 -0.1 0.0 -0.1
/}
/hfmatrix/{
order_gain 1.0 0.8 0.0 0.0
add_row 0.1 0.1 0.0 0.1
add_row 0.1 -0.1 0.0 0.1
add_row 0.1 0.0 0.0 0.1
add_row 0.1 0.1 0.0 -0.1
add_row 0.1 -0.1 0.0 -0.1
/}
/end
";

fn build_decoder(text: &str, layout: OutputLayout, in_channels: usize) -> BFormatDec {
    let config = AmbiConfig {
        layout,
        ..AmbiConfig::default()
    };
    let conf = AmbDecConf::parse(text).unwrap();
    let map = make_speaker_map(&conf, config.layout).unwrap();
    let matrix =
        DecoderMatrix::from_ambdec(&conf, in_channels, &map, config.sample_rate, config.allow_dual_band).unwrap();
    BFormatDec::new(matrix)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SINGLE BAND
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_square_pans_to_front_left() {
    let mut dec = build_decoder(SQUARE, OutputLayout::Quad, 3);
    assert!(!dec.is_dual_band());
    assert_eq!(dec.num_outputs(), 4);

    // Front-left is 45 degrees to the left
    let coeffs = calc_angle_coeffs(-FRAC_PI_4, 0.0, 0.0);
    let input: Vec<Vec<f32>> = [coeffs[0], coeffs[1], coeffs[3]]
        .iter()
        .map(|&c| vec![c; 32])
        .collect();
    let mut out = vec![vec![0.0_f32; 32]; 4];
    dec.process(&mut out, &input, 32).unwrap();

    assert_relative_eq!(out[0][0], 0.596_41, epsilon = 1e-4);
    assert_relative_eq!(out[1][0], 0.25, epsilon = 1e-4);
    assert_relative_eq!(out[2][0], 0.25, epsilon = 1e-4);
    assert_relative_eq!(out[3][0], -0.096_41, epsilon = 1e-4);
}

#[test]
fn test_square_on_surround_layouts() {
    let conf = AmbDecConf::parse(SQUARE).unwrap();
    // 5.1 side layouts send LB/RB to the sides
    assert_eq!(make_speaker_map(&conf, OutputLayout::X51).unwrap(), vec![0, 1, 4, 5]);
    assert_eq!(make_speaker_map(&conf, OutputLayout::X71).unwrap(), vec![0, 1, 4, 5]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DUAL BAND
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_five_dual_band_dc() {
    let mut dec = build_decoder(FIVE, OutputLayout::X51, 4);
    assert!(dec.is_dual_band());
    assert_eq!(dec.num_outputs(), 6);

    let samples = 4 * BUFFER_SIZE;
    let mut input = vec![vec![0.0_f32; samples]; 4];
    input[0].fill(1.0);
    let mut out = vec![vec![0.0_f32; samples]; 6];
    dec.process(&mut out, &input, samples).unwrap();

    // DC is all low band: the LF W gains
    let last = samples - 1;
    assert!((out[0][last] - 0.3).abs() < 1e-3);
    assert!((out[2][last] - 0.2).abs() < 1e-3);
    assert!((out[4][last] - 0.4).abs() < 1e-3);
    // LFE is not driven
    assert!(out[3].iter().all(|&s| s == 0.0));
}

#[test]
fn test_five_rear_layout() {
    let conf = AmbDecConf::parse(FIVE).unwrap();
    assert_eq!(conf.coeff_scale, AmbiNorm::SN3D);
    assert_eq!(make_speaker_map(&conf, OutputLayout::X51Rear).unwrap(), vec![0, 1, 2, 4, 5]);
    // 7.1 keeps LS/RS on the sides
    assert_eq!(make_speaker_map(&conf, OutputLayout::X71).unwrap(), vec![0, 1, 2, 6, 7]);
    assert!(matches!(
        make_speaker_map(&conf, OutputLayout::Quad),
        Err(AmbiError::UnknownSpeaker(_))
    ));
}

#[test]
fn test_five_single_band_fallback() {
    let conf = AmbDecConf::parse(FIVE).unwrap();
    let map = make_speaker_map(&conf, OutputLayout::X51).unwrap();
    let matrix = DecoderMatrix::from_ambdec(&conf, 4, &map, 48_000, false).unwrap();
    assert!(!matrix.dual_band);

    // HF Y gain for LF: 0.1 / sqrt(3) * 0.8
    assert_relative_eq!(matrix.hf[[0, 1]], 0.1 / 3.0_f32.sqrt() * 0.8, epsilon = 1e-6);
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("al-ambi-square-{}.ambdec", std::process::id()));
    std::fs::write(&path, SQUARE).unwrap();
    let conf = AmbDecConf::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(conf.description, "First-order square");
    assert_eq!(conf.speakers.len(), 4);
    assert_eq!(conf.speakers[0].distance, 1.5);
}

#[test]
fn test_load_missing_file() {
    let err = AmbDecConf::load("/nonexistent/decoder.ambdec").unwrap_err();
    assert!(matches!(err, AmbiError::Io(_)));
}

#[test]
fn test_conf_serializes() {
    let conf = AmbDecConf::parse(SQUARE).unwrap();
    let json = serde_json::to_string(&conf).unwrap();
    assert!(json.contains("\"chan_mask\":11"));
    assert!(json.contains("\"coeff_scale\":\"N3D\""));
}
