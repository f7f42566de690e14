//! `.ambdec` decoder definition parser
//!
//! Reads the AmbDec v3 text format: global `/key value` settings, a
//! `/speakers/{ ... /}` block and one or two matrix blocks, terminated by
//! `/end`. Every error carries the 1-based line number.

use crate::defs::{AMBI_3ORDER_MASK, AMBI_4ORDER_MASK, AmbiNorm, MAX_AMBI_CHANNELS, MAX_AMBI_ORDER};
use crate::error::{AmbiError, AmbiResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

/// One `add_spkr` entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AmbDecSpeaker {
    pub name: String,
    /// Meters
    pub distance: f32,
    /// Degrees, counter-clockwise
    pub azimuth: f32,
    /// Degrees
    pub elevation: f32,
    pub connection: String,
}

/// A matrix row, indexed by ACN
pub type AmbDecRow = [f32; MAX_AMBI_CHANNELS];

/// Parsed decoder definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbDecConf {
    pub description: String,
    pub version: u32,
    pub chan_mask: u32,
    pub freq_bands: u32,
    pub coeff_scale: AmbiNorm,
    /// Crossover frequency (Hz) of a two-band decoder
    pub xover_freq: f32,
    /// HF/LF balance (dB) of a two-band decoder
    pub xover_ratio: f32,
    pub speakers: Vec<AmbDecSpeaker>,
    pub lf_order_gain: [f32; MAX_AMBI_ORDER + 1],
    pub lf_matrix: Vec<AmbDecRow>,
    pub hf_order_gain: [f32; MAX_AMBI_ORDER + 1],
    /// The only matrix of a single-band decoder
    pub hf_matrix: Vec<AmbDecRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Global,
    Speakers,
    LfMatrix,
    HfMatrix,
}

/// Parser state; optional fields are unset until their line is seen
struct Reader {
    description: String,
    version: Option<u32>,
    chan_mask: u32,
    freq_bands: u32,
    coeff_scale: Option<AmbiNorm>,
    xover_freq: f32,
    xover_ratio: f32,
    speaker_count: usize,
    speakers: Vec<AmbDecSpeaker>,
    lf_order_gain: [f32; MAX_AMBI_ORDER + 1],
    lf_matrix: Vec<AmbDecRow>,
    hf_order_gain: [f32; MAX_AMBI_ORDER + 1],
    hf_matrix: Vec<AmbDecRow>,
    scope: Scope,
}

fn next_value<T: FromStr>(tokens: &mut SplitWhitespace<'_>, line: usize, what: &str) -> AmbiResult<T> {
    let token = tokens
        .next()
        .ok_or_else(|| AmbiError::format(line, format!("Missing {what}")))?;
    token
        .parse()
        .map_err(|_| AmbiError::format(line, format!("Invalid {what}: {token}")))
}

/// Fail if anything other than a comment is left on the line
fn expect_end(tokens: &mut SplitWhitespace<'_>, line: usize, raw: &str) -> AmbiResult<()> {
    match tokens.next() {
        Some(token) if !token.starts_with('#') => {
            let junk = raw.find(token).map_or(token, |pos| &raw[pos..]);
            Err(AmbiError::format(line, format!("Extra junk on line: {junk}")))
        }
        _ => Ok(()),
    }
}

fn parse_mask(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).ok()
}

impl Reader {
    fn new() -> Self {
        Self {
            description: String::new(),
            version: None,
            chan_mask: 0,
            freq_bands: 0,
            coeff_scale: None,
            xover_freq: 0.0,
            xover_ratio: 0.0,
            speaker_count: 0,
            speakers: Vec::new(),
            lf_order_gain: [1.0; MAX_AMBI_ORDER + 1],
            lf_matrix: Vec::new(),
            hf_order_gain: [1.0; MAX_AMBI_ORDER + 1],
            hf_matrix: Vec::new(),
            scope: Scope::Global,
        }
    }

    fn fuma_over_third_order(&self) -> bool {
        self.chan_mask > AMBI_3ORDER_MASK && self.coeff_scale == Some(AmbiNorm::FuMa)
    }

    /// Handle one line. Returns the finished definition at `/end`.
    fn line(&mut self, line: usize, raw: &str) -> AmbiResult<Option<AmbDecConf>> {
        let mut tokens = raw.split_whitespace();
        let Some(command) = tokens.next() else {
            return Ok(None);
        };
        if command.starts_with('#') {
            return Ok(None);
        }

        if command == "/}" {
            if self.scope == Scope::Global {
                return Err(AmbiError::format(line, "Unexpected /} in global scope"));
            }
            self.scope = Scope::Global;
            expect_end(&mut tokens, line, raw)?;
            return Ok(None);
        }

        match self.scope {
            Scope::Speakers => self.speaker_command(command, &mut tokens, line)?,
            Scope::LfMatrix | Scope::HfMatrix => self.matrix_command(command, &mut tokens, line)?,
            Scope::Global => {
                if command == "/end" {
                    expect_end(&mut tokens, line, raw)?;
                    return self.finish(line).map(Some);
                }
                self.global_command(command, &mut tokens, line, raw)?;
            }
        }

        expect_end(&mut tokens, line, raw)?;
        Ok(None)
    }

    fn speaker_command(&mut self, command: &str, tokens: &mut SplitWhitespace<'_>, line: usize) -> AmbiResult<()> {
        if command != "add_spkr" {
            return Err(AmbiError::format(line, format!("Unexpected speakers command: {command}")));
        }
        if self.speakers.len() == self.speaker_count {
            return Err(AmbiError::format(line, "Too many speakers specified"));
        }

        let name: String = next_value(tokens, line, "speaker name")?;
        let speaker = AmbDecSpeaker {
            name,
            distance: next_value(tokens, line, "speaker distance")?,
            azimuth: next_value(tokens, line, "speaker azimuth")?,
            elevation: next_value(tokens, line, "speaker elevation")?,
            connection: tokens.next().unwrap_or_default().to_string(),
        };
        self.speakers.push(speaker);
        Ok(())
    }

    fn matrix_command(&mut self, command: &str, tokens: &mut SplitWhitespace<'_>, line: usize) -> AmbiResult<()> {
        let lf = self.scope == Scope::LfMatrix;
        match command {
            "order_gain" => {
                let count = if self.chan_mask > AMBI_3ORDER_MASK { 5 } else { 4 };
                let gains = if lf {
                    &mut self.lf_order_gain
                } else {
                    &mut self.hf_order_gain
                };
                for order in 0..count {
                    let value: f32 = next_value(tokens, line, "order gain")?;
                    if let Some(gain) = gains.get_mut(order) {
                        *gain = value;
                    }
                }
                Ok(())
            }
            "add_row" => {
                let rows = if lf { &mut self.lf_matrix } else { &mut self.hf_matrix };
                if rows.len() == self.speaker_count {
                    return Err(AmbiError::format(line, "Too many matrix rows specified"));
                }

                let mut row = [0.0; MAX_AMBI_CHANNELS];
                let mut dropped = 0;
                let mut mask = self.chan_mask;
                while mask != 0 {
                    let acn = mask.trailing_zeros() as usize;
                    mask &= !(1 << acn);

                    let value: f32 = next_value(tokens, line, "matrix value")?;
                    match row.get_mut(acn) {
                        Some(slot) => *slot = value,
                        None => dropped += 1,
                    }
                }
                if dropped > 0 {
                    log::debug!(
                        "[AmbDec] Line {line}: ignoring {dropped} coefficient(s) above ACN {}",
                        MAX_AMBI_CHANNELS - 1
                    );
                }
                rows.push(row);
                Ok(())
            }
            _ => Err(AmbiError::format(line, format!("Unexpected matrix command: {command}"))),
        }
    }

    fn global_command(
        &mut self,
        command: &str,
        tokens: &mut SplitWhitespace<'_>,
        line: usize,
        raw: &str,
    ) -> AmbiResult<()> {
        match command {
            "/description" => {
                let rest = raw.trim_start();
                self.description = rest[command.len()..].trim().to_string();
                // Consume the rest so it is not seen as junk
                tokens.for_each(drop);
            }
            "/version" => {
                if self.version.is_some() {
                    return Err(AmbiError::format(line, "Duplicate version definition"));
                }
                let version: u32 = next_value(tokens, line, "version")?;
                if version != 3 {
                    return Err(AmbiError::format(line, format!("Unsupported version: {version}")));
                }
                self.version = Some(version);
            }
            "/dec/chan_mask" => {
                if self.chan_mask != 0 {
                    return Err(AmbiError::format(line, "Duplicate chan_mask definition"));
                }
                let token = tokens.next().unwrap_or_default();
                self.chan_mask = parse_mask(token).unwrap_or(0);
                if self.chan_mask == 0 || self.chan_mask > AMBI_4ORDER_MASK {
                    return Err(AmbiError::format(line, format!("Invalid chan_mask: {token}")));
                }
                if self.fuma_over_third_order() {
                    return Err(AmbiError::format(line, "FuMa not compatible with over third-order"));
                }
            }
            "/dec/freq_bands" => {
                if self.freq_bands != 0 {
                    return Err(AmbiError::format(line, "Duplicate freq_bands"));
                }
                let bands: u32 = next_value(tokens, line, "freq_bands")?;
                if bands != 1 && bands != 2 {
                    return Err(AmbiError::format(line, format!("Invalid freq_bands: {bands}")));
                }
                self.freq_bands = bands;
            }
            "/dec/speakers" => {
                if self.speaker_count != 0 {
                    return Err(AmbiError::format(line, "Duplicate speakers"));
                }
                let count: usize = next_value(tokens, line, "speakers")?;
                if count == 0 {
                    return Err(AmbiError::format(line, "Invalid speakers: 0"));
                }
                self.speaker_count = count;
            }
            "/dec/coeff_scale" => {
                if self.coeff_scale.is_some() {
                    return Err(AmbiError::format(line, "Duplicate coeff_scale"));
                }
                let scale = match tokens.next().unwrap_or_default() {
                    "n3d" => AmbiNorm::N3D,
                    "sn3d" => AmbiNorm::SN3D,
                    "fuma" => AmbiNorm::FuMa,
                    other => {
                        return Err(AmbiError::format(line, format!("Unexpected coeff_scale: {other}")));
                    }
                };
                self.coeff_scale = Some(scale);
                if self.fuma_over_third_order() {
                    return Err(AmbiError::format(line, "FuMa not compatible with over third-order"));
                }
            }
            "/opt/xover_freq" => self.xover_freq = next_value(tokens, line, "xover_freq")?,
            "/opt/xover_ratio" => self.xover_ratio = next_value(tokens, line, "xover_ratio")?,
            "/opt/input_scale" | "/opt/nfeff_comp" | "/opt/delay_comp" | "/opt/level_comp" => {
                tokens.next();
            }
            "/speakers/{" => {
                if self.speaker_count == 0 {
                    return Err(AmbiError::format(line, "Speakers defined without a count"));
                }
                self.scope = Scope::Speakers;
            }
            "/lfmatrix/{" | "/hfmatrix/{" | "/matrix/{" => {
                if self.speaker_count == 0 {
                    return Err(AmbiError::format(line, "Matrix defined without a speaker count"));
                }
                if self.chan_mask == 0 {
                    return Err(AmbiError::format(line, "Matrix defined without a channel mask"));
                }
                self.scope = match (self.freq_bands, command) {
                    (1, "/matrix/{") => Scope::HfMatrix,
                    (1, _) => {
                        return Err(AmbiError::format(
                            line,
                            format!("Unexpected \"{command}\" for a single-band decoder"),
                        ));
                    }
                    (2, "/lfmatrix/{") => Scope::LfMatrix,
                    (2, "/hfmatrix/{") => Scope::HfMatrix,
                    (2, _) => {
                        return Err(AmbiError::format(
                            line,
                            format!("Unexpected \"{command}\" for a dual-band decoder"),
                        ));
                    }
                    _ => return Err(AmbiError::format(line, "Matrix defined without freq_bands")),
                };
            }
            _ => return Err(AmbiError::format(line, format!("Unexpected command: {command}"))),
        }
        Ok(())
    }

    fn finish(&mut self, line: usize) -> AmbiResult<AmbDecConf> {
        let count = self.speaker_count;
        if self.speakers.len() < count
            || self.hf_matrix.len() < count
            || (self.freq_bands == 2 && self.lf_matrix.len() < count)
        {
            return Err(AmbiError::format(line, "Incomplete decoder definition"));
        }
        let coeff_scale = self
            .coeff_scale
            .ok_or_else(|| AmbiError::format(line, "No coefficient scaling defined"))?;

        Ok(AmbDecConf {
            description: std::mem::take(&mut self.description),
            version: self.version.unwrap_or(3),
            chan_mask: self.chan_mask,
            freq_bands: self.freq_bands,
            coeff_scale,
            xover_freq: self.xover_freq,
            xover_ratio: self.xover_ratio,
            speakers: std::mem::take(&mut self.speakers),
            lf_order_gain: self.lf_order_gain,
            lf_matrix: std::mem::take(&mut self.lf_matrix),
            hf_order_gain: self.hf_order_gain,
            hf_matrix: std::mem::take(&mut self.hf_matrix),
        })
    }
}

impl AmbDecConf {
    /// Parse `.ambdec` text
    pub fn parse(text: &str) -> AmbiResult<Self> {
        let mut reader = Reader::new();
        let mut last_line = 0;
        for (i, raw) in text.lines().enumerate() {
            last_line = i + 1;
            if let Some(conf) = reader.line(last_line, raw)? {
                log::debug!(
                    "[AmbDec] Parsed {} speakers, mask {:#x}, {} band(s)",
                    conf.speakers.len(),
                    conf.chan_mask,
                    conf.freq_bands
                );
                return Ok(conf);
            }
        }
        Err(AmbiError::format(last_line, "Unexpected end of file"))
    }

    /// Load and parse a `.ambdec` file
    pub fn load(path: impl AsRef<Path>) -> AmbiResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// True when any channel of the mask carries height
    pub fn is_periphonic(&self) -> bool {
        self.chan_mask & crate::defs::AMBI_PERIPHONIC_MASK != 0
    }

    /// Whether this is a two-band definition
    pub fn is_dual_band(&self) -> bool {
        self.freq_bands == 2
    }
}
