//! B-Format decoder
//!
//! `DecoderMatrix` turns an `.ambdec` definition into per-output gains;
//! `BFormatDec` applies them to ambisonic input, optionally splitting each
//! input channel into two bands first.

use crate::ambdec::AmbDecConf;
use crate::defs::{FROM_ACN_2D_INDEX, MAX_AMBI_2D_CHANNELS, MAX_AMBI_CHANNELS, ORDER_FROM_CHANNEL};
use crate::error::{AmbiError, AmbiResult};
use crate::splitter::BandSplitter;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Samples processed per splitter pass
pub const BUFFER_SIZE: usize = 1024;

/// Decoder gains, shaped `[output channel, input channel]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderMatrix {
    pub dual_band: bool,
    /// Crossover frequency / sample rate
    pub xover_f0norm: f32,
    /// High band gains, or the full-range gains of a single-band decoder
    pub hf: Array2<f32>,
    pub lf: Option<Array2<f32>>,
}

impl DecoderMatrix {
    /// Build gains for `in_channels` ambisonic inputs.
    ///
    /// `channel_map[i]` is the output buffer of speaker `i`. Horizontal-only
    /// definitions read their inputs in 2D channel order.
    pub fn from_ambdec(
        conf: &AmbDecConf,
        in_channels: usize,
        channel_map: &[usize],
        sample_rate: u32,
        allow_dual_band: bool,
    ) -> AmbiResult<Self> {
        let periphonic = conf.is_periphonic();
        let max_inputs = if periphonic {
            MAX_AMBI_CHANNELS
        } else {
            MAX_AMBI_2D_CHANNELS
        };
        if in_channels > max_inputs {
            return Err(AmbiError::ChannelMismatch {
                expected: max_inputs,
                got: in_channels,
            });
        }
        if channel_map.len() != conf.speakers.len() {
            return Err(AmbiError::ChannelMismatch {
                expected: conf.speakers.len(),
                got: channel_map.len(),
            });
        }

        let dual_band = allow_dual_band && conf.is_dual_band();
        let num_outputs = channel_map.iter().max().map_or(0, |&c| c + 1);
        let scales = conf.coeff_scale.scales();
        let ratio = if dual_band {
            10.0_f32.powf(conf.xover_ratio / 40.0)
        } else {
            1.0
        };

        let mut hf = Array2::<f32>::zeros((num_outputs, in_channels));
        let mut lf = dual_band.then(|| Array2::<f32>::zeros((num_outputs, in_channels)));

        for (i, &chan) in channel_map.iter().enumerate() {
            let hf_row = conf.hf_matrix.get(i).ok_or(AmbiError::ChannelMismatch {
                expected: conf.speakers.len(),
                got: conf.hf_matrix.len(),
            })?;
            let lf_row = if dual_band {
                Some(conf.lf_matrix.get(i).ok_or(AmbiError::ChannelMismatch {
                    expected: conf.speakers.len(),
                    got: conf.lf_matrix.len(),
                })?)
            } else {
                None
            };

            for j in 0..in_channels {
                let acn = if periphonic { j } else { FROM_ACN_2D_INDEX[j] };
                if conf.chan_mask & (1 << acn) == 0 {
                    continue;
                }
                let order = ORDER_FROM_CHANNEL[acn];

                hf[[chan, j]] = hf_row[acn] / scales[acn] * conf.hf_order_gain[order] * ratio;
                if let (Some(lf), Some(lf_row)) = (lf.as_mut(), lf_row) {
                    lf[[chan, j]] = lf_row[acn] / scales[acn] * conf.lf_order_gain[order] / ratio;
                }
            }
        }

        let xover_f0norm = if dual_band {
            conf.xover_freq / sample_rate.max(1) as f32
        } else {
            0.0
        };
        if dual_band {
            log::debug!(
                "[BFormatDec] Dual-band: crossover {:.1} Hz, ratio {:.1} dB",
                conf.xover_freq,
                conf.xover_ratio
            );
        }

        Ok(Self {
            dual_band,
            xover_f0norm,
            hf,
            lf,
        })
    }

    pub fn num_outputs(&self) -> usize {
        self.hf.nrows()
    }

    pub fn in_channels(&self) -> usize {
        self.hf.ncols()
    }
}

/// Streaming ambisonic decoder
pub struct BFormatDec {
    hf: Array2<f32>,
    lf: Option<Array2<f32>>,
    /// One per input channel; unused by a single-band decoder
    splitters: Vec<BandSplitter>,
    hf_scratch: Vec<f32>,
    lf_scratch: Vec<f32>,
}

impl BFormatDec {
    pub fn new(matrix: DecoderMatrix) -> Self {
        let in_channels = matrix.in_channels();
        let (splitters, scratch_len) = if matrix.lf.is_some() {
            (vec![BandSplitter::new(matrix.xover_f0norm); in_channels], BUFFER_SIZE)
        } else {
            (Vec::new(), 0)
        };

        Self {
            hf: matrix.hf,
            lf: matrix.lf,
            splitters,
            hf_scratch: vec![0.0; scratch_len],
            lf_scratch: vec![0.0; scratch_len],
        }
    }

    /// Single-band decoder from per-output coefficient rows
    pub fn from_rows(in_channels: usize, rows: &[[f32; MAX_AMBI_CHANNELS]]) -> AmbiResult<Self> {
        if in_channels > MAX_AMBI_CHANNELS {
            return Err(AmbiError::ChannelMismatch {
                expected: MAX_AMBI_CHANNELS,
                got: in_channels,
            });
        }

        let mut hf = Array2::<f32>::zeros((rows.len(), in_channels));
        for (o, row) in rows.iter().enumerate() {
            for j in 0..in_channels {
                hf[[o, j]] = row[j];
            }
        }

        Ok(Self::new(DecoderMatrix {
            dual_band: false,
            xover_f0norm: 0.0,
            hf,
            lf: None,
        }))
    }

    pub fn in_channels(&self) -> usize {
        self.hf.ncols()
    }

    pub fn num_outputs(&self) -> usize {
        self.hf.nrows()
    }

    pub fn is_dual_band(&self) -> bool {
        self.lf.is_some()
    }

    /// Clear the band splitters
    pub fn reset(&mut self) {
        self.splitters.iter_mut().for_each(BandSplitter::clear);
    }

    /// Decode `samples` frames of `input` and add them into `out`
    pub fn process<O, I>(&mut self, out: &mut [O], input: &[I], samples: usize) -> AmbiResult<()>
    where
        O: AsMut<[f32]>,
        I: AsRef<[f32]>,
    {
        if input.len() < self.in_channels() {
            return Err(AmbiError::ChannelMismatch {
                expected: self.in_channels(),
                got: input.len(),
            });
        }
        if out.len() < self.num_outputs() {
            return Err(AmbiError::ChannelMismatch {
                expected: self.num_outputs(),
                got: out.len(),
            });
        }
        for len in input
            .iter()
            .take(self.in_channels())
            .map(|b| b.as_ref().len())
            .chain(out.iter_mut().take(self.num_outputs()).map(|b| b.as_mut().len()))
        {
            if len < samples {
                return Err(AmbiError::ChannelMismatch {
                    expected: samples,
                    got: len,
                });
            }
        }

        match &self.lf {
            None => {
                for (j, chan) in input.iter().take(self.in_channels()).enumerate() {
                    mix(out, self.hf.column(j).iter().copied(), &chan.as_ref()[..samples]);
                }
            }
            Some(lf) => {
                for (j, chan) in input.iter().take(self.in_channels()).enumerate() {
                    let chan = &chan.as_ref()[..samples];
                    let splitter = &mut self.splitters[j];

                    let mut pos = 0;
                    while pos < samples {
                        let todo = (samples - pos).min(BUFFER_SIZE);
                        let hf_band = &mut self.hf_scratch[..todo];
                        let lf_band = &mut self.lf_scratch[..todo];
                        splitter.process(&chan[pos..pos + todo], hf_band, lf_band);

                        mix_at(out, self.hf.column(j).iter().copied(), hf_band, pos);
                        mix_at(out, lf.column(j).iter().copied(), lf_band, pos);
                        pos += todo;
                    }
                }
            }
        }
        Ok(())
    }
}

fn mix<O: AsMut<[f32]>>(out: &mut [O], gains: impl Iterator<Item = f32>, input: &[f32]) {
    mix_at(out, gains, input, 0);
}

/// Add `gain * input` into every output at `offset`, skipping silent gains
fn mix_at<O: AsMut<[f32]>>(out: &mut [O], gains: impl Iterator<Item = f32>, input: &[f32], offset: usize) {
    for (dst, gain) in out.iter_mut().zip(gains) {
        if gain.abs() <= f32::EPSILON {
            continue;
        }
        let dst = &mut dst.as_mut()[offset..offset + input.len()];
        for (d, &s) in dst.iter_mut().zip(input) {
            *d += s * gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambdec::AmbDecSpeaker;
    use crate::defs::AmbiNorm;
    use approx::assert_relative_eq;

    fn speaker(name: &str) -> AmbDecSpeaker {
        AmbDecSpeaker {
            name: name.into(),
            distance: 1.0,
            ..Default::default()
        }
    }

    /// Horizontal first order, two speakers
    fn conf(freq_bands: u32, coeff_scale: AmbiNorm) -> AmbDecConf {
        let mut lf = [0.0; MAX_AMBI_CHANNELS];
        lf[0] = 0.5;
        let mut hf = [0.0; MAX_AMBI_CHANNELS];
        hf[0] = 0.25;
        hf[1] = 0.5;
        hf[3] = 0.75;

        AmbDecConf {
            description: String::new(),
            version: 3,
            chan_mask: 0xb,
            freq_bands,
            coeff_scale,
            xover_freq: 400.0,
            xover_ratio: 0.0,
            speakers: vec![speaker("LF"), speaker("RF")],
            lf_order_gain: [1.0; 4],
            lf_matrix: vec![lf, lf],
            hf_order_gain: [1.0, 0.5, 0.0, 0.0],
            hf_matrix: vec![hf, hf],
        }
    }

    #[test]
    fn test_single_band_gains() {
        let matrix = DecoderMatrix::from_ambdec(&conf(1, AmbiNorm::SN3D), 3, &[1, 0], 48_000, true).unwrap();
        assert!(!matrix.dual_band);
        assert!(matrix.lf.is_none());
        assert_eq!(matrix.hf.dim(), (2, 3));

        // 2D input order: ACN 0, 1, 3
        assert_relative_eq!(matrix.hf[[1, 0]], 0.25);
        assert_relative_eq!(matrix.hf[[1, 1]], 0.5 / 3.0_f32.sqrt() * 0.5, epsilon = 1e-6);
        assert_relative_eq!(matrix.hf[[1, 2]], 0.75 / 3.0_f32.sqrt() * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_dual_band_ratio() {
        let mut c = conf(2, AmbiNorm::N3D);
        c.xover_ratio = 40.0;
        let matrix = DecoderMatrix::from_ambdec(&c, 3, &[0, 1], 48_000, true).unwrap();
        assert!(matrix.dual_band);
        assert_relative_eq!(matrix.xover_f0norm, 400.0 / 48_000.0);

        let lf = matrix.lf.as_ref().unwrap();
        assert_relative_eq!(matrix.hf[[0, 0]], 2.5, epsilon = 1e-5);
        assert_relative_eq!(lf[[0, 0]], 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_dual_band_disabled_uses_hf() {
        let mut c = conf(2, AmbiNorm::N3D);
        c.xover_ratio = 40.0;
        let matrix = DecoderMatrix::from_ambdec(&c, 3, &[0, 1], 48_000, false).unwrap();
        assert!(!matrix.dual_band);
        assert!(matrix.lf.is_none());
        assert_relative_eq!(matrix.hf[[0, 0]], 0.25);
    }

    #[test]
    fn test_matrix_shape_errors() {
        let c = conf(1, AmbiNorm::N3D);
        assert!(matches!(
            DecoderMatrix::from_ambdec(&c, 3, &[0], 48_000, true),
            Err(AmbiError::ChannelMismatch { expected: 2, got: 1 })
        ));
        // Horizontal definitions take at most 7 inputs
        assert!(DecoderMatrix::from_ambdec(&c, 9, &[0, 1], 48_000, true).is_err());
    }

    #[test]
    fn test_process_accumulates() {
        let matrix = DecoderMatrix::from_ambdec(&conf(1, AmbiNorm::N3D), 3, &[0, 1], 48_000, true).unwrap();
        let mut dec = BFormatDec::new(matrix);

        let input = vec![vec![1.0_f32; 64], vec![0.0; 64], vec![0.0; 64]];
        let mut out = vec![vec![1.0_f32; 64]; 2];
        dec.process(&mut out, &input, 64).unwrap();

        assert_relative_eq!(out[0][10], 1.25);
        assert_relative_eq!(out[1][63], 1.25);
    }

    #[test]
    fn test_dual_band_dc_uses_low_band() {
        let matrix = DecoderMatrix::from_ambdec(&conf(2, AmbiNorm::N3D), 3, &[0, 1], 48_000, true).unwrap();
        let mut dec = BFormatDec::new(matrix);
        assert!(dec.is_dual_band());

        let samples = 3 * BUFFER_SIZE + 100;
        let input = vec![vec![1.0_f32; samples], vec![0.0; samples], vec![0.0; samples]];
        let mut out = vec![vec![0.0_f32; samples]; 2];
        dec.process(&mut out, &input, samples).unwrap();

        assert!((out[0][samples - 1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_split_calls_match_single_call() {
        let matrix = DecoderMatrix::from_ambdec(&conf(2, AmbiNorm::N3D), 3, &[0, 1], 48_000, true).unwrap();
        let mut whole = BFormatDec::new(matrix.clone());
        let mut split = BFormatDec::new(matrix);

        let input: Vec<Vec<f32>> = (0..3)
            .map(|c| (0..2000).map(|i| ((i * (c + 3)) % 17) as f32 / 17.0 - 0.5).collect())
            .collect();

        let mut out_a = vec![vec![0.0_f32; 2000]; 2];
        whole.process(&mut out_a, &input, 2000).unwrap();

        let mut out_b = vec![vec![0.0_f32; 2000]; 2];
        let first: Vec<&[f32]> = input.iter().map(|c| &c[..700]).collect();
        let second: Vec<&[f32]> = input.iter().map(|c| &c[700..]).collect();
        {
            let (mut lo, mut hi): (Vec<_>, Vec<_>) = out_b.iter_mut().map(|c| c.split_at_mut(700)).unzip();
            split.process(&mut lo, &first, 700).unwrap();
            split.process(&mut hi, &second, 1300).unwrap();
        }

        for ch in 0..2 {
            for i in 0..2000 {
                assert!((out_a[ch][i] - out_b[ch][i]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_from_rows_and_buffer_checks() {
        let mut row = [0.0; MAX_AMBI_CHANNELS];
        row[0] = 0.5;
        let mut dec = BFormatDec::from_rows(4, &[row]).unwrap();
        assert_eq!(dec.num_outputs(), 1);
        assert!(!dec.is_dual_band());

        let input = vec![vec![2.0_f32; 8]; 4];
        let mut out = vec![vec![0.0_f32; 8]];
        dec.process(&mut out, &input, 8).unwrap();
        assert_relative_eq!(out[0][0], 1.0);

        let mut short = vec![vec![0.0_f32; 4]];
        assert!(matches!(
            dec.process(&mut short, &input, 8),
            Err(AmbiError::ChannelMismatch { expected: 8, got: 4 })
        ));
        assert!(dec.process(&mut out, &input[..2], 8).is_err());
        assert!(BFormatDec::from_rows(17, &[row]).is_err());
    }
}
