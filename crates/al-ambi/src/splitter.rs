//! Two-band crossover
//!
//! Splits a signal into low and high bands whose sum is an all-pass
//! filtered copy of the input. The low band is two cascaded one-pole
//! low-passes; the high band is the all-pass output minus the low band.
//! Filter state carries over between `process` calls.

use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandSplitter {
    coeff: f32,
    lp_z1: f32,
    lp_z2: f32,
    ap_z1: f32,
}

impl BandSplitter {
    /// Splitter with the crossover at `f0norm` (frequency / sample rate)
    pub fn new(f0norm: f32) -> Self {
        let mut splitter = Self::default();
        splitter.init(f0norm);
        splitter
    }

    /// Set the crossover and clear the state
    pub fn init(&mut self, f0norm: f32) {
        let w = f0norm * TAU;
        let cw = w.cos();
        self.coeff = if cw > f32::EPSILON {
            (w.sin() - 1.0) / cw
        } else {
            cw * -0.5
        };
        self.clear();
    }

    pub fn clear(&mut self) {
        self.lp_z1 = 0.0;
        self.lp_z2 = 0.0;
        self.ap_z1 = 0.0;
    }

    /// Split `input` into `hp_out` and `lp_out`. Output slices must be at
    /// least as long as `input`.
    pub fn process(&mut self, input: &[f32], hp_out: &mut [f32], lp_out: &mut [f32]) {
        let ap_coeff = self.coeff;
        let lp_coeff = self.coeff * 0.5 + 0.5;
        let (mut lp_z1, mut lp_z2, mut ap_z1) = (self.lp_z1, self.lp_z2, self.ap_z1);

        for ((&x, hp), lp) in input.iter().zip(hp_out.iter_mut()).zip(lp_out.iter_mut()) {
            // Low band
            let mut d = (x - lp_z1) * lp_coeff;
            let mut lp_y = lp_z1 + d;
            lp_z1 = lp_y + d;

            d = (lp_y - lp_z2) * lp_coeff;
            lp_y = lp_z2 + d;
            lp_z2 = lp_y + d;

            *lp = lp_y;

            // All-pass, minus the low band
            let ap_y = x * ap_coeff + ap_z1;
            ap_z1 = x - ap_y * ap_coeff;

            *hp = ap_y - lp_y;
        }

        self.lp_z1 = lp_z1;
        self.lp_z2 = lp_z2;
        self.ap_z1 = ap_z1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_dc_goes_to_low_band() {
        let mut splitter = BandSplitter::new(400.0 / 48_000.0);
        let input = vec![1.0_f32; 4096];
        let mut hp = vec![0.0; input.len()];
        let mut lp = vec![0.0; input.len()];
        splitter.process(&input, &mut hp, &mut lp);

        assert_abs_diff_eq!(lp[4095], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hp[4095], 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_state_persists_across_calls() {
        let input: Vec<f32> = (0..256).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();

        let mut whole = BandSplitter::new(0.01);
        let mut hp_a = vec![0.0; 256];
        let mut lp_a = vec![0.0; 256];
        whole.process(&input, &mut hp_a, &mut lp_a);

        let mut chunked = BandSplitter::new(0.01);
        let mut hp_b = vec![0.0; 256];
        let mut lp_b = vec![0.0; 256];
        let (hp_lo, hp_hi) = hp_b.split_at_mut(100);
        let (lp_lo, lp_hi) = lp_b.split_at_mut(100);
        chunked.process(&input[..100], hp_lo, lp_lo);
        chunked.process(&input[100..], hp_hi, lp_hi);

        for i in 0..256 {
            assert_abs_diff_eq!(hp_a[i], hp_b[i], epsilon = 1e-6);
            assert_abs_diff_eq!(lp_a[i], lp_b[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_bands_sum_to_allpass() {
        let mut splitter = BandSplitter::new(0.05);
        let mut impulse = vec![0.0_f32; 2048];
        impulse[0] = 1.0;
        let mut hp = vec![0.0; impulse.len()];
        let mut lp = vec![0.0; impulse.len()];
        splitter.process(&impulse, &mut hp, &mut lp);

        // An all-pass keeps the impulse energy
        let energy: f32 = hp.iter().zip(&lp).map(|(h, l)| (h + l) * (h + l)).sum();
        assert_abs_diff_eq!(energy, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_clear() {
        let mut splitter = BandSplitter::new(0.1);
        let mut hp = [0.0; 4];
        let mut lp = [0.0; 4];
        splitter.process(&[1.0, 0.5, -0.5, 1.0], &mut hp, &mut lp);
        splitter.clear();
        assert_eq!(splitter, BandSplitter::new(0.1));
    }
}
