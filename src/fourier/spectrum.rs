//! Spectral decomposition - DFT of a closed sample path into ranked
//! rotating vectors
//!
//! Coefficients are normalized by 1/N so each magnitude reads directly as
//! a circle radius. Bins carry signed frequencies in the usual FFT order
//! `[0, 1, ..., -2, -1]`; negative frequencies rotate clockwise.

use std::f64::consts::TAU;

use rand::Rng;
use rustfft::{num_complex::Complex64, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EpicycleError, Point};

/// One rotating vector: a circle in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralComponent {
    /// Circle radius, the coefficient magnitude.
    pub radius: f64,
    /// Initial angle in radians, in `(-pi, pi]`.
    pub phase: f64,
    /// Signed cycles per loop. Zero for hand-built chains.
    pub frequency: i64,
    /// Angular speed in radians per frame step.
    pub speed: f64,
}

impl SpectralComponent {
    /// Rotation angle at frame `t`.
    pub fn angle_at(&self, t: f64) -> f64 {
        self.phase + self.speed * t
    }

    /// Vector contribution at frame `t`.
    pub fn vector_at(&self, t: f64) -> Point {
        Complex64::from_polar(self.radius, self.angle_at(t))
    }
}

/// An ordered chain of rotating vectors.
///
/// Chains from [`decompose`] remember the sample count they were built
/// from; hand-built chains carry a sample count of zero and reconstruct
/// to an empty path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicycleChain {
    components: Vec<SpectralComponent>,
    sample_count: usize,
}

impl EpicycleChain {
    /// Chain from explicit components, no decomposition involved.
    pub fn from_components(components: Vec<SpectralComponent>) -> Self {
        Self {
            components,
            sample_count: 0,
        }
    }

    /// Random freehand chain in the classic doodle style: integer radii up
    /// to 10, fractional phases, speeds within a degree per frame.
    pub fn random<R: Rng>(count: usize, rng: &mut R) -> Self {
        let components = (0..count)
            .map(|_| SpectralComponent {
                radius: f64::from(rng.gen_range(1..=10)),
                phase: f64::from(rng.gen_range(1..=10)) / 10.0,
                frequency: 0,
                speed: TAU / 360.0 * f64::from(rng.gen_range(-10..=10)) / 10.0,
            })
            .collect();
        Self {
            components,
            sample_count: 0,
        }
    }

    pub fn components(&self) -> &[SpectralComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Sum of radii, the reach of the fully extended chain.
    pub fn total_radius(&self) -> f64 {
        self.components.iter().map(|c| c.radius).sum()
    }
}

/// Decompose a closed sample path into its `k` strongest rotating vectors.
///
/// Runs a forward DFT over the samples, converts every bin into a
/// [`SpectralComponent`] and keeps the `k` largest radii. The sort is
/// stable, so equal radii stay in bin order and the ranking is
/// deterministic.
pub fn decompose(samples: &[Point], k: usize) -> Result<EpicycleChain, EpicycleError> {
    let n = samples.len();
    if n == 0 {
        return Err(EpicycleError::InvalidInput("sample path is empty".into()));
    }
    if k > n {
        return Err(EpicycleError::InvalidInput(format!(
            "component count {k} exceeds the {n} available frequency bins"
        )));
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex64> = samples.to_vec();
    fft.process(&mut buffer);

    let mut components: Vec<SpectralComponent> = buffer
        .into_iter()
        .enumerate()
        .map(|(bin, coefficient)| {
            let (radius, phase) = (coefficient / n as f64).to_polar();
            let frequency = signed_frequency(bin, n);
            SpectralComponent {
                radius,
                phase,
                frequency,
                speed: TAU * frequency as f64 / n as f64,
            }
        })
        .collect();

    components.sort_by(|a, b| b.radius.total_cmp(&a.radius));
    components.truncate(k);
    debug!("decomposed {n} samples into {k} components");

    Ok(EpicycleChain {
        components,
        sample_count: n,
    })
}

/// Signed frequency for a DFT bin: bins up to `(n-1)/2` map to themselves,
/// the rest wrap negative.
fn signed_frequency(bin: usize, n: usize) -> i64 {
    if bin <= (n - 1) / 2 {
        bin as i64
    } else {
        bin as i64 - n as i64
    }
}

/// Partial-sum value of the chain at frame `t`.
pub fn reconstruct(chain: &EpicycleChain, t: f64) -> Point {
    chain.components().iter().map(|c| c.vector_at(t)).sum()
}

/// The chain evaluated at every original sample index.
///
/// With all bins kept this reproduces the decomposed path to floating
/// point accuracy; with fewer it is the truncated approximation.
pub fn reconstruct_path(chain: &EpicycleChain) -> Vec<Point> {
    (0..chain.sample_count())
        .map(|t| reconstruct(chain, t as f64))
        .collect()
}

/// Sum of squared distances between a sample path and the chain's
/// reconstruction at the same frame indices.
pub fn residual_energy(samples: &[Point], chain: &EpicycleChain) -> f64 {
    samples
        .iter()
        .enumerate()
        .map(|(t, &sample)| (sample - reconstruct(chain, t as f64)).norm_sqr())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::polygon::Polygon;
    use crate::fourier::resample::resample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_rotation() -> Vec<Point> {
        vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(0.0, -1.0),
        ]
    }

    fn noisy_path(seed: u64, m: usize) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        let poly = Polygon::random(10, 10, &mut rng).unwrap();
        resample(&poly, m).unwrap()
    }

    #[test]
    fn test_pure_rotation_spectrum() {
        let chain = decompose(&unit_rotation(), 4).unwrap();
        // All energy sits in the +1 bin.
        let top = chain.components()[0];
        assert_eq!(top.frequency, 1);
        assert!((top.radius - 1.0).abs() < 1e-12);
        assert!(top.phase.abs() < 1e-12);
        assert!((top.speed - TAU / 4.0).abs() < 1e-12);
        for c in &chain.components()[1..] {
            assert!(c.radius < 1e-12);
        }
    }

    #[test]
    fn test_pure_rotation_roundtrip() {
        let samples = unit_rotation();
        let chain = decompose(&samples, 4).unwrap();
        let rebuilt = reconstruct_path(&chain);
        for (a, b) in samples.iter().zip(rebuilt.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_full_roundtrip() {
        let samples = noisy_path(21, 64);
        let chain = decompose(&samples, 64).unwrap();
        let rebuilt = reconstruct_path(&chain);
        for (a, b) in samples.iter().zip(rebuilt.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_parseval() {
        let samples = noisy_path(8, 128);
        let chain = decompose(&samples, 128).unwrap();

        let spectral: f64 = chain.components().iter().map(|c| c.radius * c.radius).sum();
        let spatial: f64 =
            samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64;
        assert!((spectral - spatial).abs() < 1e-9);
    }

    #[test]
    fn test_residual_monotone_in_k() {
        let samples = noisy_path(99, 64);
        let mut previous = f64::INFINITY;
        for k in [1, 2, 4, 8, 16, 32, 64] {
            let chain = decompose(&samples, k).unwrap();
            let energy = residual_energy(&samples, &chain);
            assert!(energy <= previous + 1e-9, "residual grew at k={k}");
            previous = energy;
        }
        assert!(previous < 1e-9, "full reconstruction left residual");
    }

    #[test]
    fn test_ranking_descending_and_stable() {
        let chain = decompose(&unit_rotation(), 4).unwrap();
        let radii: Vec<f64> = chain.components().iter().map(|c| c.radius).collect();
        for pair in radii.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        // The three zero-radius bins tie; stability keeps their bin order.
        let frequencies: Vec<i64> = chain.components().iter().map(|c| c.frequency).collect();
        assert_eq!(frequencies, vec![1, 0, -2, -1]);
    }

    #[test]
    fn test_frequency_bin_convention() {
        assert_eq!(signed_frequency(0, 4), 0);
        assert_eq!(signed_frequency(1, 4), 1);
        assert_eq!(signed_frequency(2, 4), -2);
        assert_eq!(signed_frequency(3, 4), -1);

        assert_eq!(signed_frequency(2, 5), 2);
        assert_eq!(signed_frequency(3, 5), -2);
        assert_eq!(signed_frequency(4, 5), -1);
    }

    #[test]
    fn test_k_zero_gives_empty_chain() {
        let chain = decompose(&unit_rotation(), 0).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.sample_count(), 4);
        assert_eq!(reconstruct(&chain, 3.0), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_k_exceeds_bins() {
        let result = decompose(&unit_rotation(), 5);
        assert!(matches!(result, Err(EpicycleError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_samples() {
        let result = decompose(&[], 0);
        assert!(matches!(result, Err(EpicycleError::InvalidInput(_))));
    }

    #[test]
    fn test_random_chain_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        let chain = EpicycleChain::random(10, &mut rng);
        assert_eq!(chain.len(), 10);
        assert_eq!(chain.sample_count(), 0);
        for c in chain.components() {
            assert!(c.radius >= 1.0 && c.radius <= 10.0);
            assert!(c.speed.abs() <= TAU / 360.0 + 1e-12);
        }
    }
}
