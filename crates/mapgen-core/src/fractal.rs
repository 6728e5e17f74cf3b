//! Seeded Perlin fBm fields on the plot grid, quantised to `0..=255` the way
//! the landmass and coastline gates expect.

use noise::{NoiseFn, Perlin};

use crate::grid::Dims;

const GAIN: f64 = 0.5;
const LACUNARITY: f64 = 2.0;

/// Octave count and base frequency (cycles across the longer axis).
#[derive(Debug, Clone, Copy)]
pub struct FractalSpec {
    pub octaves: u32,
    pub cycles: f64,
}

impl FractalSpec {
    /// Continents: broad blobs.
    pub const LANDMASS: Self = Self { octaves: 4, cycles: 3.0 };
    /// Hills: busy detail used for jitter and bay gates.
    pub const HILL: Self = Self { octaves: 3, cycles: 10.0 };
}

/// Row-major heights in `0..=255`.
pub fn generate(dims: Dims, spec: FractalSpec, seed: u64, salt: u64) -> Vec<u32> {
    if dims.is_empty() {
        return Vec::new();
    }
    let perlin = Perlin::new(((seed ^ salt) & 0xFFFF_FFFF) as u32);
    let span = dims.width.max(dims.height) as f64;
    let freq = spec.cycles / span;
    let amp_sum: f64 = (0..spec.octaves.max(1)).map(|i| GAIN.powi(i as i32)).sum();

    let mut out = Vec::with_capacity(dims.len());
    for y in 0..dims.height {
        for x in 0..dims.width {
            // offset off the integer lattice, where Perlin is zero
            let px = (x as f64 + 0.37) * freq;
            let py = (y as f64 + 0.61) * freq;
            let mut val = 0.0;
            let mut amp = 1.0;
            let mut f = 1.0;
            for _ in 0..spec.octaves.max(1) {
                val += amp * perlin.get([px * f, py * f]);
                amp *= GAIN;
                f *= LACUNARITY;
            }
            let unit = ((val / amp_sum) * 0.5 + 0.5).clamp(0.0, 1.0);
            out.push((unit * 255.0).round() as u32);
        }
    }
    out
}

/// Height below which `percent` of plots fall.
pub fn percentile(heights: &[u32], percent: f64) -> u32 {
    if heights.is_empty() {
        return 0;
    }
    let mut sorted = heights.to_vec();
    sorted.sort_unstable();
    let rank = ((percent.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_fit_a_byte() {
        let h = generate(Dims::new(48, 24), FractalSpec::LANDMASS, 42, 1);
        assert_eq!(h.len(), 48 * 24);
        assert!(h.iter().all(|v| *v <= 255));
    }

    #[test]
    fn salts_decorrelate_fields() {
        let a = generate(Dims::new(32, 16), FractalSpec::HILL, 42, 1);
        let b = generate(Dims::new(32, 16), FractalSpec::HILL, 42, 2);
        assert_ne!(a, b, "different salts should give different fields");
    }

    #[test]
    fn percentile_splits_sorted_heights() {
        let h: Vec<u32> = (0..=100).collect();
        assert_eq!(percentile(&h, 64.0), 64);
        assert_eq!(percentile(&h, 0.0), 0);
        assert_eq!(percentile(&[], 50.0), 0);
    }
}
