//! Climate engine: baseline rainfall, earthlike refinement and story
//! microclimates. Every write is clamped to `0..=200`.

pub mod baseline;
pub mod microclimate;
pub mod refine;

pub use baseline::baseline;
pub use refine::refine;

pub const RAIN_MAX: f64 = 200.0;

#[inline]
pub fn clamp_rain(v: f64) -> f64 {
    v.clamp(0.0, RAIN_MAX)
}

/// Ten equal-width rainfall bins over the plots selected by `mask`.
pub fn histogram(rain: &[f64], mask: impl Fn(usize) -> bool) -> [usize; 10] {
    let mut bins = [0; 10];
    for (i, &r) in rain.iter().enumerate() {
        if mask(i) {
            let b = ((r / RAIN_MAX) * 10.0).floor().clamp(0.0, 9.0) as usize;
            bins[b] += 1;
        }
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_holds_both_ends() {
        assert_eq!(clamp_rain(-5.0), 0.0);
        assert_eq!(clamp_rain(250.0), 200.0);
        assert_eq!(clamp_rain(73.0), 73.0);
    }

    #[test]
    fn histogram_puts_the_top_value_in_the_last_bin() {
        let bins = histogram(&[0.0, 19.9, 20.0, 200.0, 150.0], |i| i != 4);
        assert_eq!(bins[0], 2);
        assert_eq!(bins[1], 1);
        assert_eq!(bins[9], 1);
        assert_eq!(bins.iter().sum::<usize>(), 4);
    }
}
