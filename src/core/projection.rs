use std::time::{SystemTime, UNIX_EPOCH};

use super::types::{ProjectionPoint, ProjectionStats};

pub const PROJECTION_START_VALUE: f64 = 100_000.0;

pub trait NoiseSource {
    fn next_f64(&mut self) -> f64;
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

pub struct XorShiftNoise {
    state: u64,
}

impl XorShiftNoise {
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(splitmix64(nanos))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

impl NoiseSource for XorShiftNoise {
    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }
}

// Bounded uniform noise, not Gaussian: each period's shock lies within
// +/- volatility/200 of zero.
pub fn project_growth(
    volatility: f64,
    expected_return: f64,
    periods: u32,
    noise: &mut dyn NoiseSource,
) -> Vec<ProjectionPoint> {
    let mut value = PROJECTION_START_VALUE;
    let mut series = Vec::with_capacity(periods as usize + 1);
    series.push(ProjectionPoint {
        year: "Start".to_string(),
        value,
    });

    let growth_factor = expected_return / 100.0;
    for period in 1..=periods {
        let random_factor = (noise.next_f64() - 0.5) * volatility / 100.0;
        value *= 1.0 + growth_factor + random_factor;
        series.push(ProjectionPoint {
            year: format!("Year {period}"),
            value: value.round(),
        });
    }

    series
}

pub fn projection_stats(series: &[ProjectionPoint]) -> ProjectionStats {
    let initial_value = series
        .first()
        .map(|point| point.value)
        .unwrap_or(PROJECTION_START_VALUE);
    let current_value = series
        .last()
        .map(|point| point.value)
        .unwrap_or(PROJECTION_START_VALUE);
    let total_return = current_value - initial_value;
    ProjectionStats {
        current_value,
        total_return,
        total_return_percent: (total_return / initial_value) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    struct FixedNoise(f64);

    impl NoiseSource for FixedNoise {
        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn zero_volatility_compounds_the_expected_return_exactly() {
        let mut noise = XorShiftNoise::new(42);
        let series = project_growth(0.0, 10.0, 3, &mut noise);

        assert_eq!(series.len(), 4);
        assert_eq!(series[0].year, "Start");
        assert_eq!(series[1].year, "Year 1");
        assert_eq!(series[3].year, "Year 3");
        assert_approx(series[0].value, 100_000.0);
        assert_approx(series[1].value, 110_000.0);
        assert_approx(series[2].value, 121_000.0);
        assert_approx(series[3].value, 133_100.0);
    }

    #[test]
    fn series_length_is_periods_plus_one() {
        let mut noise = XorShiftNoise::new(7);
        assert_eq!(project_growth(12.0, 9.0, 10, &mut noise).len(), 11);
        let mut noise = XorShiftNoise::new(7);
        assert_eq!(project_growth(12.0, 9.0, 0, &mut noise).len(), 1);
    }

    #[test]
    fn midpoint_noise_sample_adds_no_shock() {
        let mut noise = FixedNoise(0.5);
        let series = project_growth(20.0, 10.0, 2, &mut noise);
        assert_approx(series[1].value, 110_000.0);
        assert_approx(series[2].value, 121_000.0);
    }

    #[test]
    fn above_midpoint_noise_lifts_growth_by_the_scaled_deviation() {
        // (0.75 - 0.5) * 20 / 100 = +5% per period
        let mut noise = FixedNoise(0.75);
        let series = project_growth(20.0, 0.0, 2, &mut noise);
        assert_approx(series[1].value, 105_000.0);
        assert_approx(series[2].value, 110_250.0);
    }

    #[test]
    fn below_midpoint_noise_drags_growth_down() {
        // (0.25 - 0.5) * 20 / 100 = -5% per period
        let mut noise = FixedNoise(0.25);
        let series = project_growth(20.0, 0.0, 1, &mut noise);
        assert_approx(series[1].value, 95_000.0);
    }

    #[test]
    fn same_seed_reproduces_the_same_path() {
        let mut first = XorShiftNoise::new(1234);
        let mut second = XorShiftNoise::new(1234);
        let a = project_growth(18.0, 8.0, 12, &mut first);
        let b = project_growth(18.0, 8.0, 12, &mut second);
        assert_eq!(a, b);
    }

    #[test]
    fn entropy_seeded_projection_has_the_expected_shape() {
        let mut noise = XorShiftNoise::from_entropy();
        let series = project_growth(15.0, 11.0, 10, &mut noise);
        assert_eq!(series.len(), 11);
        assert_approx(series[0].value, 100_000.0);
        for point in &series {
            assert!(point.value.is_finite());
        }
    }

    #[test]
    fn stats_match_the_series_endpoints() {
        let mut noise = XorShiftNoise::new(42);
        let series = project_growth(0.0, 10.0, 3, &mut noise);
        let stats = projection_stats(&series);
        assert_approx(stats.current_value, 133_100.0);
        assert_approx(stats.total_return, 33_100.0);
        assert_approx(stats.total_return_percent, 33.1);
    }

    #[test]
    fn stats_on_an_empty_series_fall_back_to_the_start_value() {
        let stats = projection_stats(&[]);
        assert_approx(stats.current_value, 100_000.0);
        assert_approx(stats.total_return, 0.0);
        assert_approx(stats.total_return_percent, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]
        #[test]
        fn noise_samples_stay_in_the_unit_interval(seed in 1u64.., steps in 1usize..200) {
            let mut noise = XorShiftNoise::new(seed);
            for _ in 0..steps {
                let sample = noise.next_f64();
                prop_assert!((0.0..1.0).contains(&sample));
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]
        #[test]
        fn projected_values_are_rounded_and_labeled(
            seed in 1u64..,
            volatility in 0.0f64..40.0,
            expected_return in 0.0f64..15.0,
            periods in 1u32..30,
        ) {
            let mut noise = XorShiftNoise::new(seed);
            let series = project_growth(volatility, expected_return, periods, &mut noise);
            prop_assert!(series.len() == periods as usize + 1);
            prop_assert!(series[0].year == "Start");
            for (index, point) in series.iter().enumerate().skip(1) {
                prop_assert_eq!(&point.year, &format!("Year {index}"));
                prop_assert!(point.value.is_finite());
                prop_assert!(point.value.fract() == 0.0);
            }
        }
    }
}
