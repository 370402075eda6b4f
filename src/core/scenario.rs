use super::types::ReplayPoint;

// Benchmark volatility of the moderate profile; replays scale deviations
// from the base-100 index against it.
pub const MODERATE_VOLATILITY_BENCHMARK: f64 = 15.0;

pub fn replay_event(base_series: &[f64], volatility: f64) -> Vec<ReplayPoint> {
    let risk_multiplier = volatility / MODERATE_VOLATILITY_BENCHMARK;
    base_series
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let deviation = (point - 100.0) * risk_multiplier;
            ReplayPoint {
                period: format!("Period {index}"),
                portfolio: 100.0 + deviation,
                market: *point,
            }
        })
        .collect()
}
