use super::catalog::{EFFICIENT_FRONTIER, PORTFOLIO_DEFINITIONS};
use super::types::{FrontierPoint, MarketReaction, PortfolioType, RiskPhilosophy, RiskProfile};

const MAX_RISK_SCORE: u8 = 10;

pub fn risk_score(
    reaction: MarketReaction,
    philosophy: RiskPhilosophy,
    age: u32,
    time_horizon: u32,
) -> u8 {
    let mut score: i32 = match reaction {
        MarketReaction::Buy => 4,
        MarketReaction::Hold => 2,
        MarketReaction::SellSome => 1,
        MarketReaction::SellAll => 0,
    };
    score += match philosophy {
        RiskPhilosophy::High => 4,
        RiskPhilosophy::Medium => 2,
        RiskPhilosophy::Low => 1,
    };

    if age < 35 || time_horizon > 20 {
        score += 2;
    }
    if age > 55 || time_horizon < 10 {
        score -= 1;
    }

    score.clamp(0, MAX_RISK_SCORE as i32) as u8
}

// Scores outside every catalog interval resolve to Moderate. Unreachable for
// clamped scores, but defined behavior rather than an error.
pub fn resolve_portfolio_type(score: u8) -> PortfolioType {
    PORTFOLIO_DEFINITIONS
        .iter()
        .find(|definition| definition.contains_score(score))
        .map(|definition| definition.portfolio_type)
        .unwrap_or(PortfolioType::Moderate)
}

// Eleven scores round onto seven frontier points; the coarse discretization
// is intentional.
pub fn frontier_point_for(score: u8) -> FrontierPoint {
    let last = EFFICIENT_FRONTIER.len() - 1;
    let index = ((score as f64 / MAX_RISK_SCORE as f64) * last as f64).round() as usize;
    EFFICIENT_FRONTIER[index.min(last)]
}

pub fn derive_risk_profile(
    reaction: MarketReaction,
    philosophy: RiskPhilosophy,
    age: u32,
    time_horizon: u32,
) -> RiskProfile {
    let score = risk_score(reaction, philosophy, age, time_horizon);
    let point = frontier_point_for(score);
    RiskProfile {
        risk_score: score,
        portfolio_type: resolve_portfolio_type(score),
        expected_return: point.returns,
        volatility: point.volatility,
    }
}
