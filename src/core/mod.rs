mod catalog;
mod projection;
mod scenario;
mod scoring;
mod types;

pub use catalog::{
    EDUCATION_TOPICS, EFFICIENT_FRONTIER, HISTORICAL_EVENTS, INVESTMENT_EXAMPLES,
    PORTFOLIO_DEFINITIONS, allocation_for, default_event, event_by_name, insurance_recommendation,
};
pub use projection::{
    NoiseSource, PROJECTION_START_VALUE, XorShiftNoise, project_growth, projection_stats,
};
pub use scenario::{MODERATE_VOLATILITY_BENCHMARK, replay_event};
pub use scoring::{derive_risk_profile, frontier_point_for, resolve_portfolio_type, risk_score};
pub use types::{
    AssetPreference, CoreHoldings, EducationTopic, FamilySituation, FinancialGoal, FrontierPoint,
    HistoricalEvent, InsurancePlan, MarketReaction, PortfolioAllocation, PortfolioDefinition,
    PortfolioType, ProductExample, ProjectionPoint, ProjectionStats, ReplayPoint, RiskPhilosophy,
    RiskProfile, TacticalHoldings, UserProfile,
};
