use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MarketReaction {
    SellAll,
    SellSome,
    Hold,
    Buy,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RiskPhilosophy {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PortfolioType {
    Conservative,
    Moderate,
    Aggressive,
}

impl PortfolioType {
    pub fn label(self) -> &'static str {
        match self {
            PortfolioType::Conservative => "Conservative",
            PortfolioType::Moderate => "Moderate",
            PortfolioType::Aggressive => "Aggressive",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FinancialGoal {
    Retirement,
    WealthGrowth,
    HomePurchase,
    Education,
    CapitalPreservation,
}

impl FinancialGoal {
    pub fn label(self) -> &'static str {
        match self {
            FinancialGoal::Retirement => "Retirement",
            FinancialGoal::WealthGrowth => "Wealth Growth",
            FinancialGoal::HomePurchase => "Home Purchase",
            FinancialGoal::Education => "Education",
            FinancialGoal::CapitalPreservation => "Capital Preservation",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FamilySituation {
    Single,
    MarriedNoChildren,
    MarriedWithChildren,
    SingleParent,
}

impl FamilySituation {
    pub fn label(self) -> &'static str {
        match self {
            FamilySituation::Single => "Single",
            FamilySituation::MarriedNoChildren => "Married, no children",
            FamilySituation::MarriedWithChildren => "Married, with children",
            FamilySituation::SingleParent => "Single Parent",
        }
    }

    // Anyone sharing a household counts, a spouse included.
    pub fn has_family(self) -> bool {
        !matches!(self, FamilySituation::Single)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AssetPreference {
    Stocks,
    Bonds,
    AlternativeInvestments,
    EthicalSustainable,
}

impl AssetPreference {
    pub fn label(self) -> &'static str {
        match self {
            AssetPreference::Stocks => "Stocks",
            AssetPreference::Bonds => "Bonds",
            AssetPreference::AlternativeInvestments => "Alternative Investments",
            AssetPreference::EthicalSustainable => "Ethical/Sustainable (ESG)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub age: u32,
    pub income: f64,
    pub financial_goal: FinancialGoal,
    pub family_situation: FamilySituation,
    pub time_horizon: u32,
    pub investment_preference: Vec<AssetPreference>,
    pub existing_investments: f64,
    pub debts: f64,
    pub emergency_savings: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub risk_score: u8,
    pub portfolio_type: PortfolioType,
    pub expected_return: f64,
    pub volatility: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreHoldings {
    pub bonds: u32,
    pub stable_dividends: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalHoldings {
    pub stocks: u32,
    pub alternative: u32,
    pub international: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAllocation {
    pub core: CoreHoldings,
    pub tactical: TacticalHoldings,
}

impl PortfolioAllocation {
    pub fn core_total(&self) -> u32 {
        self.core.bonds + self.core.stable_dividends
    }

    pub fn tactical_total(&self) -> u32 {
        self.tactical.stocks + self.tactical.alternative + self.tactical.international
    }

    pub fn total(&self) -> u32 {
        self.core_total() + self.tactical_total()
    }
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDefinition {
    pub portfolio_type: PortfolioType,
    pub allocation: PortfolioAllocation,
    pub risk_score_range: (u8, u8),
}

impl PortfolioDefinition {
    pub fn contains_score(&self, score: u8) -> bool {
        let (min, max) = self.risk_score_range;
        score >= min && score <= max
    }
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierPoint {
    pub volatility: f64,
    pub returns: f64,
    pub label: &'static str,
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    pub name: &'static str,
    pub series: &'static [f64],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: String,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionStats {
    pub current_value: f64,
    pub total_return: f64,
    pub total_return_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPoint {
    pub period: String,
    pub portfolio: f64,
    pub market: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlan {
    pub name: &'static str,
    pub reason: &'static str,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProductExample {
    #[serde(rename = "type")]
    pub product_type: &'static str,
    pub example: &'static str,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationTopic {
    pub title: &'static str,
    pub content: &'static str,
}
