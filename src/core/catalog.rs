use super::types::{
    CoreHoldings, EducationTopic, FamilySituation, FrontierPoint, HistoricalEvent, InsurancePlan,
    PortfolioAllocation, PortfolioDefinition, PortfolioType, ProductExample, TacticalHoldings,
};

pub const EFFICIENT_FRONTIER: [FrontierPoint; 7] = [
    FrontierPoint {
        volatility: 5.0,
        returns: 4.0,
        label: "Low Risk",
    },
    FrontierPoint {
        volatility: 7.0,
        returns: 6.0,
        label: "Conservative",
    },
    FrontierPoint {
        volatility: 9.0,
        returns: 7.5,
        label: "Balanced",
    },
    FrontierPoint {
        volatility: 12.0,
        returns: 9.0,
        label: "Moderate",
    },
    FrontierPoint {
        volatility: 15.0,
        returns: 11.0,
        label: "Growth",
    },
    FrontierPoint {
        volatility: 18.0,
        returns: 12.0,
        label: "Aggressive",
    },
    FrontierPoint {
        volatility: 22.0,
        returns: 13.0,
        label: "High Risk",
    },
];

pub const PORTFOLIO_DEFINITIONS: [PortfolioDefinition; 3] = [
    PortfolioDefinition {
        portfolio_type: PortfolioType::Conservative,
        allocation: PortfolioAllocation {
            core: CoreHoldings {
                bonds: 60,
                stable_dividends: 20,
            },
            tactical: TacticalHoldings {
                stocks: 10,
                alternative: 5,
                international: 5,
            },
        },
        risk_score_range: (0, 3),
    },
    PortfolioDefinition {
        portfolio_type: PortfolioType::Moderate,
        allocation: PortfolioAllocation {
            core: CoreHoldings {
                bonds: 40,
                stable_dividends: 10,
            },
            tactical: TacticalHoldings {
                stocks: 30,
                alternative: 10,
                international: 10,
            },
        },
        risk_score_range: (4, 7),
    },
    PortfolioDefinition {
        portfolio_type: PortfolioType::Aggressive,
        allocation: PortfolioAllocation {
            core: CoreHoldings {
                bonds: 10,
                stable_dividends: 5,
            },
            tactical: TacticalHoldings {
                stocks: 50,
                alternative: 15,
                international: 20,
            },
        },
        risk_score_range: (8, 10),
    },
];

pub const HISTORICAL_EVENTS: [HistoricalEvent; 4] = [
    HistoricalEvent {
        name: "Normal Growth (2015-2019)",
        series: &[100.0, 105.0, 115.0, 120.0, 135.0, 145.0],
    },
    HistoricalEvent {
        name: "2008 Financial Crisis",
        series: &[100.0, 90.0, 75.0, 60.0, 80.0, 95.0],
    },
    HistoricalEvent {
        name: "2020 COVID-19 Crash",
        series: &[100.0, 110.0, 80.0, 105.0, 120.0, 140.0],
    },
    HistoricalEvent {
        name: "Tech Boom (Late 90s)",
        series: &[100.0, 120.0, 150.0, 190.0, 160.0, 130.0],
    },
];

pub const INVESTMENT_EXAMPLES: [ProductExample; 3] = [
    ProductExample {
        product_type: "ETFs",
        example: "Vanguard S&P 500 (VOO), Invesco QQQ",
    },
    ProductExample {
        product_type: "Bonds",
        example: "U.S. Treasury Bonds, Corporate Bond Funds",
    },
    ProductExample {
        product_type: "Equities",
        example: "Blue-chip stocks like Apple, Microsoft",
    },
];

pub const EDUCATION_TOPICS: [EducationTopic; 3] = [
    EducationTopic {
        title: "Modern Portfolio Theory (MPT)",
        content: "MPT, developed by Harry Markowitz, is a framework for assembling a portfolio \
                  of assets such that the expected return is maximized for a given level of risk. \
                  It emphasizes that risk and return are best viewed in a portfolio context rather \
                  than on a standalone asset basis.",
    },
    EducationTopic {
        title: "Diversification",
        content: "This is the practice of spreading your investments around so that your exposure \
                  to any one type of asset is limited. This practice is designed to help reduce \
                  the volatility of your portfolio over time. A well-diversified portfolio is \
                  less likely to be severely affected by a single negative event.",
    },
    EducationTopic {
        title: "The Efficient Frontier",
        content: "The efficient frontier represents the set of optimal portfolios that offer the \
                  highest expected return for a defined level of risk or the lowest risk for a \
                  given level of expected return. Portfolios that lie below the efficient frontier \
                  are sub-optimal.",
    },
];

const FAMILY_PROTECTION_PLAN: InsurancePlan = InsurancePlan {
    name: "PRUfamily Guard",
    reason: "To protect your family's income and future in case of unforeseen events.",
};

const HEALTH_WEALTH_PLAN: InsurancePlan = InsurancePlan {
    name: "UOB Healthy Wealth",
    reason: "A plan focused on health coverage linked to growing your wealth, ideal for your \
             financial goals.",
};

pub fn allocation_for(portfolio_type: PortfolioType) -> PortfolioAllocation {
    PORTFOLIO_DEFINITIONS
        .iter()
        .find(|definition| definition.portfolio_type == portfolio_type)
        .map(|definition| definition.allocation)
        .unwrap_or(PORTFOLIO_DEFINITIONS[1].allocation)
}

pub fn event_by_name(name: &str) -> Option<&'static HistoricalEvent> {
    HISTORICAL_EVENTS.iter().find(|event| event.name == name)
}

pub fn default_event() -> &'static HistoricalEvent {
    &HISTORICAL_EVENTS[0]
}

pub fn insurance_recommendation(family_situation: FamilySituation) -> InsurancePlan {
    if family_situation.has_family() {
        FAMILY_PROTECTION_PLAN
    } else {
        HEALTH_WEALTH_PLAN
    }
}
