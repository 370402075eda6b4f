use crate::core::{PortfolioAllocation, RiskProfile, UserProfile};

pub fn build_summary_prompt(
    profile: &UserProfile,
    risk: RiskProfile,
    allocation: PortfolioAllocation,
) -> String {
    let preferences = profile
        .investment_preference
        .iter()
        .map(|preference| preference.label())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::from(
        "Analyze the following user profile and generate a personalized, encouraging, \
         and easy-to-understand financial plan summary.\n\
         The user is looking for advice on investments and insurance.\n",
    );

    prompt.push_str("\n**User Profile:**\n");
    prompt.push_str(&format!("- Age: {}\n", profile.age));
    prompt.push_str(&format!("- Annual Income: {}\n", money(profile.income)));
    prompt.push_str(&format!(
        "- Main Financial Goal: {}\n",
        profile.financial_goal.label()
    ));
    prompt.push_str(&format!(
        "- Family Situation: {}\n",
        profile.family_situation.label()
    ));
    prompt.push_str(&format!(
        "- Investment Time Horizon: {} years\n",
        profile.time_horizon
    ));
    prompt.push_str(&format!("- Stated Investment Preferences: {preferences}\n"));
    prompt.push_str("- Current Financials:\n");
    prompt.push_str(&format!(
        "    - Existing Investments: {}\n",
        money(profile.existing_investments)
    ));
    prompt.push_str(&format!("    - Debts: {}\n", money(profile.debts)));
    prompt.push_str(&format!(
        "    - Emergency Savings: {}\n",
        money(profile.emergency_savings)
    ));

    prompt.push_str("\n**Quantitative Analysis Results:**\n");
    prompt.push_str(&format!(
        "- Risk Profile: {} (Score: {}/10)\n",
        risk.portfolio_type.label(),
        risk.risk_score
    ));
    prompt.push_str(&format!(
        "- Projected Annual Return: {}%\n",
        risk.expected_return
    ));
    prompt.push_str(&format!(
        "- Projected Volatility (Standard Deviation): {}%\n",
        risk.volatility
    ));

    prompt.push_str("\n**Recommended Investment Allocation:**\n");
    prompt.push_str(&format!(
        "- Core Investments: {}%\n",
        allocation.core_total()
    ));
    prompt.push_str(&format!("    - Bonds: {}%\n", allocation.core.bonds));
    prompt.push_str(&format!(
        "    - Stable Dividend Stocks: {}%\n",
        allocation.core.stable_dividends
    ));
    prompt.push_str(&format!(
        "- Tactical Investments: {}%\n",
        allocation.tactical_total()
    ));
    prompt.push_str(&format!(
        "    - Domestic Stocks: {}%\n",
        allocation.tactical.stocks
    ));
    prompt.push_str(&format!(
        "    - Alternative Investments: {}%\n",
        allocation.tactical.alternative
    ));
    prompt.push_str(&format!(
        "    - International Stocks: {}%\n",
        allocation.tactical.international
    ));

    prompt.push_str("\n**Task:**\n");
    prompt.push_str(
        "Based on all the information above, write a summary in markdown format. \
         Structure it with the following sections:\n",
    );
    prompt.push_str(
        "1.  **Introduction:** A brief, positive opening statement about their financial journey.\n",
    );
    prompt.push_str(&format!(
        "2.  **Your Investment Strategy:** Explain *why* the recommended portfolio ({}) is a \
         good fit for their profile and goals. Briefly explain the role of Core and Tactical \
         investments.\n",
        risk.portfolio_type.label()
    ));
    prompt.push_str(
        "3.  **Key Investment Product Types:** Suggest examples of products for their \
         allocation (e.g., for Stocks, mention ETFs like VOO; for Bonds, mention government \
         or corporate bond funds).\n",
    );
    prompt.push_str(
        "4.  **Personalized Insurance Recommendations:** Based on their family situation and \
         age, suggest a type of insurance and a brief reason. For example, if they have \
         children, recommend life insurance like \"PRUfamily Guard\". If they are single and \
         focused on wealth, recommend a health/investment-linked plan like \"UOB Healthy \
         Wealth\".\n",
    );
    prompt.push_str("5.  **Next Steps:** Provide 2-3 actionable, simple next steps.\n");

    prompt.push_str(
        "\nKeep the tone professional, but accessible and encouraging. Avoid making absolute \
         guarantees about returns.\n",
    );

    prompt
}

// Whole-dollar amounts with thousands separators, "$1,234,567".
fn money(amount: f64) -> String {
    format!("${}", group_thousands(amount.round() as i64))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}
