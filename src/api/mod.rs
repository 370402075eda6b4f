use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::core::{
    AssetPreference, EDUCATION_TOPICS, EFFICIENT_FRONTIER, FamilySituation, FinancialGoal,
    FrontierPoint, HISTORICAL_EVENTS, HistoricalEvent, INVESTMENT_EXAMPLES, InsurancePlan,
    MODERATE_VOLATILITY_BENCHMARK, MarketReaction, PORTFOLIO_DEFINITIONS, PortfolioAllocation,
    ProductExample, ProjectionPoint, ProjectionStats, ReplayPoint, RiskPhilosophy, RiskProfile,
    UserProfile, XorShiftNoise, allocation_for, default_event, derive_risk_profile, event_by_name,
    frontier_point_for, insurance_recommendation, project_growth, projection_stats, replay_event,
};
use crate::flow::{SummaryState, TOTAL_STEPS, WizardSession, WizardStep};
use crate::summary::SummaryService;

const REQUIRED_FIELDS_MESSAGE: &str = "Please fill out all required fields.";
const QUESTIONNAIRE_MESSAGE: &str = "Please complete the risk questionnaire first.";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMarketReaction {
    SellAll,
    SellSome,
    Hold,
    Buy,
}

impl From<CliMarketReaction> for MarketReaction {
    fn from(value: CliMarketReaction) -> Self {
        match value {
            CliMarketReaction::SellAll => MarketReaction::SellAll,
            CliMarketReaction::SellSome => MarketReaction::SellSome,
            CliMarketReaction::Hold => MarketReaction::Hold,
            CliMarketReaction::Buy => MarketReaction::Buy,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRiskPhilosophy {
    Low,
    Medium,
    High,
}

impl From<CliRiskPhilosophy> for RiskPhilosophy {
    fn from(value: CliRiskPhilosophy) -> Self {
        match value {
            CliRiskPhilosophy::Low => RiskPhilosophy::Low,
            CliRiskPhilosophy::Medium => RiskPhilosophy::Medium,
            CliRiskPhilosophy::High => RiskPhilosophy::High,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFinancialGoal {
    Retirement,
    WealthGrowth,
    HomePurchase,
    Education,
    CapitalPreservation,
}

impl From<CliFinancialGoal> for FinancialGoal {
    fn from(value: CliFinancialGoal) -> Self {
        match value {
            CliFinancialGoal::Retirement => FinancialGoal::Retirement,
            CliFinancialGoal::WealthGrowth => FinancialGoal::WealthGrowth,
            CliFinancialGoal::HomePurchase => FinancialGoal::HomePurchase,
            CliFinancialGoal::Education => FinancialGoal::Education,
            CliFinancialGoal::CapitalPreservation => FinancialGoal::CapitalPreservation,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFamilySituation {
    Single,
    MarriedNoChildren,
    MarriedWithChildren,
    SingleParent,
}

impl From<CliFamilySituation> for FamilySituation {
    fn from(value: CliFamilySituation) -> Self {
        match value {
            CliFamilySituation::Single => FamilySituation::Single,
            CliFamilySituation::MarriedNoChildren => FamilySituation::MarriedNoChildren,
            CliFamilySituation::MarriedWithChildren => FamilySituation::MarriedWithChildren,
            CliFamilySituation::SingleParent => FamilySituation::SingleParent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAssetPreference {
    Stocks,
    Bonds,
    AlternativeInvestments,
    EthicalSustainable,
}

impl From<CliAssetPreference> for AssetPreference {
    fn from(value: CliAssetPreference) -> Self {
        match value {
            CliAssetPreference::Stocks => AssetPreference::Stocks,
            CliAssetPreference::Bonds => AssetPreference::Bonds,
            CliAssetPreference::AlternativeInvestments => AssetPreference::AlternativeInvestments,
            CliAssetPreference::EthicalSustainable => AssetPreference::EthicalSustainable,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiMarketReaction {
    #[serde(alias = "sellAll", alias = "sell_all")]
    SellAll,
    #[serde(alias = "sellSome", alias = "sell_some")]
    SellSome,
    Hold,
    Buy,
}

impl From<ApiMarketReaction> for CliMarketReaction {
    fn from(value: ApiMarketReaction) -> Self {
        match value {
            ApiMarketReaction::SellAll => CliMarketReaction::SellAll,
            ApiMarketReaction::SellSome => CliMarketReaction::SellSome,
            ApiMarketReaction::Hold => CliMarketReaction::Hold,
            ApiMarketReaction::Buy => CliMarketReaction::Buy,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRiskPhilosophy {
    Low,
    Medium,
    High,
}

impl From<ApiRiskPhilosophy> for CliRiskPhilosophy {
    fn from(value: ApiRiskPhilosophy) -> Self {
        match value {
            ApiRiskPhilosophy::Low => CliRiskPhilosophy::Low,
            ApiRiskPhilosophy::Medium => CliRiskPhilosophy::Medium,
            ApiRiskPhilosophy::High => CliRiskPhilosophy::High,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFinancialGoal {
    #[serde(alias = "Retirement")]
    Retirement,
    #[serde(alias = "wealthGrowth", alias = "wealth_growth", alias = "Wealth Growth")]
    WealthGrowth,
    #[serde(alias = "homePurchase", alias = "home_purchase", alias = "Home Purchase")]
    HomePurchase,
    #[serde(alias = "Education")]
    Education,
    #[serde(
        alias = "capitalPreservation",
        alias = "capital_preservation",
        alias = "Capital Preservation"
    )]
    CapitalPreservation,
}

impl From<ApiFinancialGoal> for CliFinancialGoal {
    fn from(value: ApiFinancialGoal) -> Self {
        match value {
            ApiFinancialGoal::Retirement => CliFinancialGoal::Retirement,
            ApiFinancialGoal::WealthGrowth => CliFinancialGoal::WealthGrowth,
            ApiFinancialGoal::HomePurchase => CliFinancialGoal::HomePurchase,
            ApiFinancialGoal::Education => CliFinancialGoal::Education,
            ApiFinancialGoal::CapitalPreservation => CliFinancialGoal::CapitalPreservation,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFamilySituation {
    #[serde(alias = "Single")]
    Single,
    #[serde(
        alias = "marriedNoChildren",
        alias = "married_no_children",
        alias = "Married, no children"
    )]
    MarriedNoChildren,
    #[serde(
        alias = "marriedWithChildren",
        alias = "married_with_children",
        alias = "Married, with children"
    )]
    MarriedWithChildren,
    #[serde(alias = "singleParent", alias = "single_parent", alias = "Single Parent")]
    SingleParent,
}

impl From<ApiFamilySituation> for CliFamilySituation {
    fn from(value: ApiFamilySituation) -> Self {
        match value {
            ApiFamilySituation::Single => CliFamilySituation::Single,
            ApiFamilySituation::MarriedNoChildren => CliFamilySituation::MarriedNoChildren,
            ApiFamilySituation::MarriedWithChildren => CliFamilySituation::MarriedWithChildren,
            ApiFamilySituation::SingleParent => CliFamilySituation::SingleParent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAssetPreference {
    #[serde(alias = "Stocks")]
    Stocks,
    #[serde(alias = "Bonds")]
    Bonds,
    #[serde(
        alias = "alternativeInvestments",
        alias = "alternative_investments",
        alias = "Alternative Investments"
    )]
    AlternativeInvestments,
    #[serde(
        alias = "ethicalSustainable",
        alias = "ethical_sustainable",
        alias = "esg",
        alias = "Ethical/Sustainable (ESG)"
    )]
    EthicalSustainable,
}

impl From<ApiAssetPreference> for CliAssetPreference {
    fn from(value: ApiAssetPreference) -> Self {
        match value {
            ApiAssetPreference::Stocks => CliAssetPreference::Stocks,
            ApiAssetPreference::Bonds => CliAssetPreference::Bonds,
            ApiAssetPreference::AlternativeInvestments => {
                CliAssetPreference::AlternativeInvestments
            }
            ApiAssetPreference::EthicalSustainable => CliAssetPreference::EthicalSustainable,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStepAction {
    Next,
    Back,
    Restart,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AdvisePayload {
    age: Option<u32>,
    income: Option<f64>,
    financial_goal: Option<ApiFinancialGoal>,
    family_situation: Option<ApiFamilySituation>,
    time_horizon: Option<u32>,
    investment_preference: Option<Vec<ApiAssetPreference>>,
    existing_investments: Option<f64>,
    debts: Option<f64>,
    emergency_savings: Option<f64>,

    market_reaction: Option<ApiMarketReaction>,
    risk_philosophy: Option<ApiRiskPhilosophy>,

    periods: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    volatility: Option<f64>,
    expected_return: Option<f64>,
    periods: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenarioPayload {
    event: Option<String>,
    volatility: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfilePayload {
    age: Option<u32>,
    income: Option<f64>,
    financial_goal: Option<ApiFinancialGoal>,
    family_situation: Option<ApiFamilySituation>,
    time_horizon: Option<u32>,
    investment_preference: Option<Vec<ApiAssetPreference>>,
    existing_investments: Option<f64>,
    debts: Option<f64>,
    emergency_savings: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuestionnairePayload {
    market_reaction: Option<ApiMarketReaction>,
    risk_philosophy: Option<ApiRiskPhilosophy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepPayload {
    action: ApiStepAction,
}

#[derive(Parser, Debug)]
#[command(
    name = "quant-advisor",
    about = "Risk profiling and portfolio advisor (risk score + model portfolio + growth projection)"
)]
struct Cli {
    #[arg(long)]
    age: u32,
    #[arg(long, help = "Annual income in whole currency units")]
    income: f64,
    #[arg(long, value_enum)]
    financial_goal: CliFinancialGoal,
    #[arg(long, value_enum)]
    family_situation: CliFamilySituation,
    #[arg(long, default_value_t = 10, help = "Investment time horizon in years")]
    time_horizon: u32,
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        help = "Comma-separated asset preferences, e.g. stocks,bonds"
    )]
    investment_preference: Vec<CliAssetPreference>,
    #[arg(long, default_value_t = 0.0)]
    existing_investments: f64,
    #[arg(long, default_value_t = 0.0)]
    debts: f64,
    #[arg(long, default_value_t = 0.0)]
    emergency_savings: f64,
    #[arg(
        long,
        value_enum,
        help = "Questionnaire answer: reaction to a 20% market drop"
    )]
    market_reaction: CliMarketReaction,
    #[arg(long, value_enum, help = "Questionnaire answer: stated risk philosophy")]
    risk_philosophy: CliRiskPhilosophy,
    #[arg(
        long,
        help = "Projection length in periods; defaults to the time horizon"
    )]
    periods: Option<u32>,
    #[arg(long, help = "Fixed projection seed; defaults to fresh entropy")]
    seed: Option<u64>,
    #[arg(long, help = "Generate the AI narrative summary (requires API_KEY)")]
    summary: bool,
}

#[derive(Debug)]
struct AdviseRequest {
    profile: UserProfile,
    reaction: MarketReaction,
    philosophy: RiskPhilosophy,
    periods: u32,
    seed: Option<u64>,
}

#[derive(Debug)]
struct ProjectionRequest {
    volatility: f64,
    expected_return: f64,
    periods: u32,
    seed: Option<u64>,
}

#[derive(Debug)]
struct ScenarioRequest {
    event: &'static HistoricalEvent,
    volatility: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    age: u32,
    income: f64,
    financial_goal: &'static str,
    family_situation: &'static str,
    time_horizon: u32,
    investment_preference: Vec<&'static str>,
    existing_investments: f64,
    debts: f64,
    emergency_savings: f64,
}

impl From<&UserProfile> for ProfileResponse {
    fn from(profile: &UserProfile) -> Self {
        Self {
            age: profile.age,
            income: profile.income,
            financial_goal: profile.financial_goal.label(),
            family_situation: profile.family_situation.label(),
            time_horizon: profile.time_horizon,
            investment_preference: profile
                .investment_preference
                .iter()
                .map(|preference| preference.label())
                .collect(),
            existing_investments: profile.existing_investments,
            debts: profile.debts,
            emergency_savings: profile.emergency_savings,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResponse {
    event: &'static str,
    points: Vec<ReplayPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    points: Vec<ProjectionPoint>,
    stats: ProjectionStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdviseResponse {
    profile: ProfileResponse,
    risk_profile: RiskProfile,
    allocation: PortfolioAllocation,
    frontier_point: FrontierPoint,
    projection: Vec<ProjectionPoint>,
    projection_stats: ProjectionStats,
    scenarios: Vec<ScenarioResponse>,
    insurance: InsurancePlan,
    investment_examples: Vec<ProductExample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum SummaryStatus {
    Idle,
    Pending,
    Ready,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    step: u8,
    step_name: &'static str,
    total_steps: u8,
    profile: Option<ProfileResponse>,
    risk_profile: Option<RiskProfile>,
    allocation: Option<PortfolioAllocation>,
    summary_status: SummaryStatus,
    summary: Option<String>,
    rebalanced: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_profile(cli: Cli) -> Result<UserProfile, String> {
    if cli.age == 0 {
        return Err("--age must be > 0".to_string());
    }

    if !cli.income.is_finite() || cli.income < 0.0 {
        return Err("--income must be >= 0".to_string());
    }

    if !(1..=50).contains(&cli.time_horizon) {
        return Err("--time-horizon must be between 1 and 50".to_string());
    }

    for (name, amount) in [
        ("--existing-investments", cli.existing_investments),
        ("--debts", cli.debts),
        ("--emergency-savings", cli.emergency_savings),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    let mut preferences: Vec<AssetPreference> = Vec::new();
    for preference in cli.investment_preference {
        let preference = AssetPreference::from(preference);
        if !preferences.contains(&preference) {
            preferences.push(preference);
        }
    }

    Ok(UserProfile {
        age: cli.age,
        income: cli.income,
        financial_goal: cli.financial_goal.into(),
        family_situation: cli.family_situation.into(),
        time_horizon: cli.time_horizon,
        investment_preference: preferences,
        existing_investments: cli.existing_investments,
        debts: cli.debts,
        emergency_savings: cli.emergency_savings,
    })
}

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<WizardSession>>,
    summaries: SummaryService,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let state = AppState {
        session: Arc::new(Mutex::new(WizardSession::new())),
        summaries: SummaryService::from_env(),
    };
    if !state.summaries.has_api_key() {
        tracing::warn!("API_KEY is not set; narrative summaries will return the fallback notice");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/advise", post(advise_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/scenario",
            get(scenario_get_handler).post(scenario_post_handler),
        )
        .route("/api/frontier", get(frontier_handler))
        .route("/api/portfolios", get(portfolios_handler))
        .route("/api/events", get(events_handler))
        .route("/api/education", get(education_handler))
        .route("/api/session", get(session_handler))
        .route("/api/session/profile", post(session_profile_handler))
        .route(
            "/api/session/questionnaire",
            post(session_questionnaire_handler),
        )
        .route("/api/session/step", post(session_step_handler))
        .route("/api/session/rebalance", post(session_rebalance_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("advisor HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

pub async fn run_one_shot(args: Vec<String>) -> Result<(), String> {
    let cli = Cli::parse_from(args);
    let want_summary = cli.summary;
    let request = advise_request_from_cli(cli)?;
    let mut response = run_advise(&request);

    if want_summary {
        let service = SummaryService::from_env();
        let allocation = allocation_for(response.risk_profile.portfolio_type);
        response.summary = Some(
            service
                .generate(&request.profile, response.risk_profile, allocation)
                .await,
        );
    }

    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| format!("failed to serialize the advice response: {e}"))?;
    println!("{json}");
    Ok(())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn advise_handler(Json(payload): Json<AdvisePayload>) -> Response {
    let request = match advise_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, run_advise(&request))
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload).await
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload).await
}

async fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match projection_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, run_projection(&request))
}

async fn scenario_get_handler(Query(payload): Query<ScenarioPayload>) -> Response {
    scenario_handler_impl(payload).await
}

async fn scenario_post_handler(Json(payload): Json<ScenarioPayload>) -> Response {
    scenario_handler_impl(payload).await
}

async fn scenario_handler_impl(payload: ScenarioPayload) -> Response {
    let request = match scenario_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, run_scenario(&request))
}

async fn frontier_handler() -> Response {
    json_response(StatusCode::OK, EFFICIENT_FRONTIER)
}

async fn portfolios_handler() -> Response {
    json_response(StatusCode::OK, PORTFOLIO_DEFINITIONS)
}

async fn events_handler() -> Response {
    json_response(StatusCode::OK, HISTORICAL_EVENTS)
}

async fn education_handler() -> Response {
    json_response(StatusCode::OK, EDUCATION_TOPICS)
}

async fn session_handler(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    json_response(StatusCode::OK, session_response(&session))
}

async fn session_profile_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProfilePayload>,
) -> Response {
    let profile = match profile_from_payload(payload) {
        Ok(profile) => profile,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let mut session = state.session.lock().await;
    if let Err(err) = session.submit_profile(profile) {
        return error_response(StatusCode::CONFLICT, &err.to_string());
    }
    json_response(StatusCode::OK, session_response(&session))
}

async fn session_questionnaire_handler(
    State(state): State<AppState>,
    Json(payload): Json<QuestionnairePayload>,
) -> Response {
    let (reaction, philosophy) = match answers_from_payload(payload) {
        Ok(answers) => answers,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let mut session = state.session.lock().await;
    match session.submit_questionnaire(reaction, philosophy) {
        Ok(risk_profile) => {
            tracing::info!(
                score = risk_profile.risk_score,
                portfolio = risk_profile.portfolio_type.label(),
                "risk profile computed"
            );
        }
        Err(err) => return error_response(StatusCode::CONFLICT, &err.to_string()),
    }
    start_summary_fetch(&state, &mut session);
    json_response(StatusCode::OK, session_response(&session))
}

async fn session_step_handler(
    State(state): State<AppState>,
    Json(payload): Json<StepPayload>,
) -> Response {
    let mut session = state.session.lock().await;
    let result = match payload.action {
        ApiStepAction::Next => session.advance().map(|_| ()),
        ApiStepAction::Back => session.back().map(|_| ()),
        ApiStepAction::Restart => {
            session.restart();
            Ok(())
        }
    };
    if let Err(err) = result {
        return error_response(StatusCode::CONFLICT, &err.to_string());
    }

    // Every visit to the recommendations step refreshes the narrative.
    if session.step() == WizardStep::Recommendations {
        start_summary_fetch(&state, &mut session);
    }
    json_response(StatusCode::OK, session_response(&session))
}

async fn session_rebalance_handler(State(state): State<AppState>) -> Response {
    let mut session = state.session.lock().await;
    if let Err(err) = session.rebalance() {
        return error_response(StatusCode::CONFLICT, &err.to_string());
    }
    json_response(StatusCode::OK, session_response(&session))
}

fn start_summary_fetch(state: &AppState, session: &mut WizardSession) {
    let Ok(token) = session.begin_summary() else {
        return;
    };
    let (Some(profile), Some(risk_profile)) = (session.profile().cloned(), session.risk_profile())
    else {
        return;
    };
    let allocation = allocation_for(risk_profile.portfolio_type);

    let state = state.clone();
    tokio::spawn(async move {
        let text = state
            .summaries
            .generate(&profile, risk_profile, allocation)
            .await;
        let mut session = state.session.lock().await;
        if !session.resolve_summary(token, text) {
            tracing::debug!(token, "discarded stale summary response");
        }
    });
}

fn session_response(session: &WizardSession) -> SessionResponse {
    let (summary_status, summary) = match session.summary() {
        SummaryState::Idle => (SummaryStatus::Idle, None),
        SummaryState::Pending { .. } => (SummaryStatus::Pending, None),
        SummaryState::Ready { text } => (SummaryStatus::Ready, Some(text.clone())),
    };

    SessionResponse {
        step: session.step().number(),
        step_name: session.step().label(),
        total_steps: TOTAL_STEPS,
        profile: session.profile().map(ProfileResponse::from),
        risk_profile: session.risk_profile(),
        allocation: session
            .risk_profile()
            .map(|risk| allocation_for(risk.portfolio_type)),
        summary_status,
        summary,
        rebalanced: session.rebalanced(),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn advise_request_from_json(json: &str) -> Result<AdviseRequest, String> {
    let payload = serde_json::from_str::<AdvisePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    advise_request_from_payload(payload)
}

fn advise_request_from_payload(payload: AdvisePayload) -> Result<AdviseRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.age {
        cli.age = v;
    }
    if let Some(v) = payload.income {
        cli.income = v;
    }
    if let Some(v) = payload.financial_goal {
        cli.financial_goal = v.into();
    }
    if let Some(v) = payload.family_situation {
        cli.family_situation = v.into();
    }
    if let Some(v) = payload.time_horizon {
        cli.time_horizon = v;
    }
    if let Some(v) = payload.investment_preference {
        cli.investment_preference = v.into_iter().map(CliAssetPreference::from).collect();
    }
    if let Some(v) = payload.existing_investments {
        cli.existing_investments = v;
    }
    if let Some(v) = payload.debts {
        cli.debts = v;
    }
    if let Some(v) = payload.emergency_savings {
        cli.emergency_savings = v;
    }

    if let Some(v) = payload.market_reaction {
        cli.market_reaction = v.into();
    }
    if let Some(v) = payload.risk_philosophy {
        cli.risk_philosophy = v.into();
    }

    if let Some(v) = payload.periods {
        cli.periods = Some(v);
    }
    if let Some(v) = payload.seed {
        cli.seed = Some(v);
    }

    advise_request_from_cli(cli)
}

fn advise_request_from_cli(cli: Cli) -> Result<AdviseRequest, String> {
    if let Some(periods) = cli.periods {
        if !(1..=100).contains(&periods) {
            return Err("--periods must be between 1 and 100".to_string());
        }
    }

    let reaction = MarketReaction::from(cli.market_reaction);
    let philosophy = RiskPhilosophy::from(cli.risk_philosophy);
    let periods_flag = cli.periods;
    let seed = cli.seed;

    let profile = build_profile(cli)?;
    let periods = periods_flag.unwrap_or(profile.time_horizon);

    Ok(AdviseRequest {
        profile,
        reaction,
        philosophy,
        periods,
        seed,
    })
}

fn profile_from_payload(payload: ProfilePayload) -> Result<UserProfile, String> {
    let (Some(age), Some(income), Some(financial_goal), Some(family_situation), Some(time_horizon)) = (
        payload.age,
        payload.income,
        payload.financial_goal,
        payload.family_situation,
        payload.time_horizon,
    ) else {
        return Err(REQUIRED_FIELDS_MESSAGE.to_string());
    };

    let mut cli = default_cli_for_api();
    cli.age = age;
    cli.income = income;
    cli.financial_goal = financial_goal.into();
    cli.family_situation = family_situation.into();
    cli.time_horizon = time_horizon;
    cli.investment_preference = payload
        .investment_preference
        .unwrap_or_default()
        .into_iter()
        .map(CliAssetPreference::from)
        .collect();
    cli.existing_investments = payload.existing_investments.unwrap_or(0.0);
    cli.debts = payload.debts.unwrap_or(0.0);
    cli.emergency_savings = payload.emergency_savings.unwrap_or(0.0);

    build_profile(cli)
}

fn answers_from_payload(
    payload: QuestionnairePayload,
) -> Result<(MarketReaction, RiskPhilosophy), String> {
    let (Some(reaction), Some(philosophy)) = (payload.market_reaction, payload.risk_philosophy)
    else {
        return Err(QUESTIONNAIRE_MESSAGE.to_string());
    };
    Ok((
        CliMarketReaction::from(reaction).into(),
        CliRiskPhilosophy::from(philosophy).into(),
    ))
}

fn projection_request_from_payload(
    payload: ProjectionPayload,
) -> Result<ProjectionRequest, String> {
    let volatility = payload.volatility.unwrap_or(9.0);
    let expected_return = payload.expected_return.unwrap_or(7.5);
    let periods = payload.periods.unwrap_or(10);

    if !volatility.is_finite() || !(0.0..=100.0).contains(&volatility) {
        return Err("--volatility must be between 0 and 100".to_string());
    }
    if !expected_return.is_finite() || !(-100.0..=100.0).contains(&expected_return) {
        return Err("--expected-return must be between -100 and 100".to_string());
    }
    if !(1..=100).contains(&periods) {
        return Err("--periods must be between 1 and 100".to_string());
    }

    Ok(ProjectionRequest {
        volatility,
        expected_return,
        periods,
        seed: payload.seed,
    })
}

fn scenario_request_from_payload(payload: ScenarioPayload) -> Result<ScenarioRequest, String> {
    let event = match payload.event.as_deref() {
        Some(name) => {
            event_by_name(name).ok_or_else(|| format!("unknown historical event: {name}"))?
        }
        None => default_event(),
    };

    let volatility = payload.volatility.unwrap_or(MODERATE_VOLATILITY_BENCHMARK);
    if !volatility.is_finite() || !(0.0..=100.0).contains(&volatility) {
        return Err("--volatility must be between 0 and 100".to_string());
    }

    Ok(ScenarioRequest { event, volatility })
}

fn default_cli_for_api() -> Cli {
    Cli {
        age: 35,
        income: 85_000.0,
        financial_goal: CliFinancialGoal::Retirement,
        family_situation: CliFamilySituation::Single,
        time_horizon: 10,
        investment_preference: vec![CliAssetPreference::Stocks, CliAssetPreference::Bonds],
        existing_investments: 25_000.0,
        debts: 10_000.0,
        emergency_savings: 15_000.0,
        market_reaction: CliMarketReaction::Hold,
        risk_philosophy: CliRiskPhilosophy::Medium,
        periods: None,
        seed: None,
        summary: false,
    }
}

fn run_advise(request: &AdviseRequest) -> AdviseResponse {
    let risk_profile = derive_risk_profile(
        request.reaction,
        request.philosophy,
        request.profile.age,
        request.profile.time_horizon,
    );
    let allocation = allocation_for(risk_profile.portfolio_type);
    let frontier_point = frontier_point_for(risk_profile.risk_score);

    let mut noise = match request.seed {
        Some(seed) => XorShiftNoise::new(seed),
        None => XorShiftNoise::from_entropy(),
    };
    let projection = project_growth(
        risk_profile.volatility,
        risk_profile.expected_return,
        request.periods,
        &mut noise,
    );
    let stats = projection_stats(&projection);

    let scenarios = HISTORICAL_EVENTS
        .iter()
        .map(|event| ScenarioResponse {
            event: event.name,
            points: replay_event(event.series, risk_profile.volatility),
        })
        .collect();

    AdviseResponse {
        profile: ProfileResponse::from(&request.profile),
        risk_profile,
        allocation,
        frontier_point,
        projection,
        projection_stats: stats,
        scenarios,
        insurance: insurance_recommendation(request.profile.family_situation),
        investment_examples: INVESTMENT_EXAMPLES.to_vec(),
        summary: None,
    }
}

fn run_projection(request: &ProjectionRequest) -> ProjectionResponse {
    let mut noise = match request.seed {
        Some(seed) => XorShiftNoise::new(seed),
        None => XorShiftNoise::from_entropy(),
    };
    let points = project_growth(
        request.volatility,
        request.expected_return,
        request.periods,
        &mut noise,
    );
    let stats = projection_stats(&points);
    ProjectionResponse { points, stats }
}

fn run_scenario(request: &ScenarioRequest) -> ScenarioResponse {
    ScenarioResponse {
        event: request.event.name,
        points: replay_event(request.event.series, request.volatility),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PortfolioType;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn advise_request_defaults_apply_on_empty_payload() {
        let request = advise_request_from_json("{}").expect("defaults parse");

        assert_eq!(request.profile.age, 35);
        assert_approx(request.profile.income, 85_000.0);
        assert_eq!(request.profile.financial_goal, FinancialGoal::Retirement);
        assert_eq!(request.profile.family_situation, FamilySituation::Single);
        assert_eq!(request.profile.time_horizon, 10);
        assert_eq!(
            request.profile.investment_preference,
            vec![AssetPreference::Stocks, AssetPreference::Bonds]
        );
        assert_eq!(request.reaction, MarketReaction::Hold);
        assert_eq!(request.philosophy, RiskPhilosophy::Medium);
        assert_eq!(request.periods, 10);
        assert_eq!(request.seed, None);
    }

    #[test]
    fn advise_request_parses_camel_case_payload() {
        let json = r#"{
          "age": 29,
          "income": 120000,
          "financialGoal": "wealth-growth",
          "familySituation": "married-with-children",
          "timeHorizon": 25,
          "investmentPreference": ["stocks", "ethical-sustainable"],
          "existingInvestments": 40000,
          "debts": 0,
          "emergencySavings": 20000,
          "marketReaction": "buy",
          "riskPhilosophy": "high",
          "periods": 30,
          "seed": 7
        }"#;
        let request = advise_request_from_json(json).expect("json should parse");

        assert_eq!(request.profile.age, 29);
        assert_approx(request.profile.income, 120_000.0);
        assert_eq!(request.profile.financial_goal, FinancialGoal::WealthGrowth);
        assert_eq!(
            request.profile.family_situation,
            FamilySituation::MarriedWithChildren
        );
        assert_eq!(request.profile.time_horizon, 25);
        assert_eq!(
            request.profile.investment_preference,
            vec![AssetPreference::Stocks, AssetPreference::EthicalSustainable]
        );
        assert_approx(request.profile.existing_investments, 40_000.0);
        assert_eq!(request.reaction, MarketReaction::Buy);
        assert_eq!(request.philosophy, RiskPhilosophy::High);
        assert_eq!(request.periods, 30);
        assert_eq!(request.seed, Some(7));
    }

    #[test]
    fn advise_request_accepts_legacy_label_values() {
        let json = r#"{
          "financialGoal": "Wealth Growth",
          "familySituation": "Married, no children",
          "investmentPreference": ["Ethical/Sustainable (ESG)", "Alternative Investments"],
          "marketReaction": "sell_all",
          "riskPhilosophy": "low"
        }"#;
        let request = advise_request_from_json(json).expect("json should parse");

        assert_eq!(request.profile.financial_goal, FinancialGoal::WealthGrowth);
        assert_eq!(
            request.profile.family_situation,
            FamilySituation::MarriedNoChildren
        );
        assert_eq!(
            request.profile.investment_preference,
            vec![
                AssetPreference::EthicalSustainable,
                AssetPreference::AlternativeInvestments
            ]
        );
        assert_eq!(request.reaction, MarketReaction::SellAll);
        assert_eq!(request.philosophy, RiskPhilosophy::Low);
    }

    #[test]
    fn build_profile_rejects_zero_age() {
        let mut cli = sample_cli();
        cli.age = 0;
        let err = build_profile(cli).expect_err("must reject zero age");
        assert!(err.contains("--age"));
    }

    #[test]
    fn build_profile_rejects_out_of_range_horizon() {
        let mut cli = sample_cli();
        cli.time_horizon = 51;
        let err = build_profile(cli).expect_err("must reject a 51-year horizon");
        assert!(err.contains("--time-horizon"));

        let mut cli = sample_cli();
        cli.time_horizon = 0;
        let err = build_profile(cli).expect_err("must reject a zero horizon");
        assert!(err.contains("--time-horizon"));
    }

    #[test]
    fn build_profile_rejects_negative_money() {
        let mut cli = sample_cli();
        cli.debts = -1.0;
        let err = build_profile(cli).expect_err("must reject negative debts");
        assert!(err.contains("--debts"));
    }

    #[test]
    fn build_profile_dedupes_preferences() {
        let mut cli = sample_cli();
        cli.investment_preference = vec![
            CliAssetPreference::Stocks,
            CliAssetPreference::Stocks,
            CliAssetPreference::Bonds,
        ];
        let profile = build_profile(cli).expect("valid profile");
        assert_eq!(
            profile.investment_preference,
            vec![AssetPreference::Stocks, AssetPreference::Bonds]
        );
    }

    #[test]
    fn advise_request_rejects_out_of_range_periods() {
        let err =
            advise_request_from_json(r#"{"periods": 0}"#).expect_err("must reject zero periods");
        assert!(err.contains("--periods"));

        let err = advise_request_from_json(r#"{"periods": 101}"#)
            .expect_err("must reject an oversized projection");
        assert!(err.contains("--periods"));
    }

    #[test]
    fn profile_payload_requires_the_core_fields() {
        let payload = serde_json::from_str::<ProfilePayload>("{}").expect("payload parses");
        let err = profile_from_payload(payload).expect_err("must require the profile fields");
        assert_eq!(err, REQUIRED_FIELDS_MESSAGE);
    }

    #[test]
    fn profile_payload_defaults_optional_money_to_zero() {
        let payload = serde_json::from_str::<ProfilePayload>(
            r#"{
              "age": 40,
              "income": 60000,
              "financialGoal": "education",
              "familySituation": "single-parent",
              "timeHorizon": 12
            }"#,
        )
        .expect("payload parses");
        let profile = profile_from_payload(payload).expect("profile builds");

        assert_approx(profile.existing_investments, 0.0);
        assert_approx(profile.debts, 0.0);
        assert_approx(profile.emergency_savings, 0.0);
        assert!(profile.investment_preference.is_empty());
    }

    #[test]
    fn questionnaire_payload_requires_both_answers() {
        let payload = serde_json::from_str::<QuestionnairePayload>(r#"{"marketReaction": "hold"}"#)
            .expect("payload parses");
        let err = answers_from_payload(payload).expect_err("must require both answers");
        assert_eq!(err, QUESTIONNAIRE_MESSAGE);

        let payload = serde_json::from_str::<QuestionnairePayload>(
            r#"{"marketReaction": "hold", "riskPhilosophy": "medium"}"#,
        )
        .expect("payload parses");
        let (reaction, philosophy) = answers_from_payload(payload).expect("both answers present");
        assert_eq!(reaction, MarketReaction::Hold);
        assert_eq!(philosophy, RiskPhilosophy::Medium);
    }

    #[test]
    fn advise_response_serializes_expected_fields() {
        let request = advise_request_from_json(r#"{"seed": 42}"#).expect("json should parse");
        let response = run_advise(&request);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"profile\""));
        assert!(json.contains("\"riskProfile\""));
        assert!(json.contains("\"portfolioType\":\"Moderate\""));
        assert!(json.contains("\"allocation\""));
        assert!(json.contains("\"frontierPoint\""));
        assert!(json.contains("\"projection\""));
        assert!(json.contains("\"projectionStats\""));
        assert!(json.contains("\"scenarios\""));
        assert!(json.contains("\"insurance\""));
        assert!(json.contains("\"investmentExamples\""));
        assert!(!json.contains("\"summary\""));
    }

    #[test]
    fn advise_pipeline_is_internally_consistent() {
        let json = r#"{
          "age": 30,
          "familySituation": "married-with-children",
          "timeHorizon": 25,
          "marketReaction": "buy",
          "riskPhilosophy": "high",
          "seed": 9
        }"#;
        let request = advise_request_from_json(json).expect("json should parse");
        let response = run_advise(&request);

        assert_eq!(response.risk_profile.risk_score, 10);
        assert_eq!(
            response.risk_profile.portfolio_type,
            PortfolioType::Aggressive
        );
        assert_approx(response.risk_profile.volatility, 22.0);
        assert_approx(response.risk_profile.expected_return, 13.0);
        assert_eq!(response.frontier_point.label, "High Risk");
        assert_eq!(response.allocation.total(), 100);
        assert_eq!(response.projection.len(), 26);
        assert_eq!(response.projection[0].year, "Start");
        assert_eq!(response.scenarios.len(), 4);
        assert!(
            response
                .scenarios
                .iter()
                .all(|scenario| scenario.points.len() == 6)
        );
        assert_eq!(response.insurance.name, "PRUfamily Guard");
    }

    #[test]
    fn projection_request_defaults_to_the_balanced_point() {
        let request =
            projection_request_from_payload(ProjectionPayload::default()).expect("defaults valid");
        assert_approx(request.volatility, 9.0);
        assert_approx(request.expected_return, 7.5);
        assert_eq!(request.periods, 10);
        assert_eq!(request.seed, None);
    }

    #[test]
    fn projection_request_rejects_out_of_range_values() {
        let err = projection_request_from_payload(ProjectionPayload {
            periods: Some(0),
            ..Default::default()
        })
        .expect_err("must reject zero periods");
        assert!(err.contains("--periods"));

        let err = projection_request_from_payload(ProjectionPayload {
            volatility: Some(f64::NAN),
            ..Default::default()
        })
        .expect_err("must reject NaN volatility");
        assert!(err.contains("--volatility"));

        let err = projection_request_from_payload(ProjectionPayload {
            expected_return: Some(-150.0),
            ..Default::default()
        })
        .expect_err("must reject a total-loss return");
        assert!(err.contains("--expected-return"));
    }

    #[test]
    fn run_projection_is_reproducible_for_a_seed() {
        let request = projection_request_from_payload(ProjectionPayload {
            volatility: Some(18.0),
            expected_return: Some(8.0),
            periods: Some(12),
            seed: Some(77),
        })
        .expect("valid request");

        let first = run_projection(&request);
        let second = run_projection(&request);
        assert_eq!(first.points, second.points);
        assert_eq!(first.points.len(), 13);
        assert_approx(first.stats.current_value, first.points[12].value);
    }

    #[test]
    fn scenario_request_defaults_to_the_first_event() {
        let request =
            scenario_request_from_payload(ScenarioPayload::default()).expect("defaults valid");
        assert_eq!(request.event.name, "Normal Growth (2015-2019)");
        assert_approx(request.volatility, 15.0);
    }

    #[test]
    fn scenario_request_rejects_unknown_events() {
        let err = scenario_request_from_payload(ScenarioPayload {
            event: Some("Dot-Com Bust".to_string()),
            ..Default::default()
        })
        .expect_err("must reject unknown events");
        assert!(err.contains("unknown historical event"));
    }

    #[test]
    fn run_scenario_preserves_the_market_column() {
        let request = scenario_request_from_payload(ScenarioPayload {
            event: Some("2020 COVID-19 Crash".to_string()),
            volatility: Some(30.0),
        })
        .expect("valid request");
        let response = run_scenario(&request);

        assert_eq!(response.event, "2020 COVID-19 Crash");
        let market: Vec<f64> = response.points.iter().map(|point| point.market).collect();
        assert_eq!(market, vec![100.0, 110.0, 80.0, 105.0, 120.0, 140.0]);
        // volatility 30 doubles every deviation from the 100 baseline
        assert_approx(response.points[2].portfolio, 60.0);
    }

    #[test]
    fn session_response_reports_the_wizard_state() {
        let mut session = WizardSession::new();
        let response = session_response(&session);
        assert_eq!(response.step, 1);
        assert_eq!(response.step_name, "Profile");
        assert_eq!(response.total_steps, 5);
        assert!(response.profile.is_none());
        assert_eq!(response.summary_status, SummaryStatus::Idle);

        let payload = serde_json::from_str::<ProfilePayload>(
            r#"{
              "age": 31,
              "income": 70000,
              "financialGoal": "retirement",
              "familySituation": "single",
              "timeHorizon": 20
            }"#,
        )
        .expect("payload parses");
        let profile = profile_from_payload(payload).expect("profile builds");
        session.submit_profile(profile).expect("profile accepted");
        session
            .submit_questionnaire(MarketReaction::Hold, RiskPhilosophy::Medium)
            .expect("questionnaire accepted");
        session.begin_summary().expect("summary starts");

        let response = session_response(&session);
        assert_eq!(response.step, 3);
        assert_eq!(response.step_name, "Recommendations");
        assert!(response.profile.is_some());
        assert!(response.risk_profile.is_some());
        assert!(response.allocation.is_some());
        assert_eq!(response.summary_status, SummaryStatus::Pending);
        assert!(response.summary.is_none());

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"summaryStatus\":\"pending\""));
        assert!(json.contains("\"stepName\":\"Recommendations\""));
    }

    #[test]
    fn step_payload_parses_the_actions() {
        let payload =
            serde_json::from_str::<StepPayload>(r#"{"action": "next"}"#).expect("payload parses");
        assert_eq!(payload.action, ApiStepAction::Next);

        let payload =
            serde_json::from_str::<StepPayload>(r#"{"action": "restart"}"#).expect("payload parses");
        assert_eq!(payload.action, ApiStepAction::Restart);

        assert!(serde_json::from_str::<StepPayload>(r#"{"action": "skip"}"#).is_err());
    }
}
