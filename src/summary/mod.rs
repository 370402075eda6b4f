mod gemini;
mod prompt;

pub use gemini::{API_KEY_ENV, GeminiClient, SummaryError};
pub use prompt::build_summary_prompt;

use crate::core::{PortfolioAllocation, RiskProfile, UserProfile};

pub const API_KEY_MISSING_MESSAGE: &str =
    "API Key is not configured. Please set the API_KEY environment variable.";
pub const SUMMARY_UNAVAILABLE_MESSAGE: &str =
    "There was an error generating your personalized summary. Please try again later.";

// Generation never fails outward; a missing key or a failed request degrades
// to a fixed notice the caller can show as-is.
#[derive(Clone)]
pub struct SummaryService {
    client: GeminiClient,
}

impl SummaryService {
    pub fn from_env() -> Self {
        Self::new(GeminiClient::from_env())
    }

    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub fn has_api_key(&self) -> bool {
        self.client.has_api_key()
    }

    pub async fn generate(
        &self,
        profile: &UserProfile,
        risk: RiskProfile,
        allocation: PortfolioAllocation,
    ) -> String {
        if !self.client.has_api_key() {
            tracing::warn!("summary requested without a configured API key");
            return API_KEY_MISSING_MESSAGE.to_string();
        }

        let prompt = build_summary_prompt(profile, risk, allocation);
        match self.client.generate_content(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "summary generation failed");
                SUMMARY_UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }
}
