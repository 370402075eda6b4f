use thiserror::Error;

use crate::core::{MarketReaction, RiskPhilosophy, RiskProfile, UserProfile, derive_risk_profile};

pub const TOTAL_STEPS: u8 = 5;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WizardStep {
    Profile,
    RiskAssessment,
    Recommendations,
    Monitoring,
    Education,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Profile => 1,
            WizardStep::RiskAssessment => 2,
            WizardStep::Recommendations => 3,
            WizardStep::Monitoring => 4,
            WizardStep::Education => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Profile => "Profile",
            WizardStep::RiskAssessment => "Risk Assessment",
            WizardStep::Recommendations => "Recommendations",
            WizardStep::Monitoring => "Portfolio Monitoring",
            WizardStep::Education => "Education Center",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum FlowError {
    #[error("Profile details can only be submitted on the profile step.")]
    ProfileStepRequired,
    #[error("The risk questionnaire can only be submitted on the risk assessment step.")]
    RiskStepRequired,
    #[error("Please complete the previous steps to see your recommendations.")]
    StepsIncomplete,
    #[error("You are already on the first step.")]
    AtFirstStep,
    #[error("You are already on the final step.")]
    AtFinalStep,
    #[error("Rebalancing is available on the monitoring step.")]
    MonitoringStepRequired,
    #[error("A summary can only be requested on the recommendations step.")]
    RecommendationsStepRequired,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SummaryState {
    Idle,
    Pending { token: u64 },
    Ready { text: String },
}

// Single-user wizard session. Steps 1 and 2 advance only through their
// submissions; free navigation opens up once recommendations are reached.
// The summary token increases monotonically for the whole session lifetime
// so a response from an abandoned request can never overwrite a newer one.
#[derive(Debug)]
pub struct WizardSession {
    step: WizardStep,
    profile: Option<UserProfile>,
    risk_profile: Option<RiskProfile>,
    summary: SummaryState,
    summary_generation: u64,
    rebalanced: bool,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Profile,
            profile: None,
            risk_profile: None,
            summary: SummaryState::Idle,
            summary_generation: 0,
            rebalanced: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn risk_profile(&self) -> Option<RiskProfile> {
        self.risk_profile
    }

    pub fn summary(&self) -> &SummaryState {
        &self.summary
    }

    pub fn rebalanced(&self) -> bool {
        self.rebalanced
    }

    // Resubmitting a profile intentionally keeps any previously computed risk
    // profile; only a fresh questionnaire run replaces it.
    pub fn submit_profile(&mut self, profile: UserProfile) -> Result<(), FlowError> {
        if self.step != WizardStep::Profile {
            return Err(FlowError::ProfileStepRequired);
        }
        self.profile = Some(profile);
        self.step = WizardStep::RiskAssessment;
        Ok(())
    }

    pub fn submit_questionnaire(
        &mut self,
        reaction: MarketReaction,
        philosophy: RiskPhilosophy,
    ) -> Result<RiskProfile, FlowError> {
        if self.step != WizardStep::RiskAssessment {
            return Err(FlowError::RiskStepRequired);
        }
        let Some(profile) = self.profile.as_ref() else {
            return Err(FlowError::RiskStepRequired);
        };

        let risk_profile =
            derive_risk_profile(reaction, philosophy, profile.age, profile.time_horizon);
        self.risk_profile = Some(risk_profile);
        self.step = WizardStep::Recommendations;
        Ok(risk_profile)
    }

    pub fn advance(&mut self) -> Result<WizardStep, FlowError> {
        self.step = match self.step {
            WizardStep::Profile | WizardStep::RiskAssessment => {
                return Err(FlowError::StepsIncomplete);
            }
            WizardStep::Recommendations => WizardStep::Monitoring,
            WizardStep::Monitoring => WizardStep::Education,
            WizardStep::Education => return Err(FlowError::AtFinalStep),
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<WizardStep, FlowError> {
        self.step = match self.step {
            WizardStep::Profile => return Err(FlowError::AtFirstStep),
            WizardStep::RiskAssessment => WizardStep::Profile,
            WizardStep::Recommendations => WizardStep::RiskAssessment,
            WizardStep::Monitoring => WizardStep::Recommendations,
            WizardStep::Education => WizardStep::Monitoring,
        };
        Ok(self.step)
    }

    // The summary generation survives a restart so stale in-flight responses
    // from the previous walk stay stale.
    pub fn restart(&mut self) {
        self.step = WizardStep::Profile;
        self.profile = None;
        self.risk_profile = None;
        self.summary = SummaryState::Idle;
        self.rebalanced = false;
    }

    pub fn rebalance(&mut self) -> Result<(), FlowError> {
        if self.step != WizardStep::Monitoring {
            return Err(FlowError::MonitoringStepRequired);
        }
        self.rebalanced = true;
        Ok(())
    }

    pub fn begin_summary(&mut self) -> Result<u64, FlowError> {
        if self.step != WizardStep::Recommendations {
            return Err(FlowError::RecommendationsStepRequired);
        }
        self.summary_generation += 1;
        let token = self.summary_generation;
        self.summary = SummaryState::Pending { token };
        Ok(token)
    }

    // Applies the text only when the token is the most recently issued one and
    // the session is still looking at the recommendations step; anything else
    // is a stale response and is dropped.
    pub fn resolve_summary(&mut self, token: u64, text: String) -> bool {
        let current = matches!(self.summary, SummaryState::Pending { token: pending } if pending == token);
        if !current || self.step != WizardStep::Recommendations {
            return false;
        }
        self.summary = SummaryState::Ready { text };
        true
    }
}
