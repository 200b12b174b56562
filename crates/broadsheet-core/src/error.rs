use thiserror::Error;

use crate::analytics::Tenant;

/// Startup failures. Any of these prevents the server from binding.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("cannot read ini file: {0}")]
    Ini(String),
}

/// Reasons a broadsheet cannot be produced for a tenant.
///
/// Every variant aborts the current submission. [`InsightsError::status`]
/// is the text written to the session log, [`InsightsError::user_message`]
/// the text shown on the error page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InsightsError {
    #[error("organisation and project are both required")]
    MissingTenant,

    #[error("no project found")]
    NoProjectFound,

    #[error("no analytics integration found")]
    NoAnalyticsIntegrated,

    #[error("engagement analytics not configured")]
    NoEngagementAnalyticsConfigured,

    #[error("keywords not configured")]
    NoKeywordsConfigured,

    #[error("transport error: {0}")]
    Transport(String),
}

impl InsightsError {
    pub fn status(&self) -> &'static str {
        match self {
            Self::MissingTenant => "Missing organisation or project",
            Self::NoProjectFound => "No project found",
            Self::NoAnalyticsIntegrated => "No analytics found",
            Self::NoEngagementAnalyticsConfigured => "No revenue data found",
            Self::NoKeywordsConfigured => "No keywords data found",
            Self::Transport(_) => "Transport error",
        }
    }

    pub fn user_message(&self, organisation: &str, project: &str) -> String {
        let tenant = format!("{organisation}/{project}");
        match self {
            Self::MissingTenant => {
                "Both an organisation and a project name are required.".to_string()
            }
            Self::NoProjectFound => format!(
                "No project found. Try another organisation and project name. ({tenant})"
            ),
            Self::NoAnalyticsIntegrated => format!(
                "No analytics tool has been integrated into the specified project ({tenant})"
            ),
            Self::NoEngagementAnalyticsConfigured => format!(
                "Engagement analytics with visits, revenue & transactions has not been configured for the specified project ({tenant})"
            ),
            Self::NoKeywordsConfigured => format!(
                "RealKeywords has not been configured for the specified project ({tenant})"
            ),
            Self::Transport(_) => format!(
                "The analytics platform could not be reached. Please try again later. ({tenant})"
            ),
        }
    }

    pub fn user_message_for(&self, tenant: &Tenant) -> String {
        self.user_message(&tenant.organisation, &tenant.project)
    }

    /// `true` for the kinds caused by the tenant's own setup rather than
    /// by infrastructure.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
