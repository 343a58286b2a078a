#[derive(Debug, thiserror::Error)]
pub enum BuyablesError {
    #[error("Invalid skill: {skill}. Available: {}", .available.join(", "))]
    InvalidSkill {
        skill: String,
        available: Vec<String>,
    },

    #[error("Skill data not found for: {0}")]
    SkillNotFound(String),

    #[error("Skill data for {skill} is corrupt: {reason}")]
    DataCorrupt { skill: String, reason: String },

    #[error("Failed to fetch OSRS prices: {0}")]
    FeedUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BuyablesError {
    /// True for errors caused by caller input rather than the service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BuyablesError::InvalidSkill { .. })
    }
}

pub type Result<T> = std::result::Result<T, BuyablesError>;
