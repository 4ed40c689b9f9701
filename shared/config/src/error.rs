use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingVars(Vec<String>),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn missing_vars(&self) -> Vec<String> {
        match self {
            ConfigError::MissingVars(vars) => vars.clone(),
            ConfigError::InvalidValue { .. } => Vec::new(),
        }
    }
}
