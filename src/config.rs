//! Backend configuration parsed from environment variables.

pub const ENV_API_KEY: &str = "BAAS_API_KEY";
pub const ENV_AUTH_DOMAIN: &str = "BAAS_AUTH_DOMAIN";
pub const ENV_PROJECT_ID: &str = "BAAS_PROJECT_ID";
pub const ENV_STORAGE_BUCKET: &str = "BAAS_STORAGE_BUCKET";
pub const ENV_MESSAGING_SENDER_ID: &str = "BAAS_MESSAGING_SENDER_ID";
pub const ENV_APP_ID: &str = "BAAS_APP_ID";

/// Errors produced while building or validating a [`BackendConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    MissingVar { var: &'static str },

    /// A required field is present but empty.
    #[error("config field `{field}` must not be empty")]
    EmptyField { field: &'static str },
}

/// Static configuration record identifying the hosted backend project.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl BackendConfig {
    /// Build typed backend config from environment variables.
    ///
    /// Required:
    /// - `BAAS_API_KEY`
    /// - `BAAS_PROJECT_ID`
    ///
    /// Optional:
    /// - `BAAS_AUTH_DOMAIN`: default `<project>.firebaseapp.com`
    /// - `BAAS_STORAGE_BUCKET`: default `<project>.firebasestorage.app`
    /// - `BAAS_MESSAGING_SENDER_ID`: default empty
    /// - `BAAS_APP_ID`: default empty
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required_var(ENV_API_KEY)?;
        let project_id = required_var(ENV_PROJECT_ID)?;

        let auth_domain = optional_var(ENV_AUTH_DOMAIN).unwrap_or_else(|| default_auth_domain(&project_id));
        let storage_bucket = optional_var(ENV_STORAGE_BUCKET).unwrap_or_else(|| default_storage_bucket(&project_id));
        let messaging_sender_id = optional_var(ENV_MESSAGING_SENDER_ID).unwrap_or_default();
        let app_id = optional_var(ENV_APP_ID).unwrap_or_default();

        let config = Self { api_key, auth_domain, project_id, storage_bucket, messaging_sender_id, app_id };
        config.validate()?;
        Ok(config)
    }

    /// Reject records whose identifying fields are blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [("apiKey", &self.api_key), ("authDomain", &self.auth_domain), ("projectId", &self.project_id)];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
        }
        Ok(())
    }
}

fn required_var(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar { var })
}

fn optional_var(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn default_auth_domain(project_id: &str) -> String {
    format!("{project_id}.firebaseapp.com")
}

fn default_storage_bucket(project_id: &str) -> String {
    format!("{project_id}.firebasestorage.app")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
