//! Backend-as-a-service app initialization.
//!
//! DESIGN
//! ======
//! `initialize_app` validates the configuration once and returns an [`App`]
//! owning it behind an `Arc`. Service handles are cheap clones that share
//! the same record; they are opaque references to remote services and never
//! perform I/O themselves. The local session stub does not call into the
//! auth handle.

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use crate::config::{BackendConfig, ConfigError};

/// Name given to an app initialized without an explicit name.
pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

/// An initialized backend app. Handles obtained from it share its config.
#[derive(Debug, Clone)]
pub struct App {
    name: String,
    config: Arc<BackendConfig>,
}

impl App {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Handle to the hosted authentication service.
    #[must_use]
    pub fn auth(&self) -> AuthHandle {
        AuthHandle { app_name: self.name.clone(), config: Arc::clone(&self.config) }
    }

    /// Handle to the hosted document database.
    #[must_use]
    pub fn firestore(&self) -> DocumentDbHandle {
        DocumentDbHandle { app_name: self.name.clone(), config: Arc::clone(&self.config) }
    }
}

/// Opaque reference to the authentication service of an [`App`].
#[derive(Debug, Clone)]
pub struct AuthHandle {
    app_name: String,
    config: Arc<BackendConfig>,
}

impl AuthHandle {
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    #[must_use]
    pub fn auth_domain(&self) -> &str {
        &self.config.auth_domain
    }

    /// Whether requests through this handle would carry an API key.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.config.api_key.is_empty()
    }
}

/// Opaque reference to the document database of an [`App`].
#[derive(Debug, Clone)]
pub struct DocumentDbHandle {
    app_name: String,
    config: Arc<BackendConfig>,
}

impl DocumentDbHandle {
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Resource path of the project's default database.
    #[must_use]
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.config.project_id)
    }
}

/// Initialize the default app from a configuration record.
pub fn initialize_app(config: BackendConfig) -> Result<App, ConfigError> {
    initialize_named_app(config, DEFAULT_APP_NAME)
}

/// Initialize an app under an explicit name.
pub fn initialize_named_app(config: BackendConfig, name: &str) -> Result<App, ConfigError> {
    config.validate()?;
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyField { field: "name" });
    }
    tracing::info!(app = name, project_id = %config.project_id, "backend app initialized");
    Ok(App { name: name.to_string(), config: Arc::new(config) })
}
