use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Provider whose account username is shown as a person's handle.
    /// TOML: `identity.handle_provider`. Default: `chef_oauth2`.
    #[serde(default = "default_handle_provider")]
    pub handle_provider: String,

    /// Source-control provider used to resolve commit-author logins.
    /// TOML: `identity.source_control_provider`. Default: `github`.
    #[serde(default = "default_source_control_provider")]
    pub source_control_provider: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            handle_provider: default_handle_provider(),
            source_control_provider: default_source_control_provider(),
        }
    }
}

impl IdentityConfig {
    pub(super) fn validate(&self) -> Result<(), String> {
        if self.handle_provider.trim().is_empty() {
            return Err("identity.handle_provider must be non-empty".to_string());
        }
        if self.source_control_provider.trim().is_empty() {
            return Err("identity.source_control_provider must be non-empty".to_string());
        }
        Ok(())
    }
}

fn default_handle_provider() -> String {
    "chef_oauth2".to_string()
}

fn default_source_control_provider() -> String {
    "github".to_string()
}
