use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Minimum trigram similarity for a fuzzy (non-substring) match.
    /// TOML: `search.similarity_threshold`. Default: `0.3`.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Maximum number of candidates returned to pickers.
    /// TOML: `search.limit`. Default: `20`.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            limit: default_limit(),
        }
    }
}

impl SearchConfig {
    pub(super) fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err("search.similarity_threshold must be within 0.0..=1.0".to_string());
        }
        if self.limit == 0 {
            return Err("search.limit must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn default_similarity_threshold() -> f32 {
    0.3
}

fn default_limit() -> usize {
    20
}
