use serde::{Deserialize, Serialize};

/// Reference to an ownable resource as it arrives from the outside.
///
/// `kind` is kept as the raw tag (e.g. `"Package"`); the core resolves it to a
/// known resource kind and rejects anything else as not found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(alias = "resourceable_type")]
    pub kind: String,

    #[serde(alias = "resourceable_id")]
    pub id: i64,
}

impl ResourceRef {
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
