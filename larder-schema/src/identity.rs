use serde::{Deserialize, Serialize};

/// Identity payload produced by an already-completed OAuth handshake.
///
/// The core never talks to the provider; it only links what it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub provider: String,

    #[serde(alias = "uid")]
    pub external_uid: String,

    pub username: String,

    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
