//! Auth models.

use serde::{Deserialize, Serialize};

/// The signed-in shopper as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    pub email: String,
}

impl UserProfile {
    /// Name to greet the shopper with.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}
