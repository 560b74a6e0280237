use serde::{Deserialize, Serialize};

/// Publicly visible projection of an activated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub login: String,
}
