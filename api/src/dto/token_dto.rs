use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthContext;

/// Body of GET /api/v1/auth/me
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMemberResponse {
    pub member_id: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthContext> for CurrentMemberResponse {
    fn from(auth: AuthContext) -> Self {
        Self {
            member_id: auth.member_id,
            token_id: auth.token_id,
            expires_at: auth.expires_at,
        }
    }
}
