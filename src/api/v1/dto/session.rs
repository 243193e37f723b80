use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SessionResponse {
    pub subject: String,
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl From<&AuthCtx> for SessionResponse {
    fn from(ctx: &AuthCtx) -> Self {
        Self {
            subject: ctx.subject().to_string(),
            role: ctx.role().as_str(),
            issued_at: ctx.claims().issued_at(),
            expires_at: ctx.claims().expires_at(),
        }
    }
}
