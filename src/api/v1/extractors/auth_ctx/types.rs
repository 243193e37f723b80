/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - guard が検証して request extensions に一度だけ格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証や role 判定は services/middleware 側の責務
 */
use crate::services::auth::{Claims, Role};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// 検証済みの `Claims` を保持する。生成後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn subject(&self) -> &str {
        self.claims.subject()
    }

    pub fn role(&self) -> Role {
        self.claims.role()
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
