/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate (middleware/auth/access.rs) が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - extensions はリクエスト単位なので、他のリクエストから見えることはない
 * - 部分的に埋まった AuthCtx は存在しない (成功時に丸ごと insert するだけ)
 */
use uuid::Uuid;

use crate::services::auth::AuthenticatedPrincipal;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `principal` は検証済み token から解決した identity の最小表現
/// - `principal.authorities` は `ROLE_<role>`（判定は policy::authorize が読む）
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: AuthenticatedPrincipal,
}

impl AuthCtx {
    pub fn new(principal: AuthenticatedPrincipal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> Uuid {
        self.principal.user_id
    }
}
