//! 認証 gate: bearer token 検証 → identity 解決 → AuthCtx を extensions に入れる
//!
//! - 公開パス (PUBLIC_PATH_PREFIXES) は token を見ずにそのまま通す
//! - `Authorization: Bearer <token>` が無い / 形式が違う場合は匿名として通す
//! - 検証 / 解決に失敗しても拒否はしない。AuthCtx を入れずに通し、
//!   必要な handler が `AuthCtxExtractor` で 401 を返す (認証と認可の分離)
//! - リクエストごとに一度だけ走る。AuthCtx はそのリクエストの extensions にしか存在しない

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{error, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Router 全体に gate を掛ける。
///
/// 例：
/// ```ignore
/// let app = Router::new().nest("/api/v1", api::v1::routes());
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Bearer <token>` の token 部分。scheme は大文字小文字を区別しない。
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if state.auth.is_public(original_uri.path()) {
        return next.run(req).await;
    }

    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return next.run(req).await;
    };

    match state.auth.authenticate(&token).await {
        Ok(principal) => {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(AuthCtx::new(principal));
        }
        Err(AuthError::Token(kind)) => {
            warn!(path = %original_uri.path(), reason = ?kind, "bearer token rejected");
        }
        Err(AuthError::IdentityNotFound) => {
            warn!(path = %original_uri.path(), "bearer token subject no longer resolves");
        }
        Err(err) => {
            error!(path = %original_uri.path(), error = ?err, "authentication failed");
        }
    }

    next.run(req).await
}
