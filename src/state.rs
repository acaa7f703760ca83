/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthService, contacts: ContactService, id_codec: IdCodec
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエストごとの状態 (AuthCtx) はここに置かない (request extensions に置く)
 */
use std::sync::Arc;

use crate::services::{auth::AuthService, contacts::ContactService, id_codec::IdCodec};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub contacts: Arc<ContactService>,
    pub id_codec: IdCodec,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, contacts: Arc<ContactService>, id_codec: IdCodec) -> Self {
        Self {
            auth,
            contacts,
            id_codec,
        }
    }
}
