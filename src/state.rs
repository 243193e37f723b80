/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: 起動時に一度だけ構築した AuthService
 *   - chat: completion client (API key 未設定なら None)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::{fmt, sync::Arc};

use crate::services::{auth::AuthService, chat::CompletionClient};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub chat: Option<Arc<dyn CompletionClient>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("chat", &self.chat.as_ref().map(|c| c.backend_name()))
            .finish()
    }
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, chat: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { auth, chat }
    }
}
