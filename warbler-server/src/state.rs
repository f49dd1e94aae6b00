use std::path::PathBuf;
use std::sync::Arc;

use crate::db::Database;
use crate::session::SessionManager;
use crate::templates::Templates;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    pub templates: Arc<Templates>,
    /// Add `Secure` to the session cookie
    pub secure_cookies: bool,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(db: Database, templates: Templates) -> Self {
        let session_manager = SessionManager::new(db.clone());
        Self {
            db,
            session_manager,
            templates: Arc::new(templates),
            secure_cookies: false,
            static_dir: PathBuf::from(crate::config::DEFAULT_STATIC_DIR),
        }
    }

    pub fn with_session_manager(mut self, session_manager: SessionManager) -> Self {
        self.session_manager = session_manager;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Get authenticated user ID from session token
    pub fn get_authenticated_user_id_from_token(&self, token: &str) -> Option<i64> {
        self.session_manager.validate_session(token).ok()
    }
}
