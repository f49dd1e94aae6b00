// Library exports for warbler-server
// The binary, the admin tool and the integration tests all build on these modules

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod flash;
pub mod middleware;
pub mod session;
pub mod state;
pub mod templates;
pub mod validation;
pub mod views;

pub use app::build_router;
pub use state::AppState;
