//! REST surface for hotpod: handlers, response models, parameter parsing,
//! and the mode-aware router.

pub mod app;
pub mod context;
pub mod handlers;
pub mod models;
pub mod params;

pub use app::create_app;
pub use context::AppContext;
