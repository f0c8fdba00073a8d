//! HTTP API for greenloop-web

pub mod health;
pub mod impact;
pub mod places;
pub mod report;
pub mod session;
pub mod ui;

pub use health::health_routes;
pub use impact::impact_routes;
pub use places::places_routes;
pub use report::report_routes;
pub use session::session_routes;
pub use ui::ui_routes;
