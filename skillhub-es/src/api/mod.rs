//! HTTP API for the event submission service

pub mod auth;
pub mod health;
pub mod report;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use report::report_skill;
