//! HTTP handlers for churn-ui

pub mod health;
pub mod pages;
pub mod render;

pub use health::health_routes;
pub use pages::page_routes;
