// Presentation layer - HTTP surface over the loop monitor
pub mod app_state;
pub mod handlers;
pub mod views;
