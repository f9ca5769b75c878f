// Application layer - Query services, refresh scheduling and series building
pub mod monitor_state;
pub mod point_service;
pub mod range_service;
pub mod reading_repository;
pub mod refresh_scheduler;
pub mod series_builder;
