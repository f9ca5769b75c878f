// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod http_response;
#[cfg(test)]
pub mod memory_repository;
pub mod postgrest_repository;
