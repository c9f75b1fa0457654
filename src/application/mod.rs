// Application layer - Use cases and repository seam
pub mod aggregation;
pub mod query_service;
pub mod telemetry_repository;
