// ABOUTME: Helper module re-exports for integration tests
// ABOUTME: Keeps the HTTP harness importable from every test binary

pub mod axum_test;
