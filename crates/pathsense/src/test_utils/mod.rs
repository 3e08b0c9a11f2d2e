// test_utils - shared fixtures for unit tests, integration tests and benches

pub mod fixture_workspace;
