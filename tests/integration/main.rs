//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the boards and the archive and
//! run whole strategies end-to-end into a temporary directory.

mod harvest_tests;
