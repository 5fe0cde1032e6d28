//! Unit tests for manifest parsing and the discovery engine.

mod engine_tests;
