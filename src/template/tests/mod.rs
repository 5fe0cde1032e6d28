//! Unit tests for the template catalog services.

mod manager_tests;
