//! Unit tests for agent lifecycle services.

mod support;
