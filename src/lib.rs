//! Atelier: agent template discovery, catalog and lifecycle runtime.
//!
//! This crate discovers pluggable agent templates, keeps a versioned catalog
//! of them, and manages the concurrent lifecycle of agent instances built
//! from that catalog.
//!
//! # Architecture
//!
//! Atelier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (filesystem, in-memory)
//! - **Services**: Orchestration over ports and domain types
//!
//! # Modules
//!
//! - [`discovery`]: Manifest scanning and library fallback
//! - [`template`]: Template contracts, library and versioned registry
//! - [`agent`]: Agent factory and lifecycle scheduler
//! - [`config`]: Runtime configuration
//! - [`runtime`]: Wiring of all components into one context

pub mod agent;
pub mod config;
pub mod discovery;
pub mod error;
pub mod runtime;
pub mod template;
pub mod testing;
