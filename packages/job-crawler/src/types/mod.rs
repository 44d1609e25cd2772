//! Domain types shared by adapters, the extractor, and the orchestrator.

pub mod company;
pub mod config;
pub mod event;
