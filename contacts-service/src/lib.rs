//! contacts-service: a contacts resource over HTTP backed by MongoDB, plus the
//! liveness, readiness and ping probes used by the orchestrator.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod repository;
pub mod services;
pub mod startup;
