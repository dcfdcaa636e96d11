//! Application services - Business logic orchestration

pub mod run_context;
pub mod credential_service;
pub mod reconcile_service;
pub mod run_service;


pub use run_context::RunContext;
pub use credential_service::CredentialService;
pub use reconcile_service::ReconcileService;
pub use run_service::{RunService, RunSummary};
