//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Credential handling, reconciliation and the run driver
//! - Errors: Run, marketplace, storage and notification errors

pub mod errors;
pub mod services;
