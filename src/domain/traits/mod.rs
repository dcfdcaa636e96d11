//! Domain traits - Abstractions for infrastructure implementations

pub mod marketplace;
pub mod notifier;
pub mod store;

pub use marketplace::{Marketplace, Session};
pub use notifier::Notifier;
pub use store::Store;
