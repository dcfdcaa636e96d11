//! Domain layer - Core business objects and the seams to the outside world
//! 
//! This layer contains:
//! - Entities: Users, favorites and availability snapshots
//! - Traits: Abstractions for infrastructure (Marketplace, Store, Notifier)

pub mod entities;
pub mod traits;
