//! Background Tasks Module
//!
//! Contains optional background tasks that run alongside a shared cache.
//!
//! # Tasks
//! - Expiration sweeper: removes expired entries at a fixed interval

mod sweeper;

pub use sweeper::{spawn_sweeper, SweeperHandle};
