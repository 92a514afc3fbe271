//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `reminder` - Delivery windows, jitter, preferences, chain lifecycle
//! - `streak` - Pure streak transitions and levels

pub mod foundation;
pub mod reminder;
pub mod streak;
