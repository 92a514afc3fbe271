//! Habit Nudge - Habit reminders with engagement streaks
//!
//! This crate schedules recurring reminders per user and reminder type
//! inside a timezone-aware daily window, adds jitter to the cadence, and
//! turns response latency into streaks with levels and weekly protection.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
