//! Task Bot Watchdog Library
//!
//! Deployment watchdog for the task assistant Telegram bot.
//!
//! This crate provides the core functionality for:
//! - Probing the supervised service's liveness via the host process manager
//! - Restarting it with a bounded, persisted consecutive-failure budget
//! - Keeping an append-only audit trail of every decision and outcome
//! - The operator command surface (`check`, `status`, `logs`, `reset`)

pub mod audit;
pub mod commands;
pub mod config;
pub mod process;
pub mod supervisor;
