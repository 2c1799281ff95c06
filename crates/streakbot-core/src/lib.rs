//! # Streakbot Core Library
//!
//! This library provides the core logic for Streakbot, a chat bot that keeps
//! one community-wide streak counter and advances it once per calendar day in
//! a fixed reference timezone. Chat platforms are thin adapters over the
//! [`Gateway`] trait; the `streakbot` binary ships Discord and console ones.
//!
//! ## Architecture
//!
//! - **Clock**: reference-timezone dates and DST-aware midnight boundaries
//! - **Streak**: the state machine and the single mutex that owns it
//! - **Scheduler**: a tokio task that wakes at each local midnight and counts
//!   the new day at most once
//! - **Commands**: `!start`, `!reset`, `!time`, `!streak`, `!streakbot`
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`StreakTracker`]: Serialized access to the streak state
//! - [`DailyScheduler`]: Midnight advancement loop
//! - [`CommandHandler`]: Command to reply mapping
//! - [`StreakBot`]: Glue between a gateway, the handler and the scheduler
//! - [`Config`]: Bot configuration management

pub mod bot;
pub mod clock;
pub mod commands;
pub mod error;
pub mod events;
pub mod gateway;
pub mod scheduler;
pub mod storage;
pub mod streak;

pub use bot::StreakBot;
pub use clock::{Clock, ClockSource, ManualClock, SystemClock};
pub use commands::{Command, CommandHandler, Reply, ReplyKind};
pub use error::{ClockError, ConfigError, CoreError, GatewayError, StreakError};
pub use events::Event;
pub use gateway::{Destination, Gateway, InboundMessage, Outbound, WebhookGateway};
pub use scheduler::{DailyScheduler, SchedulerState};
pub use storage::Config;
pub use streak::{ReentryPolicy, ResetPolicy, StartPolicy, StreakState, StreakTracker};
