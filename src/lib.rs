//! Viper SmartStart Client Library
//!
//! Client for the Calamp SmartStart vehicle telematics API: authenticates a
//! user, discovers the account's vehicles, and issues remote commands
//! (lock, unlock, start, stop, locate, top speed, ...).
//!
//! ```no_run
//! use smartstart::{Config, SmartStart};
//!
//! # async fn demo() -> smartstart::Result<()> {
//! let mut car = SmartStart::new(Config::new("foo@bar.com", "foobar123"))?;
//! car.arm(None).await?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;

pub use client::SmartStart;
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Device, DeviceId};
pub use session::{SessionId, SessionState};
