//! Common utilities and shared types for the staff portal.
//!
//! This crate provides foundational components used across all portal crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Secrets**: Redacting credential wrapper via [`Secret`]
//! - **Staff directory**: Local-to-Notion person mapping via [`StaffDirectory`]
//!
//! # Example
//!
//! ```no_run
//! use portal_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let directory = config.staff_directory();
//!     println!("{} staff members configured", directory.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod secret;
pub mod staff;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use secret::Secret;
pub use staff::{PLACEHOLDER_EXTERNAL_ID, StaffDirectory, StaffListing, StaffMember};
