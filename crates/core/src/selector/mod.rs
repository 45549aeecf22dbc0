//! Selector module: finds and locks one eligible file in a directory.
//!
//! Each call to [`FileSelector::select`]:
//!
//! 1. Lists the input directory and keeps regular files matching the pattern
//!    (and carrying a ready marker when `wait_for_ready` is set)
//! 2. Picks one candidate at random and tries to lock it
//! 3. On contention, drops that candidate and tries another
//! 4. When nothing could be locked, waits one poll interval and rescans
//!
//! Every wait observes the cancellation token.
//!
//! # Example
//!
//! ```ignore
//! use hopper_core::selector::{FileSelector, RandomSelector, SelectorConfig};
//!
//! let selector = RandomSelector::new(
//!     SelectorConfig::new("/data/transcode")
//!         .with_pattern("*.mp4")
//!         .with_wait_for_ready(true),
//! )?;
//! let mut file = selector.select(&cancel).await?;
//! ```

mod config;
mod error;
mod random;
mod traits;

pub use config::SelectorConfig;
pub use error::SelectError;
pub use random::RandomSelector;
pub use traits::FileSelector;
