//! hqmap Core
//!
//! Configuration, the presentation state machine and the [`Atlas`] facade
//! tying extraction to map focus.
//!
//! # Example
//!
//! ```rust,no_run
//! use hqmap_core::{Atlas, AtlasConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let atlas = Atlas::from_config(AtlasConfig::resolve(None)?)?;
//! let controller = atlas.controller();
//!
//! let submission = controller.submit("Alphabet").await?;
//! println!("{} -> {:?}", submission.record.name, submission.transform);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod atlas;
pub mod config;
pub mod error;
pub mod view_state;

// Re-exports
pub use atlas::Atlas;
pub use config::{AtlasConfig, ViewConfig};
pub use error::{AtlasError, ConfigError};
pub use view_state::{FencePolicy, PresentationState, Submission, ViewStateController};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hqmap core
    pub use crate::{
        Atlas, AtlasConfig, AtlasError, FencePolicy, PresentationState, Submission,
        ViewStateController,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
