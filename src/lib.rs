//! DarkPool Market Maker - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, banners)
//! - **darkpool**: Protocol, signing, quoting and depth (re-exported from workspace)
//! - **hypersockets**: WebSocket session library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,no_run
//! use darkpool_mm::bin_common::{resolve_config_path, parse_args};
//! use darkpool_mm::darkpool::{Config, Runner};
//! ```

// Re-export workspace libraries for convenience
pub use darkpool;
pub use hypersockets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod banner;
    pub mod cli;

    pub use banner::{print_banner, print_shutdown};
    pub use cli::{config_path_from_args, load_config_from_env, parse_args, resolve_config_path, ConfigType};
}
