//! # netshell
//!
//! Interactive SSH shell scraping for switches and routers.
//!
//! netshell opens a PTY shell on a device, sends commands and cleans the
//! terminal control sequences out of what comes back. Three layers build on
//! each other:
//!
//! - [`channel`]: one bounded read at a time from an interactive session,
//!   plus the sanitizer that strips cursor, erase and escape sequences
//! - [`driver`]: prompt-aware command exchange with mode tracking,
//!   `enable` and configuration sets
//! - [`params`] and [`automation`]: a JSON parameter document resolved into
//!   a configuration push with a structured result
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netshell::{Driver, DriverBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netshell::Error> {
//!     let mut driver = DriverBuilder::new("172.16.1.82")
//!         .username("manager")
//!         .password("manager")
//!         .platform("hp_procurve")
//!         .build()?;
//!
//!     driver.open().await?;
//!
//!     let response = driver.send_command("show version").await?;
//!     println!("{}", response.result);
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Cleaning raw shell output
//!
//! ```
//! use netshell::channel::PatternSet;
//!
//! let clean = PatternSet::shared().sanitize_str("\x1b[2K\x1b[1;1HHello World\x1b[K");
//! assert_eq!(clean, "Hello World");
//! ```

pub mod automation;
pub mod channel;
pub mod driver;
pub mod error;
pub mod params;
pub mod platform;
pub mod script;
pub mod transport;

// Re-export main types for convenience
pub use channel::{PatternSet, ShellReader};
pub use driver::{Driver, DriverBuilder, GenericDriver, Response};
pub use error::Error;
pub use platform::{PlatformDefinition, PlatformRegistry};
pub use transport::{AuthMethod, SshConfig};
