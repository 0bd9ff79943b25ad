//! # mempool-watch
//!
//! A command-line monitor for mempool.space compatible APIs.
//!
//! The binary resolves its [`settings`], brings up a
//! [`Monitor`](mempool_poller::Monitor) and prints the projected values in
//! [`display`] after every published snapshot.
//!
//! ## Usage
//!
//! ```bash
//! # Print one snapshot and exit
//! mempool-watch --once
//!
//! # Poll a self-hosted instance every minute, mirroring snapshots to disk
//! mempool-watch --base-url http://localhost:8999 --interval 60 --output-file snapshot.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use mempool_poller::setup;
//! use mempool_watch::{display, settings::{Args, WatchConfig}};
//!
//! # tokio_test::block_on(async {
//! let config = WatchConfig::load(&Args::default()).unwrap();
//! let monitor = setup(config.into_settings()).await.unwrap();
//! print!("{}", display::render_table(monitor.poller().current().as_deref()));
//! # });
//! ```

pub mod display;
pub mod settings;

pub use display::{print_updates, render_table};
pub use settings::{Args, WatchConfig};
