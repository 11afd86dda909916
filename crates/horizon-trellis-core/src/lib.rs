//! Core systems for Horizon Trellis.
//!
//! This crate holds the pieces of the view engine that know nothing about views:
//!
//! - **Thread affinity**: which thread is the UI thread, and checks against it
//! - **UI dispatch**: a fire-and-forget closure queue drained on the UI thread
//! - **Logging**: `tracing` targets, perf spans and tree-dump options
//!
//! # Posting work to the UI thread
//!
//! ```
//! use horizon_trellis_core::{UiQueue, is_ui_thread};
//!
//! struct Model {
//!     count: u32,
//! }
//!
//! let queue: UiQueue<Model> = UiQueue::new();
//! let handle = queue.handle();
//!
//! let worker = std::thread::spawn(move || {
//!     handle.post(|model| model.count += 1).unwrap();
//! });
//! worker.join().unwrap();
//!
//! assert!(is_ui_thread());
//! let mut model = Model { count: 0 };
//! for task in queue.take_pending() {
//!     task.run(&mut model);
//! }
//! assert_eq!(model.count, 1);
//! ```

pub mod dispatch;
mod error;
pub mod logging;
pub mod thread_check;

pub use dispatch::{UiHandle, UiQueue, UiTask};
pub use error::{Result, TrellisError};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use thread_check::{ThreadAffinity, is_ui_thread, set_ui_thread, ui_thread_id};
