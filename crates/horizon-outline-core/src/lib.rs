//! Core systems for Horizon Outline.
//!
//! This crate provides the runtime primitives the outline component is built
//! on:
//!
//! - **Signal/Slot System**: Type-safe observer lists for publish-on-change
//! - **Property System**: Value cells written under a single lock
//! - **Dispatcher**: The render thread's task queue, used to hand background
//!   completions back to the single logical thread of control
//! - **Logging**: Tracing targets, span names and helpers
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_outline_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Dispatch Example
//!
//! ```
//! use horizon_outline_core::Dispatcher;
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.install()?;
//!
//! let handle = dispatcher.handle();
//! std::thread::spawn(move || {
//!     let _ = handle.post(|| println!("back on the render thread"));
//! })
//! .join()
//! .unwrap();
//!
//! dispatcher.process_all();
//! # Ok::<(), horizon_outline_core::OutlineError>(())
//! ```

pub mod dispatcher;
mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use dispatcher::{DispatchHandle, Dispatcher, TaskId};
pub use error::{DispatchError, OutlineError, Result};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use property::Property;
pub use signal::{ConnectionId, ConnectionType, Signal};
