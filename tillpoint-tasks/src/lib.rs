//! # Tillpoint Tasks
//!
//! Background task dispatch for the Tillpoint point-of-sale client.
//!
//! Every backend operation the register triggers (login, sync, sale
//! submission, cash-register calls) runs off the foreground context on its
//! own task. This crate gives those actions one uniform contract:
//! `submit(operation)` returns a handle, the handle delivers exactly one
//! result, and errors travel as values inside that result. There is no
//! cancellation; a dispatched operation always runs to completion.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tillpoint_tasks::Dispatcher;
//!
//! let dispatcher = Dispatcher::new();
//! let handle = dispatcher.submit(async { client.list_products().await });
//! // ...foreground keeps running...
//! let products = handle.join().await??;
//! ```

mod dispatcher;

pub use dispatcher::{Dispatcher, TaskError, TaskHandle, TaskId};
