//! Toolkit independent state and plumbing behind the conversion UI: what the user has selected,
//! the status of the current conversion, and the worker that runs conversions off the UI thread.

pub mod controller;
pub mod job;
pub mod selection;
pub mod worker;
