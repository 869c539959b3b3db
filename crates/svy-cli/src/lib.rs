//! Library components for the `svytab` binary.

pub mod logging;
pub mod pipeline;
