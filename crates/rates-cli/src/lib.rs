//! Library side of the `rates` command: logging setup and directory runs.

pub mod logging;
pub mod pipeline;
