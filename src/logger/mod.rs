//! Process-wide `tracing` setup for the suite binary.
//! Until settings load, `RUST_LOG` overrides the bootstrap level so catalog and
//! settings errors can be traced. Event targets are left out of the output.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
