//! Shared data structures for the SCADA preprocessing pipeline
//!
//! - `columns`: canonical column names plus the declarative signal table
//! - `frame`: timestamp-indexed raw telemetry frame
//! - `record`: typed aggregate / toggle / metadata output rows

mod columns;
mod frame;
mod record;

pub use columns::*;
pub use frame::*;
pub use record::*;
