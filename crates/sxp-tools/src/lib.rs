//! # sxp-tools
//! The human-facing layer over the sxp engine: a textual notation for
//! values (assemble/disassemble), the operator keyword table, and the
//! hex-string entry points a binding layer calls.

pub mod api;
pub mod assemble;
pub mod disassemble;
pub mod error;
pub mod keywords;

pub use assemble::assemble;
pub use disassemble::disassemble;
pub use error::{Result, ToolsError};
