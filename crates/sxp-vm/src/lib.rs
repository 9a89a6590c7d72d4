//! # sxp-vm
//! A canonical, cost-metered S-expression virtual machine. Programs and data
//! share one value model: immutable byte-string atoms and pairs, built
//! bottom-up in an arena [`Allocator`] and addressed by [`NodePtr`] handles.
//!
//! [`run_program`] reduces a program against an environment with an explicit
//! work stack and a caller-supplied cost budget, so arbitrarily deep or
//! looping programs stay bounded.

pub mod allocator;
pub mod core_ops;
pub mod cost;
pub mod error;
pub mod more_ops;
pub mod number;
pub mod op_utils;
pub mod reduction;
pub mod run_program;
pub mod serde;

pub use allocator::{Allocator, NodePtr, SExp};
pub use cost::Cost;
pub use error::EvalErr;
pub use number::Number;
pub use reduction::{Reduction, Response};
pub use run_program::run_program;
