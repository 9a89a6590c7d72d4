//! # sxp-utils
//! Tree hashing and currying utilities for sxp programs.
//!
//! ## Currying Example
//!
//! ```rust
//! use sxp_utils::curry;
//! use sxp_vm::{serde::node_to_bytes, Allocator};
//!
//! let a = &mut Allocator::new();
//!
//! let program = a.one();
//! let arg1 = a.new_small_number(42).unwrap();
//! let arg2 = a.new_small_number(75).unwrap();
//!
//! let ptr = curry(a, program, &[arg1, arg2]).unwrap();
//! let hex = hex::encode(node_to_bytes(a, ptr).unwrap());
//!
//! // (a (q . 1) (c (q . 42) (c (q . 75) 1)))
//! assert_eq!(hex, "ff02ffff0101ffff04ffff012affff04ffff014bff01808080");
//! ```

mod curry;
mod curry_tree_hash;
mod tree_hash;

pub use curry::*;
pub use curry_tree_hash::*;
pub use tree_hash::*;
