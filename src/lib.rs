pub use sxp_tools;
pub use sxp_utils;
pub use sxp_vm;
