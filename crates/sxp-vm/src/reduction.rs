use crate::allocator::NodePtr;
use crate::cost::Cost;
use crate::error::EvalErr;

/// The outcome of a successful reduction: the cost it consumed and the
/// resulting value.
#[derive(Debug, PartialEq, Eq)]
pub struct Reduction(pub Cost, pub NodePtr);

pub type Response = Result<Reduction, EvalErr>;
