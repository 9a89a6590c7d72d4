use crate::allocator::{Allocator, NodePtr, SExp};
use crate::cost::{Cost, MALLOC_COST_PER_BYTE};
use crate::error::EvalErr;
use crate::reduction::Reduction;

/// Destructure an operand list into exactly `N` values, or fail with
/// `ArityMismatch`.
pub fn get_args<const N: usize>(
    a: &Allocator,
    mut args: NodePtr,
    op: &'static str,
) -> Result<[NodePtr; N], EvalErr> {
    let mismatch = || EvalErr::ArityMismatch {
        op,
        expected: expected_args::<N>(),
    };
    let mut result = [NodePtr::NIL; N];
    for item in &mut result {
        let SExp::Pair(first, rest) = a.sexp(args) else {
            return Err(mismatch());
        };
        *item = first;
        args = rest;
    }
    if !nilp(a, args) {
        return Err(mismatch());
    }
    Ok(result)
}

const fn expected_args<const N: usize>() -> &'static str {
    match N {
        1 => "exactly 1",
        2 => "exactly 2",
        3 => "exactly 3",
        _ => "a fixed number of",
    }
}

/// True when `node` is the empty atom.
pub fn nilp(a: &Allocator, node: NodePtr) -> bool {
    matches!(a.sexp(node), SExp::Atom) && a.atom_len(node) == 0
}

/// The truthiness rule: everything except the empty atom is true.
pub fn truthy(a: &Allocator, node: NodePtr) -> bool {
    !nilp(a, node)
}

pub fn node_from_bool(a: &Allocator, value: bool) -> NodePtr {
    if value {
        a.one()
    } else {
        a.nil()
    }
}

/// Fetch an operand that must be an atom.
pub fn atom<'a>(a: &'a Allocator, node: NodePtr, kind: &'static str) -> Result<&'a [u8], EvalErr> {
    match a.sexp(node) {
        SExp::Atom => Ok(a.atom(node)),
        SExp::Pair(..) => Err(EvalErr::WrongValueKind(kind)),
    }
}

pub fn check_cost(cost: Cost, max_cost: Cost) -> Result<(), EvalErr> {
    if cost > max_cost {
        Err(EvalErr::CostExceeded)
    } else {
        Ok(())
    }
}

/// Account for the heap bytes of a freshly allocated result atom.
pub fn malloc_cost(a: &Allocator, cost: Cost, node: NodePtr) -> Reduction {
    Reduction(cost + a.atom_len(node) as Cost * MALLOC_COST_PER_BYTE, node)
}

pub fn hex_of(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_args() {
        let mut a = Allocator::new();
        let one = a.one();
        let nil = a.nil();
        let tail = a.new_pair(one, nil).unwrap();
        let list = a.new_pair(one, tail).unwrap();

        assert_eq!(get_args::<2>(&a, list, "=").unwrap(), [one, one]);
        assert!(matches!(
            get_args::<3>(&a, list, "i").unwrap_err(),
            EvalErr::ArityMismatch { op: "i", .. }
        ));
        assert!(matches!(
            get_args::<1>(&a, list, "l").unwrap_err(),
            EvalErr::ArityMismatch { op: "l", .. }
        ));
    }

    #[test]
    fn test_get_args_improper_tail() {
        let mut a = Allocator::new();
        let one = a.one();
        let improper = a.new_pair(one, one).unwrap();
        assert!(get_args::<1>(&a, improper, "l").is_err());
    }

    #[test]
    fn test_atom_view() {
        let mut a = Allocator::new();
        let node = a.new_atom(b"ab").unwrap();
        // the returned slice borrows from the allocator, not the handle
        let bytes = atom(&a, node, "atom argument").unwrap();
        assert_eq!(bytes, b"ab");
        let pair = a.new_pair(node, node).unwrap();
        assert_eq!(
            atom(&a, pair, "atom argument").unwrap_err(),
            EvalErr::WrongValueKind("atom argument")
        );
    }

    #[test]
    fn test_truthy() {
        let mut a = Allocator::new();
        assert!(!truthy(&a, a.nil()));
        assert!(truthy(&a, a.one()));
        let pair = a.new_pair(NodePtr::NIL, NodePtr::NIL).unwrap();
        assert!(truthy(&a, pair));
    }

    #[test]
    fn test_hex_of() {
        assert_eq!(hex_of(&[0x00, 0xAB]), "0x00ab");
    }
}
