use crate::allocator::{Allocator, NodePtr, SExp};
use crate::cost::{
    Cost, CONS_COST, EQ_BASE_COST, EQ_COST_PER_BYTE, FIRST_COST, IF_COST, LISTP_COST, REST_COST,
};
use crate::error::EvalErr;
use crate::op_utils::{atom, check_cost, get_args, hex_of, node_from_bool, truthy};
use crate::reduction::{Reduction, Response};

pub fn op_if(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [condition, affirmative, negative] = get_args::<3>(a, input, "i")?;
    let chosen = if truthy(a, condition) {
        affirmative
    } else {
        negative
    };
    Ok(Reduction(IF_COST, chosen))
}

pub fn op_cons(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [first, rest] = get_args::<2>(a, input, "c")?;
    let pair = a.new_pair(first, rest)?;
    Ok(Reduction(CONS_COST, pair))
}

pub fn op_first(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [node] = get_args::<1>(a, input, "f")?;
    match a.sexp(node) {
        SExp::Pair(first, _) => Ok(Reduction(FIRST_COST, first)),
        SExp::Atom => Err(EvalErr::WrongValueKind("pair argument for f")),
    }
}

pub fn op_rest(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [node] = get_args::<1>(a, input, "r")?;
    match a.sexp(node) {
        SExp::Pair(_, rest) => Ok(Reduction(REST_COST, rest)),
        SExp::Atom => Err(EvalErr::WrongValueKind("pair argument for r")),
    }
}

pub fn op_listp(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [node] = get_args::<1>(a, input, "l")?;
    let result = node_from_bool(a, node.is_pair());
    Ok(Reduction(LISTP_COST, result))
}

/// The `x` operator: unconditional failure carrying its operands.
pub fn op_raise(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let mut message = String::new();
    let mut args = input;
    while let SExp::Pair(first, rest) = a.sexp(args) {
        if !message.is_empty() {
            message.push(' ');
        }
        match a.sexp(first) {
            SExp::Atom => message.push_str(&hex_of(a.atom(first))),
            SExp::Pair(..) => message.push_str("(...)"),
        }
        args = rest;
    }
    Err(EvalErr::Raise(message))
}

pub fn op_eq(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let [lhs, rhs] = get_args::<2>(a, input, "=")?;
    let lhs_bytes = atom(a, lhs, "atom arguments for =")?;
    let rhs_bytes = atom(a, rhs, "atom arguments for =")?;
    let cost =
        EQ_BASE_COST + (lhs_bytes.len() + rhs_bytes.len()) as Cost * EQ_COST_PER_BYTE;
    check_cost(cost, max_cost)?;
    let equal = lhs_bytes == rhs_bytes;
    Ok(Reduction(cost, node_from_bool(a, equal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op_utils::nilp;

    fn two_args(a: &mut Allocator, lhs: NodePtr, rhs: NodePtr) -> NodePtr {
        let nil = a.nil();
        let tail = a.new_pair(rhs, nil).unwrap();
        a.new_pair(lhs, tail).unwrap()
    }

    fn one_arg(a: &mut Allocator, node: NodePtr) -> NodePtr {
        let nil = a.nil();
        a.new_pair(node, nil).unwrap()
    }

    #[test]
    fn test_if_selects_branch() {
        let mut a = Allocator::new();
        let yes = a.new_atom(b"yes").unwrap();
        let no = a.new_atom(b"no").unwrap();
        let nil = a.nil();
        let tail = two_args(&mut a, yes, no);

        let one = a.one();
        let input = a.new_pair(one, tail).unwrap();
        assert_eq!(op_if(&mut a, input, 0).unwrap().1, yes);

        let input = a.new_pair(nil, tail).unwrap();
        assert_eq!(op_if(&mut a, input, 0).unwrap().1, no);
    }

    #[test]
    fn test_cons_first_rest() {
        let mut a = Allocator::new();
        let x = a.new_atom(b"x").unwrap();
        let y = a.new_atom(b"y").unwrap();
        let input = two_args(&mut a, x, y);
        let Reduction(_, pair) = op_cons(&mut a, input, 0).unwrap();

        let input = one_arg(&mut a, pair);
        assert_eq!(op_first(&mut a, input, 0).unwrap().1, x);
        assert_eq!(op_rest(&mut a, input, 0).unwrap().1, y);
    }

    #[test]
    fn test_first_of_atom_fails() {
        let mut a = Allocator::new();
        let x = a.new_atom(b"x").unwrap();
        let input = one_arg(&mut a, x);
        assert!(matches!(
            op_first(&mut a, input, 0).unwrap_err(),
            EvalErr::WrongValueKind(_)
        ));
        assert!(matches!(
            op_rest(&mut a, input, 0).unwrap_err(),
            EvalErr::WrongValueKind(_)
        ));
    }

    #[test]
    fn test_listp() {
        let mut a = Allocator::new();
        let x = a.new_atom(b"x").unwrap();
        let input = one_arg(&mut a, x);
        let Reduction(_, result) = op_listp(&mut a, input, 0).unwrap();
        assert!(nilp(&a, result));

        let pair = a.new_pair(x, x).unwrap();
        let input = one_arg(&mut a, pair);
        let Reduction(_, result) = op_listp(&mut a, input, 0).unwrap();
        assert!(truthy(&a, result));
    }

    #[test]
    fn test_raise() {
        let mut a = Allocator::new();
        let reason = a.new_atom(&[0xDE, 0xAD]).unwrap();
        let input = one_arg(&mut a, reason);
        assert_eq!(
            op_raise(&mut a, input, 0).unwrap_err(),
            EvalErr::Raise("0xdead".to_string())
        );
    }

    #[test]
    fn test_eq() {
        let mut a = Allocator::new();
        let x1 = a.new_atom(b"x").unwrap();
        let x2 = a.new_atom(b"x").unwrap();
        let y = a.new_atom(b"y").unwrap();

        let input = two_args(&mut a, x1, x2);
        let Reduction(_, result) = op_eq(&mut a, input, u64::MAX).unwrap();
        assert!(truthy(&a, result));

        let input = two_args(&mut a, x1, y);
        let Reduction(_, result) = op_eq(&mut a, input, u64::MAX).unwrap();
        assert!(nilp(&a, result));
    }

    #[test]
    fn test_eq_requires_atoms() {
        let mut a = Allocator::new();
        let x = a.new_atom(b"x").unwrap();
        let pair = a.new_pair(x, x).unwrap();
        let input = two_args(&mut a, pair, x);
        assert!(matches!(
            op_eq(&mut a, input, u64::MAX).unwrap_err(),
            EvalErr::WrongValueKind(_)
        ));
    }
}
