use sxp_vm::{Allocator, EvalErr, NodePtr, SExp};

const OP_QUOTE: u64 = 1;
const OP_APPLY: u64 = 2;
const OP_CONS: u64 = 4;

fn quote(a: &mut Allocator, node: NodePtr) -> Result<NodePtr, EvalErr> {
    let q = a.one();
    a.new_pair(q, node)
}

fn list2(a: &mut Allocator, first: NodePtr, second: NodePtr) -> Result<NodePtr, EvalErr> {
    let nil = a.nil();
    let tail = a.new_pair(second, nil)?;
    a.new_pair(first, tail)
}

/// Pre-bind a prefix of a program's eventual arguments. The result is the
/// program `(a (q . program) (c (q . arg1) (c (q . arg2) ... 1)))`: at run
/// time each bound argument is quoted and consed in front of whatever
/// environment the caller supplies, left-to-right.
pub fn curry(a: &mut Allocator, program: NodePtr, args: &[NodePtr]) -> Result<NodePtr, EvalErr> {
    let mut env = a.one();
    for &arg in args.iter().rev() {
        let quoted_arg = quote(a, arg)?;
        let op_c = a.new_small_number(OP_CONS)?;
        let tail = list2(a, quoted_arg, env)?;
        env = a.new_pair(op_c, tail)?;
    }
    let quoted_program = quote(a, program)?;
    let op_a = a.new_small_number(OP_APPLY)?;
    let tail = list2(a, quoted_program, env)?;
    a.new_pair(op_a, tail)
}

fn match_quoted(a: &Allocator, node: NodePtr) -> Option<NodePtr> {
    let SExp::Pair(op, quoted) = a.sexp(node) else {
        return None;
    };
    if op.is_pair() {
        return None;
    }
    if a.small_number(op)? == OP_QUOTE {
        Some(quoted)
    } else {
        None
    }
}

fn match_list2(a: &Allocator, node: NodePtr) -> Option<(NodePtr, NodePtr)> {
    let SExp::Pair(first, tail) = a.sexp(node) else {
        return None;
    };
    let SExp::Pair(second, nil) = a.sexp(tail) else {
        return None;
    };
    if matches!(a.sexp(nil), SExp::Atom) && a.atom_len(nil) == 0 {
        Some((first, second))
    } else {
        None
    }
}

fn match_op(a: &Allocator, node: NodePtr, code: u64) -> Option<(NodePtr, NodePtr)> {
    let SExp::Pair(op, tail) = a.sexp(node) else {
        return None;
    };
    if op.is_pair() || a.small_number(op)? != code {
        return None;
    }
    match_list2(a, tail)
}

/// Recover the original program and bound arguments from a curried program,
/// or `None` when the node is not in curried form.
pub fn uncurry(a: &Allocator, node: NodePtr) -> Option<(NodePtr, Vec<NodePtr>)> {
    let (quoted_program, mut env) = match_op(a, node, OP_APPLY)?;
    let program = match_quoted(a, quoted_program)?;
    let mut args = Vec::new();
    loop {
        if let Some((quoted_arg, rest)) = match_op(a, env, OP_CONS) {
            args.push(match_quoted(a, quoted_arg)?);
            env = rest;
        } else {
            // the chain must terminate in the pass-through path 1
            if a.sexp(env) != SExp::Atom || a.atom(env) != [1] {
                return None;
            }
            return Some((program, args));
        }
    }
}
