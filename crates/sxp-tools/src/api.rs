//! The string-level entry points of the engine: every function takes and
//! returns hex or source text, mirroring the boundary a foreign binding
//! layer consumes. Failures come back as [`ToolsError`]; rendering them as
//! text in place of the payload is the caller's one-liner via `Display`.

use num_bigint::BigInt;

use sxp_utils::tree_hash;
use sxp_vm::number::{number_from_bytes, number_to_bytes};
use sxp_vm::serde::{node_from_bytes, node_to_bytes};
use sxp_vm::{run_program, Allocator, Cost, EvalErr, NodePtr, Reduction, SExp};

use crate::error::Result;
use crate::{assemble as text, disassemble as render};

fn parse(a: &mut Allocator, program_hex: &str) -> Result<NodePtr> {
    let bytes = hex::decode(program_hex.trim())?;
    Ok(node_from_bytes(a, &bytes)?)
}

fn unparse(a: &Allocator, node: NodePtr) -> Result<String> {
    Ok(hex::encode(node_to_bytes(a, node)?))
}

/// Assemble source text into the canonical program encoding.
pub fn assemble(source: &str) -> Result<String> {
    let mut a = Allocator::new();
    let node = text::assemble(&mut a, source)?;
    unparse(&a, node)
}

/// Disassemble a canonical program encoding into source text.
pub fn disassemble(program_hex: &str) -> Result<String> {
    let mut a = Allocator::new();
    let node = parse(&mut a, program_hex)?;
    Ok(render::disassemble(&a, node))
}

/// Run a program against a solution with an explicit cost budget, returning
/// the encoded result.
pub fn run_with_cost(program_hex: &str, solution_hex: &str, max_cost: Cost) -> Result<String> {
    let mut a = Allocator::new();
    let program = parse(&mut a, program_hex)?;
    let solution = parse(&mut a, solution_hex)?;
    let Reduction(_, result) = run_program(&mut a, program, solution, max_cost)?;
    unparse(&a, result)
}

/// Run a program against a solution with an unbounded budget.
pub fn run(program_hex: &str, solution_hex: &str) -> Result<String> {
    run_with_cost(program_hex, solution_hex, Cost::MAX)
}

/// The content hash of a program, as hex.
pub fn treehash(program_hex: &str) -> Result<String> {
    let mut a = Allocator::new();
    let node = parse(&mut a, program_hex)?;
    Ok(tree_hash(&a, node).to_string())
}

/// Curry an encoded argument list onto an encoded program.
pub fn curry(program_hex: &str, args_hex: &str) -> Result<String> {
    let mut a = Allocator::new();
    let program = parse(&mut a, program_hex)?;
    let mut args_node = parse(&mut a, args_hex)?;
    let mut args = Vec::new();
    while let SExp::Pair(first, rest) = a.sexp(args_node) {
        args.push(first);
        args_node = rest;
    }
    if a.atom_len(args_node) != 0 {
        return Err(EvalErr::WrongValueKind("proper argument list").into());
    }
    let curried = sxp_utils::curry(&mut a, program, &args)?;
    unparse(&a, curried)
}

/// The canonical byte encoding of a signed integer, as hex.
pub fn int_to_bytes(value: i64) -> String {
    hex::encode(number_to_bytes(&BigInt::from(value)))
}

/// Decode a canonical integer encoding, rendered in decimal.
pub fn int_from_bytes(bytes_hex: &str) -> Result<String> {
    let bytes = hex::decode(bytes_hex.trim())?;
    Ok(number_from_bytes(&bytes).to_string())
}

/// The first element of an encoded pair.
pub fn first(program_hex: &str) -> Result<String> {
    let mut a = Allocator::new();
    let node = parse(&mut a, program_hex)?;
    match a.sexp(node) {
        SExp::Pair(first, _) => unparse(&a, first),
        SExp::Atom => Err(EvalErr::WrongValueKind("pair").into()),
    }
}

/// The rest of an encoded pair.
pub fn rest(program_hex: &str) -> Result<String> {
    let mut a = Allocator::new();
    let node = parse(&mut a, program_hex)?;
    match a.sexp(node) {
        SExp::Pair(_, rest) => unparse(&a, rest),
        SExp::Atom => Err(EvalErr::WrongValueKind("pair").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ToolsError;

    #[test]
    fn test_assemble_run_disassemble() {
        let program = assemble("(+ (q . 1) (q . 2))").unwrap();
        let solution = assemble("()").unwrap();
        let result = run(&program, &solution).unwrap();
        assert_eq!(result, "03");
        assert_eq!(disassemble(&result).unwrap(), "3");
    }

    #[test]
    fn test_run_cost_budget() {
        let program = assemble("(+ (q . 1) (q . 2))").unwrap();
        let solution = assemble("()").unwrap();
        assert_eq!(
            run_with_cost(&program, &solution, 10).unwrap_err(),
            ToolsError::Eval(EvalErr::CostExceeded)
        );
    }

    #[test]
    fn test_treehash() {
        // sha256(0x01) -- the empty atom
        assert_eq!(
            treehash("80").unwrap(),
            "4bf5122f344554c53bde2ebb8cd2b7e3d1600ad631c385a5d7cce23c7785459a"
        );
        // tag separation: (() . ()) hashes differently
        assert_ne!(treehash("ff8080").unwrap(), treehash("80").unwrap());
    }

    #[test]
    fn test_curry_and_run() {
        // (+ 2 5) with 7 pre-bound, solution supplies 30
        let program = assemble("(+ 2 5)").unwrap();
        let args = assemble("(7)").unwrap();
        let curried = curry(&program, &args).unwrap();
        let solution = assemble("(30)").unwrap();
        let result = run(&curried, &solution).unwrap();
        assert_eq!(int_from_bytes(&result).unwrap(), "37");
    }

    #[test]
    fn test_int_conversions() {
        assert_eq!(int_to_bytes(0), "");
        assert_eq!(int_to_bytes(-1), "ff");
        assert_eq!(int_to_bytes(128), "0080");
        assert_eq!(int_from_bytes("ff").unwrap(), "-1");
        assert_eq!(int_from_bytes("0080").unwrap(), "128");
        assert_eq!(int_from_bytes("").unwrap(), "0");
    }

    #[test]
    fn test_first_rest() {
        let pair = assemble("(1 . 2)").unwrap();
        assert_eq!(first(&pair).unwrap(), "01");
        assert_eq!(rest(&pair).unwrap(), "02");
        assert!(matches!(
            first("80").unwrap_err(),
            ToolsError::Eval(EvalErr::WrongValueKind(_))
        ));
    }

    #[test]
    fn test_truncated_input_surfaces() {
        assert_eq!(
            disassemble("ff01").unwrap_err(),
            ToolsError::Eval(EvalErr::TruncatedInput)
        );
        assert!(matches!(
            disassemble("zz"),
            Err(ToolsError::Hex(_))
        ));
    }

    #[test]
    fn test_error_degrades_to_text() {
        let error = run("ff7effff010180", "80").unwrap_err();
        assert_eq!(error.to_string(), "unimplemented operator 126");
    }
}
