use sxp_vm::number::{is_canonical_number, number_from_bytes};
use sxp_vm::{Allocator, NodePtr, SExp};

use crate::keywords::keyword_from_opcode;

fn opcode_of(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 4 || bytes[0] == 0 {
        return None;
    }
    let mut code = 0u32;
    for &byte in bytes {
        code = (code << 8) | u32::from(byte);
    }
    Some(code)
}

fn printable(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&b| (0x20..0x7F).contains(&b) && b != b'"' && b != b'\'')
}

fn format_atom(a: &Allocator, node: NodePtr, operator_position: bool, output: &mut String) {
    let bytes = a.atom(node);
    if bytes.is_empty() {
        output.push_str("()");
        return;
    }
    if operator_position {
        if let Some(name) = opcode_of(bytes).and_then(keyword_from_opcode) {
            output.push_str(name);
            return;
        }
    }
    if bytes.len() <= 2 && is_canonical_number(bytes) {
        output.push_str(&number_from_bytes(bytes).to_string());
    } else if bytes.len() > 2 && printable(bytes) {
        output.push('"');
        output.push_str(&String::from_utf8_lossy(bytes));
        output.push('"');
    } else {
        output.push_str("0x");
        output.push_str(&hex::encode(bytes));
    }
}

enum RenderOp {
    Node(NodePtr, bool),
    Tail(NodePtr),
}

/// Render a value in the textual notation: parenthesized lists with a `.`
/// separator for improper tails, operator keywords in head position. The
/// walk keeps its own stack, so nesting depth is bounded by memory alone.
pub fn disassemble(a: &Allocator, node: NodePtr) -> String {
    let mut output = String::new();
    let mut ops = vec![RenderOp::Node(node, false)];
    while let Some(op) = ops.pop() {
        match op {
            RenderOp::Node(node, operator_position) => match a.sexp(node) {
                SExp::Atom => format_atom(a, node, operator_position, &mut output),
                SExp::Pair(first, rest) => {
                    output.push('(');
                    ops.push(RenderOp::Tail(rest));
                    ops.push(RenderOp::Node(first, true));
                }
            },
            RenderOp::Tail(node) => match a.sexp(node) {
                SExp::Pair(first, rest) => {
                    output.push(' ');
                    ops.push(RenderOp::Tail(rest));
                    ops.push(RenderOp::Node(first, false));
                }
                SExp::Atom => {
                    if a.atom_len(node) != 0 {
                        output.push_str(" . ");
                        format_atom(a, node, false, &mut output);
                    }
                    output.push(')');
                }
            },
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use sxp_vm::serde::node_from_bytes;

    fn disassemble_hex(input: &str) -> String {
        let mut a = Allocator::new();
        let node = node_from_bytes(&mut a, &hex::decode(input).unwrap()).unwrap();
        disassemble(&a, node)
    }

    #[rstest]
    #[case("80", "()")]
    #[case("01", "1")]
    #[case("81ff", "-1")]
    #[case("ff0102", "(q . 2)")]
    #[case("ff01ff0280", "(q 2)")]
    #[case("ff10ffff0101ffff010280", "(+ (q . 1) (q . 2))")]
    #[case("8568656c6c6f", "\"hello\"")]
    #[case("83000102", "0x000102")]
    #[case("ff0bffff017880", "(sha256 (q . 120))")]
    fn test_disassemble(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(disassemble_hex(input), expected);
    }

    #[test]
    fn test_deeply_nested_value() {
        let mut a = Allocator::new();
        let nil = a.nil();
        let mut node = a.one();
        for _ in 0..100_000 {
            node = a.new_pair(node, nil).unwrap();
        }
        // must not overflow the host stack
        let text = disassemble(&a, node);
        assert!(text.starts_with("((((("));
        assert!(text.ends_with(")))))"));
    }

    #[test]
    fn test_roundtrip_through_assemble() {
        use crate::assemble::assemble;
        use sxp_vm::serde::node_to_bytes;

        for source in [
            "()",
            "(q . 1)",
            "(+ (q . 1) (q . 2))",
            "(i 2 (q . \"yes\") (q . 0x6e6fff))",
            "(1 2 3 . 4)",
        ] {
            let mut a = Allocator::new();
            let node = assemble(&mut a, source).unwrap();
            let text = disassemble(&a, node);
            let reparsed = assemble(&mut a, &text).unwrap();
            assert_eq!(
                node_to_bytes(&a, node).unwrap(),
                node_to_bytes(&a, reparsed).unwrap(),
                "source {source}"
            );
        }
    }
}
