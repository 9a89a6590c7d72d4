use crate::allocator::{Allocator, NodePtr, SExp};
use crate::error::EvalErr;
use crate::serde::CONS_MARKER;

const MAX_ATOM_SIZE: u64 = 0x4_0000_0000; // 2^34, the largest 5-byte prefix

/// Append the canonical length prefix for an atom of `size` bytes. Sizes up
/// to 0x3f fit a single tag byte; longer atoms use the shortest extended
/// prefix that can hold the size.
fn encode_size(output: &mut Vec<u8>, size: u64) -> Result<(), EvalErr> {
    if size < 0x40 {
        output.push(0x80 | size as u8);
    } else if size < 0x2000 {
        output.push(0xC0 | (size >> 8) as u8);
        output.push(size as u8);
    } else if size < 0x10_0000 {
        output.push(0xE0 | (size >> 16) as u8);
        output.push((size >> 8) as u8);
        output.push(size as u8);
    } else if size < 0x800_0000 {
        output.push(0xF0 | (size >> 24) as u8);
        output.push((size >> 16) as u8);
        output.push((size >> 8) as u8);
        output.push(size as u8);
    } else if size < MAX_ATOM_SIZE {
        output.push(0xF8 | (size >> 32) as u8);
        output.push((size >> 24) as u8);
        output.push((size >> 16) as u8);
        output.push((size >> 8) as u8);
        output.push(size as u8);
    } else {
        return Err(EvalErr::InvalidEncoding("atom too large to serialize"));
    }
    Ok(())
}

/// Serialize a value to its unique canonical byte encoding.
pub fn node_to_bytes(a: &Allocator, node: NodePtr) -> Result<Vec<u8>, EvalErr> {
    let mut output = Vec::new();
    let mut pending = vec![node];
    while let Some(node) = pending.pop() {
        match a.sexp(node) {
            SExp::Atom => {
                let bytes = a.atom(node);
                if bytes.len() == 1 && bytes[0] <= 0x7F {
                    output.push(bytes[0]);
                } else {
                    encode_size(&mut output, bytes.len() as u64)?;
                    output.extend_from_slice(bytes);
                }
            }
            SExp::Pair(first, rest) => {
                output.push(CONS_MARKER);
                pending.push(rest);
                pending.push(first);
            }
        }
    }
    Ok(output)
}
