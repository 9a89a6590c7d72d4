use crate::allocator::{Allocator, NodePtr};
use crate::error::EvalErr;
use crate::serde::CONS_MARKER;

enum ParseOp {
    SExp,
    Cons,
}

struct Parser<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    fn next_byte(&mut self) -> Result<u8, EvalErr> {
        let byte = *self.input.get(self.position).ok_or(EvalErr::TruncatedInput)?;
        self.position += 1;
        Ok(byte)
    }

    fn next_slice(&mut self, length: usize) -> Result<&'a [u8], EvalErr> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(EvalErr::TruncatedInput)?;
        let slice = self
            .input
            .get(self.position..end)
            .ok_or(EvalErr::TruncatedInput)?;
        self.position = end;
        Ok(slice)
    }

    /// Parse the extended length prefix started by `tag`. The decoded length
    /// must not fit a shorter prefix, so each atom has exactly one accepted
    /// byte form.
    fn decode_size(&mut self, tag: u8) -> Result<u64, EvalErr> {
        let (extra_bytes, tag_bits, minimum) = match tag {
            0xC0..=0xDF => (1, u64::from(tag & 0x1F), 0x40),
            0xE0..=0xEF => (2, u64::from(tag & 0x0F), 0x2000),
            0xF0..=0xF7 => (3, u64::from(tag & 0x07), 0x10_0000),
            0xF8..=0xFB => (4, u64::from(tag & 0x03), 0x800_0000),
            _ => return Err(EvalErr::InvalidEncoding("invalid tag byte")),
        };
        let mut size = tag_bits;
        for _ in 0..extra_bytes {
            size = (size << 8) | u64::from(self.next_byte()?);
        }
        if size < minimum {
            return Err(EvalErr::InvalidEncoding("non-minimal length prefix"));
        }
        Ok(size)
    }

    fn parse_atom(&mut self, a: &mut Allocator, tag: u8) -> Result<NodePtr, EvalErr> {
        match tag {
            0x00..=0x7F => a.new_atom(&[tag]),
            0x80 => Ok(a.nil()),
            0x81..=0xBF => {
                let length = usize::from(tag & 0x3F);
                let bytes = self.next_slice(length)?;
                if length == 1 && bytes[0] <= 0x7F {
                    // has the shorter immediate form
                    return Err(EvalErr::InvalidEncoding("non-minimal atom encoding"));
                }
                a.new_atom(bytes)
            }
            _ => {
                let length = self.decode_size(tag)?;
                let bytes = self.next_slice(length as usize)?;
                a.new_atom(bytes)
            }
        }
    }
}

/// Deserialize one value from the front of `input`, returning the node and
/// the number of bytes consumed.
pub fn node_from_stream(a: &mut Allocator, input: &[u8]) -> Result<(NodePtr, usize), EvalErr> {
    let mut parser = Parser { input, position: 0 };
    let mut values: Vec<NodePtr> = Vec::new();
    let mut ops = vec![ParseOp::SExp];
    while let Some(op) = ops.pop() {
        match op {
            ParseOp::SExp => {
                let tag = parser.next_byte()?;
                if tag == CONS_MARKER {
                    ops.push(ParseOp::Cons);
                    ops.push(ParseOp::SExp);
                    ops.push(ParseOp::SExp);
                } else {
                    values.push(parser.parse_atom(a, tag)?);
                }
            }
            ParseOp::Cons => {
                // the stream encodes first then rest, so rest is on top
                let rest = values.pop().ok_or(EvalErr::TruncatedInput)?;
                let first = values.pop().ok_or(EvalErr::TruncatedInput)?;
                values.push(a.new_pair(first, rest)?);
            }
        }
    }
    let node = values.pop().ok_or(EvalErr::TruncatedInput)?;
    Ok((node, parser.position))
}

/// Deserialize exactly one value from `input`. Trailing bytes are rejected.
pub fn node_from_bytes(a: &mut Allocator, input: &[u8]) -> Result<NodePtr, EvalErr> {
    let (node, consumed) = node_from_stream(a, input)?;
    if consumed != input.len() {
        return Err(EvalErr::InvalidEncoding("trailing bytes"));
    }
    Ok(node)
}
