use std::fmt;

use crate::error::EvalErr;
use crate::number::{number_from_bytes, number_to_bytes, Number};

const PAIR_FLAG: u32 = 0x8000_0000;
const INDEX_MASK: u32 = 0x7FFF_FFFF;

/// A handle to a node in an [`Allocator`] arena. Handles are only meaningful
/// together with the allocator that produced them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodePtr(u32);

impl NodePtr {
    /// The empty atom, preallocated in every arena.
    pub const NIL: Self = Self(0);

    fn new_atom(index: usize) -> Self {
        Self(index as u32)
    }

    fn new_pair(index: usize) -> Self {
        Self(PAIR_FLAG | index as u32)
    }

    pub fn is_pair(self) -> bool {
        self.0 & PAIR_FLAG != 0
    }

    fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }
}

impl fmt::Debug for NodePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pair() {
            write!(f, "NodePtr(pair {})", self.index())
        } else {
            write!(f, "NodePtr(atom {})", self.index())
        }
    }
}

/// A view of a node: either an atom (bytes fetched with [`Allocator::atom`])
/// or a pair of child handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SExp {
    Atom,
    Pair(NodePtr, NodePtr),
}

#[derive(Clone, Copy)]
struct AtomBuf {
    start: u32,
    end: u32,
}

#[derive(Clone, Copy)]
struct PairBuf {
    first: NodePtr,
    rest: NodePtr,
}

/// Arena of immutable S-expression nodes. Nodes are built bottom-up, never
/// mutated, and only reference already-built children, so cycles cannot be
/// constructed and every tree is finite.
pub struct Allocator {
    u8_vec: Vec<u8>,
    atom_vec: Vec<AtomBuf>,
    pair_vec: Vec<PairBuf>,
    heap_limit: usize,
    atom_limit: usize,
    pair_limit: usize,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator {
    pub fn new() -> Self {
        Self::new_limited(u32::MAX as usize, INDEX_MASK as usize, INDEX_MASK as usize)
    }

    /// An arena with explicit limits on total atom bytes and node counts.
    pub fn new_limited(heap_limit: usize, atom_limit: usize, pair_limit: usize) -> Self {
        let mut allocator = Self {
            u8_vec: Vec::new(),
            atom_vec: Vec::new(),
            pair_vec: Vec::new(),
            heap_limit,
            atom_limit: atom_limit.min(INDEX_MASK as usize),
            pair_limit: pair_limit.min(INDEX_MASK as usize),
        };
        // index 0 is nil and index 1 is the one-byte atom 1, so `nil()` and
        // `one()` never allocate
        allocator.u8_vec.push(1);
        allocator.atom_vec.push(AtomBuf { start: 0, end: 0 });
        allocator.atom_vec.push(AtomBuf { start: 0, end: 1 });
        allocator
    }

    pub fn new_atom(&mut self, bytes: &[u8]) -> Result<NodePtr, EvalErr> {
        if self.u8_vec.len() + bytes.len() > self.heap_limit {
            return Err(EvalErr::OutOfMemory);
        }
        if self.atom_vec.len() >= self.atom_limit {
            return Err(EvalErr::TooManyAtoms);
        }
        let start = self.u8_vec.len() as u32;
        self.u8_vec.extend_from_slice(bytes);
        let end = self.u8_vec.len() as u32;
        let index = self.atom_vec.len();
        self.atom_vec.push(AtomBuf { start, end });
        Ok(NodePtr::new_atom(index))
    }

    pub fn new_pair(&mut self, first: NodePtr, rest: NodePtr) -> Result<NodePtr, EvalErr> {
        if self.pair_vec.len() >= self.pair_limit {
            return Err(EvalErr::TooManyPairs);
        }
        let index = self.pair_vec.len();
        self.pair_vec.push(PairBuf { first, rest });
        Ok(NodePtr::new_pair(index))
    }

    /// Allocate the minimal two's-complement encoding of `number`.
    pub fn new_number(&mut self, number: &Number) -> Result<NodePtr, EvalErr> {
        self.new_atom(&number_to_bytes(number))
    }

    /// Allocate the minimal encoding of a non-negative machine integer.
    pub fn new_small_number(&mut self, value: u64) -> Result<NodePtr, EvalErr> {
        if value == 0 {
            return Ok(self.nil());
        }
        if value == 1 {
            return Ok(self.one());
        }
        let bytes = value.to_be_bytes();
        let mut start = 0;
        while bytes[start] == 0 {
            start += 1;
        }
        // prepend a zero byte when the top bit is set, to keep the sign
        if bytes[start] & 0x80 != 0 {
            let mut padded = Vec::with_capacity(bytes.len() - start + 1);
            padded.push(0);
            padded.extend_from_slice(&bytes[start..]);
            self.new_atom(&padded)
        } else {
            self.new_atom(&bytes[start..])
        }
    }

    pub fn sexp(&self, node: NodePtr) -> SExp {
        if node.is_pair() {
            let PairBuf { first, rest } = self.pair_vec[node.index()];
            SExp::Pair(first, rest)
        } else {
            SExp::Atom
        }
    }

    /// The raw bytes of an atom node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a pair; callers check [`Allocator::sexp`] first.
    pub fn atom(&self, node: NodePtr) -> &[u8] {
        assert!(!node.is_pair(), "expected atom, got pair");
        let AtomBuf { start, end } = self.atom_vec[node.index()];
        &self.u8_vec[start as usize..end as usize]
    }

    pub fn atom_len(&self, node: NodePtr) -> usize {
        let AtomBuf { start, end } = self.atom_vec[node.index()];
        (end - start) as usize
    }

    /// Decode an atom as a signed big integer.
    pub fn number(&self, node: NodePtr) -> Number {
        number_from_bytes(self.atom(node))
    }

    /// Decode an atom as a canonically encoded non-negative `u64`, if it is
    /// one.
    pub fn small_number(&self, node: NodePtr) -> Option<u64> {
        let bytes = self.atom(node);
        if bytes.is_empty() {
            return Some(0);
        }
        if bytes[0] & 0x80 != 0 || (bytes[0] == 0 && (bytes.len() == 1 || bytes[1] & 0x80 == 0)) {
            // negative or non-minimal
            return None;
        }
        let digits = if bytes[0] == 0 { &bytes[1..] } else { bytes };
        if digits.len() > 8 {
            return None;
        }
        let mut value = 0u64;
        for &byte in digits {
            value = (value << 8) | u64::from(byte);
        }
        Some(value)
    }

    pub fn nil(&self) -> NodePtr {
        NodePtr::NIL
    }

    pub fn one(&self) -> NodePtr {
        NodePtr::new_atom(1)
    }

    /// Structural equality of two trees, without host-stack recursion.
    pub fn eq_tree(&self, lhs: NodePtr, rhs: NodePtr) -> bool {
        let mut pending = vec![(lhs, rhs)];
        while let Some((lhs, rhs)) = pending.pop() {
            match (self.sexp(lhs), self.sexp(rhs)) {
                (SExp::Atom, SExp::Atom) => {
                    if self.atom(lhs) != self.atom(rhs) {
                        return false;
                    }
                }
                (SExp::Pair(lf, lr), SExp::Pair(rf, rr)) => {
                    pending.push((lr, rr));
                    pending.push((lf, rf));
                }
                _ => return false,
            }
        }
        true
    }
}
