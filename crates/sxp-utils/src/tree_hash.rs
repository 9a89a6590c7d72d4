use std::fmt;
use std::ops::Deref;

use sha2::{Digest, Sha256};
use sxp_vm::{Allocator, NodePtr, SExp};

/// The content digest of a value. Atom and pair hashes are tag-separated, so
/// the digest depends only on the value's structure, never on how it was
/// written or encoded.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeHash([u8; 32]);

impl TreeHash {
    pub const fn new(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub const fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeHash({self})")
    }
}

impl fmt::Display for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for TreeHash {
    fn from(hash: [u8; 32]) -> Self {
        Self::new(hash)
    }
}

impl From<TreeHash> for [u8; 32] {
    fn from(hash: TreeHash) -> [u8; 32] {
        hash.0
    }
}

impl AsRef<[u8]> for TreeHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for TreeHash {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn tree_hash_atom(bytes: &[u8]) -> TreeHash {
    let mut hasher = Sha256::new();
    hasher.update([1]);
    hasher.update(bytes);
    TreeHash::new(hasher.finalize().into())
}

pub fn tree_hash_pair(first: TreeHash, rest: TreeHash) -> TreeHash {
    let mut hasher = Sha256::new();
    hasher.update([2]);
    hasher.update(first);
    hasher.update(rest);
    TreeHash::new(hasher.finalize().into())
}

enum TreeOp {
    SExp(NodePtr),
    Cons,
}

/// Hash a whole tree without host-stack recursion.
pub fn tree_hash(a: &Allocator, node: NodePtr) -> TreeHash {
    let mut hashes = Vec::new();
    let mut ops = vec![TreeOp::SExp(node)];

    while let Some(op) = ops.pop() {
        match op {
            TreeOp::SExp(node) => match a.sexp(node) {
                SExp::Atom => {
                    hashes.push(tree_hash_atom(a.atom(node)));
                }
                SExp::Pair(first, rest) => {
                    ops.push(TreeOp::Cons);
                    ops.push(TreeOp::SExp(first));
                    ops.push(TreeOp::SExp(rest));
                }
            },
            TreeOp::Cons => {
                let first = hashes.pop().unwrap();
                let rest = hashes.pop().unwrap();
                hashes.push(tree_hash_pair(first, rest));
            }
        }
    }

    assert!(hashes.len() == 1);
    hashes[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;

    #[test]
    fn test_tree_hash_atom() {
        // sha256(0x01)
        assert_eq!(
            tree_hash_atom(&[]).to_bytes(),
            hex!("4bf5122f344554c53bde2ebb8cd2b7e3d1600ad631c385a5d7cce23c7785459a")
        );
    }

    #[test]
    fn test_tag_separation() {
        // an atom and the pair of two empty atoms must never collide
        let mut a = Allocator::new();
        let nil = a.nil();
        let pair = a.new_pair(nil, nil).unwrap();
        assert_ne!(tree_hash(&a, nil), tree_hash(&a, pair));
    }

    #[test]
    fn test_structural_determinism() {
        let mut a = Allocator::new();
        let x1 = a.new_atom(b"x").unwrap();
        let y1 = a.new_atom(b"y").unwrap();
        let p1 = a.new_pair(x1, y1).unwrap();

        let mut b = Allocator::new();
        let x2 = b.new_atom(b"x").unwrap();
        let y2 = b.new_atom(b"y").unwrap();
        let p2 = b.new_pair(x2, y2).unwrap();

        assert_eq!(tree_hash(&a, p1), tree_hash(&b, p2));
        assert_eq!(
            tree_hash(&a, p1),
            tree_hash_pair(tree_hash_atom(b"x"), tree_hash_atom(b"y"))
        );
    }

    #[test]
    fn test_deep_tree() {
        let mut a = Allocator::new();
        let mut node = a.nil();
        for _ in 0..100_000 {
            node = a.new_pair(node, NodePtr::NIL).unwrap();
        }
        // must not overflow the host stack
        let _ = tree_hash(&a, node);
    }

    #[test]
    fn test_display() {
        let hash = tree_hash_atom(&[]);
        assert_eq!(
            hash.to_string(),
            "4bf5122f344554c53bde2ebb8cd2b7e3d1600ad631c385a5d7cce23c7785459a"
        );
    }
}
