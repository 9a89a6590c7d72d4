use crate::{tree_hash_atom, tree_hash_pair, TreeHash};

/// The tree hash of `curry(program, args)` computed from the component
/// hashes alone, without building the curried program.
pub fn curry_tree_hash(program_hash: TreeHash, arg_hashes: &[TreeHash]) -> TreeHash {
    let nil = tree_hash_atom(&[]);
    let op_q = tree_hash_atom(&[1]);
    let op_a = tree_hash_atom(&[2]);
    let op_c = tree_hash_atom(&[4]);

    let quoted_program = tree_hash_pair(op_q, program_hash);
    let mut env = tree_hash_atom(&[1]);

    for &arg_hash in arg_hashes.iter().rev() {
        let quoted_arg = tree_hash_pair(op_q, arg_hash);
        let terminated = tree_hash_pair(env, nil);
        let terminated = tree_hash_pair(quoted_arg, terminated);
        env = tree_hash_pair(op_c, terminated);
    }

    let terminated = tree_hash_pair(env, nil);
    let program_and_env = tree_hash_pair(quoted_program, terminated);
    tree_hash_pair(op_a, program_and_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{curry, tree_hash};
    use sxp_vm::Allocator;

    #[test]
    fn test_equivalence() {
        let mut a = Allocator::new();
        let program = a.new_small_number(2).unwrap();
        let arg1 = a.new_small_number(5).unwrap();
        let arg2 = a.new_small_number(8).unwrap();
        let curried = curry(&mut a, program, &[arg1, arg2]).unwrap();

        let expected = tree_hash(&a, curried);

        let program_hash = tree_hash(&a, program);
        let arg1_hash = tree_hash(&a, arg1);
        let arg2_hash = tree_hash(&a, arg2);
        let actual = curry_tree_hash(program_hash, &[arg1_hash, arg2_hash]);

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_no_args() {
        let mut a = Allocator::new();
        let program = a.new_atom(b"prog").unwrap();
        let curried = curry(&mut a, program, &[]).unwrap();
        assert_eq!(
            tree_hash(&a, curried),
            curry_tree_hash(tree_hash(&a, program), &[])
        );
    }
}
