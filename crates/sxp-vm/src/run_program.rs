use crate::allocator::{Allocator, NodePtr, SExp};
use crate::core_ops::{op_cons, op_eq, op_first, op_if, op_listp, op_raise, op_rest};
use crate::cost::{
    Cost, APPLY_COST, PATH_LOOKUP_BASE_COST, PATH_LOOKUP_COST_PER_LEG,
    PATH_LOOKUP_COST_PER_ZERO_BYTE, QUOTE_COST,
};
use crate::error::EvalErr;
use crate::more_ops::{
    op_add, op_all, op_any, op_ash, op_concat, op_div, op_divmod, op_gr, op_gr_bytes, op_logand,
    op_logior, op_logxor, op_lognot, op_lsh, op_multiply, op_not, op_sha256, op_strlen, op_substr,
    op_subtract,
};
use crate::op_utils::{check_cost, get_args, hex_of, nilp};
use crate::reduction::{Reduction, Response};

const OP_QUOTE: u32 = 1;
const OP_APPLY: u32 = 2;

/// Dispatch an operator code over an already-built operand list. Quote and
/// apply never reach this table; they are handled in the machine.
fn dispatch_op(a: &mut Allocator, op_code: u32, args: NodePtr, max_cost: Cost) -> Response {
    let f = match op_code {
        3 => op_if,
        4 => op_cons,
        5 => op_first,
        6 => op_rest,
        7 => op_listp,
        8 => op_raise,
        9 => op_eq,
        10 => op_gr_bytes,
        11 => op_sha256,
        12 => op_substr,
        13 => op_strlen,
        14 => op_concat,
        16 => op_add,
        17 => op_subtract,
        18 => op_multiply,
        19 => op_div,
        20 => op_divmod,
        21 => op_gr,
        22 => op_ash,
        23 => op_lsh,
        24 => op_logand,
        25 => op_logior,
        26 => op_logxor,
        27 => op_lognot,
        32 => op_not,
        33 => op_any,
        34 => op_all,
        _ => return Err(EvalErr::UnknownOperator(format!("{op_code}"))),
    };
    f(a, args, max_cost)
}

/// Read an operator atom as a code. Codes are canonically encoded unsigned
/// integers of at most four bytes; anything else is unknown.
fn opcode_from_atom(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 4 || bytes[0] == 0 {
        return None;
    }
    let mut code = 0u32;
    for &byte in bytes {
        code = (code << 8) | u32::from(byte);
    }
    Some(code)
}

/// Resolve an atom as a path into the environment tree. The bits of the path
/// are walked from the least-significant end; the most-significant set bit
/// terminates the walk. A zero bit descends into `first`, a one bit into
/// `rest`. The all-zero path resolves to nil.
fn traverse_path(a: &Allocator, path: &[u8], env: NodePtr) -> Response {
    let mut cost = PATH_LOOKUP_BASE_COST + PATH_LOOKUP_COST_PER_LEG;

    let mut first_bit_byte_index = 0;
    while first_bit_byte_index < path.len() && path[first_bit_byte_index] == 0 {
        first_bit_byte_index += 1;
    }
    cost += first_bit_byte_index as Cost * PATH_LOOKUP_COST_PER_ZERO_BYTE;
    if first_bit_byte_index == path.len() {
        return Ok(Reduction(cost, NodePtr::NIL));
    }

    // the most significant set bit is a marker, not a direction
    let mut last_bitmask = 0x80;
    while path[first_bit_byte_index] & last_bitmask == 0 {
        last_bitmask >>= 1;
    }

    let mut node = env;
    let mut byte_index = path.len() - 1;
    let mut bitmask = 0x01;
    while byte_index > first_bit_byte_index || bitmask < last_bitmask {
        let SExp::Pair(first, rest) = a.sexp(node) else {
            return Err(EvalErr::PathNotFound);
        };
        node = if path[byte_index] & bitmask == 0 {
            first
        } else {
            rest
        };
        cost += PATH_LOOKUP_COST_PER_LEG;
        if bitmask == 0x80 {
            bitmask = 0x01;
            byte_index -= 1;
        } else {
            bitmask <<= 1;
        }
    }
    Ok(Reduction(cost, node))
}

enum Operation {
    /// Reduce `program` against `env` and leave the result on the value
    /// stack.
    Eval { program: NodePtr, env: NodePtr },
    /// Pop `argument_count` evaluated operands, rebuild them as a list and
    /// apply the operator.
    Apply {
        op: NodePtr,
        argument_count: usize,
    },
}

struct RunProgramContext<'a> {
    allocator: &'a mut Allocator,
    op_stack: Vec<Operation>,
    val_stack: Vec<NodePtr>,
    cost: Cost,
    max_cost: Cost,
}

impl RunProgramContext<'_> {
    fn charge(&mut self, cost: Cost) -> Result<(), EvalErr> {
        self.cost += cost;
        check_cost(self.cost, self.max_cost)
    }

    fn remaining_cost(&self) -> Cost {
        self.max_cost - self.cost
    }

    /// One reduction step for a pending program/environment pair.
    fn eval(&mut self, program: NodePtr, env: NodePtr) -> Result<(), EvalErr> {
        let a = &mut *self.allocator;
        match a.sexp(program) {
            SExp::Atom => {
                let Reduction(cost, node) = traverse_path(a, a.atom(program), env)?;
                self.val_stack.push(node);
                self.charge(cost)
            }
            SExp::Pair(op_node, operand_list) => match a.sexp(op_node) {
                SExp::Pair(inner, inner_rest) => {
                    // the ((n) . rest) form: a lone atom operator applied to
                    // its unevaluated operands
                    if inner.is_pair() || !nilp(a, inner_rest) {
                        return Err(EvalErr::NotApplicable);
                    }
                    self.apply(inner, operand_list)
                }
                SExp::Atom => {
                    if a.atom(op_node) == [OP_QUOTE as u8] {
                        self.val_stack.push(operand_list);
                        return self.charge(QUOTE_COST);
                    }
                    let mut operands = Vec::new();
                    let mut rest = operand_list;
                    while let SExp::Pair(first, tail) = a.sexp(rest) {
                        operands.push(first);
                        rest = tail;
                    }
                    if !nilp(a, rest) {
                        return Err(EvalErr::WrongValueKind("proper operand list"));
                    }
                    self.op_stack.push(Operation::Apply {
                        op: op_node,
                        argument_count: operands.len(),
                    });
                    // leftmost operand must be evaluated first, so it is
                    // pushed last
                    for &operand in operands.iter().rev() {
                        self.op_stack.push(Operation::Eval {
                            program: operand,
                            env,
                        });
                    }
                    self.charge(1)
                }
            },
        }
    }

    /// Apply an operator atom to an operand list node.
    fn apply(&mut self, op_node: NodePtr, operand_list: NodePtr) -> Result<(), EvalErr> {
        let op_code = opcode_from_atom(self.allocator.atom(op_node));
        match op_code {
            Some(OP_APPLY) => {
                let [program, env] = get_args::<2>(self.allocator, operand_list, "a")?;
                self.op_stack.push(Operation::Eval { program, env });
                self.charge(APPLY_COST)
            }
            Some(code) if code != OP_QUOTE => {
                let max_cost = self.remaining_cost();
                let Reduction(cost, node) =
                    dispatch_op(self.allocator, code, operand_list, max_cost)?;
                self.val_stack.push(node);
                self.charge(cost)
            }
            _ => Err(EvalErr::UnknownOperator(hex_of(
                self.allocator.atom(op_node),
            ))),
        }
    }
}

/// Reduce `program` against the environment `env`, spending at most
/// `max_cost`. The work stack is explicit, so arbitrarily deep programs
/// cannot exhaust the host call stack.
pub fn run_program(
    a: &mut Allocator,
    program: NodePtr,
    env: NodePtr,
    max_cost: Cost,
) -> Response {
    let mut context = RunProgramContext {
        allocator: a,
        op_stack: vec![Operation::Eval { program, env }],
        val_stack: Vec::new(),
        cost: 0,
        max_cost,
    };

    while let Some(operation) = context.op_stack.pop() {
        match operation {
            Operation::Eval { program, env } => context.eval(program, env)?,
            Operation::Apply {
                op,
                argument_count,
            } => {
                // evaluated operands sit on the value stack with the
                // rightmost on top
                let mut operand_list = context.allocator.nil();
                for _ in 0..argument_count {
                    let value = context
                        .val_stack
                        .pop()
                        .expect("value stack underflow");
                    operand_list = context.allocator.new_pair(value, operand_list)?;
                }
                context.apply(op, operand_list)?;
            }
        }
    }

    let value = context.val_stack.pop().expect("value stack underflow");
    Ok(Reduction(context.cost, value))
}
