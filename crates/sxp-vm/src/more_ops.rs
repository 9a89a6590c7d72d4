use num_bigint::{BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};
use sha2::{Digest, Sha256};

use crate::allocator::{Allocator, NodePtr, SExp};
use crate::cost::{
    Cost, ARITH_BASE_COST, ARITH_COST_PER_ARG, ARITH_COST_PER_BYTE, ASHIFT_BASE_COST,
    ASHIFT_COST_PER_BYTE, BOOL_BASE_COST, BOOL_COST_PER_ARG, CONCAT_BASE_COST,
    CONCAT_COST_PER_ARG, CONCAT_COST_PER_BYTE, DIVMOD_BASE_COST, DIVMOD_COST_PER_BYTE,
    DIV_BASE_COST, DIV_COST_PER_BYTE, GR_BASE_COST, GR_BYTES_BASE_COST, GR_BYTES_COST_PER_BYTE,
    GR_COST_PER_BYTE, LOGNOT_BASE_COST, LOGNOT_COST_PER_BYTE, LOG_BASE_COST, LOG_COST_PER_ARG,
    LOG_COST_PER_BYTE, LSHIFT_BASE_COST, LSHIFT_COST_PER_BYTE, MUL_BASE_COST, MUL_COST_PER_OP,
    MUL_LINEAR_COST_PER_BYTE, MUL_SQUARE_COST_PER_BYTE_DIVIDER, SHA256_BASE_COST,
    SHA256_COST_PER_ARG, SHA256_COST_PER_BYTE, STRLEN_BASE_COST, STRLEN_COST_PER_BYTE,
    SUBSTR_BASE_COST,
};
use crate::error::EvalErr;
use crate::number::Number;
use crate::op_utils::{atom, check_cost, get_args, malloc_cost, node_from_bool, truthy};
use crate::reduction::{Reduction, Response};

/// Walk a proper operand list of atoms, decoding each as a number and
/// charging the per-argument and per-byte costs as it goes.
fn int_args(
    a: &Allocator,
    mut args: NodePtr,
    op: &'static str,
    cost: &mut Cost,
    cost_per_arg: Cost,
    cost_per_byte: Cost,
    max_cost: Cost,
) -> Result<Vec<Number>, EvalErr> {
    let mut numbers = Vec::new();
    while let SExp::Pair(first, rest) = a.sexp(args) {
        let bytes = atom(a, first, op)?;
        *cost += cost_per_arg + bytes.len() as Cost * cost_per_byte;
        check_cost(*cost, max_cost)?;
        numbers.push(a.number(first));
        args = rest;
    }
    Ok(numbers)
}

fn number_bytes(n: &Number) -> Cost {
    (n.bits() + 7) / 8
}

pub fn op_add(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = ARITH_BASE_COST;
    let numbers = int_args(
        a,
        input,
        "int arguments for +",
        &mut cost,
        ARITH_COST_PER_ARG,
        ARITH_COST_PER_BYTE,
        max_cost,
    )?;
    let total: Number = numbers.into_iter().sum();
    let node = a.new_number(&total)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_subtract(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = ARITH_BASE_COST;
    let numbers = int_args(
        a,
        input,
        "int arguments for -",
        &mut cost,
        ARITH_COST_PER_ARG,
        ARITH_COST_PER_BYTE,
        max_cost,
    )?;
    let mut iter = numbers.into_iter();
    let total = match iter.next() {
        None => Number::zero(),
        Some(first) => iter.fold(first, |acc, n| acc - n),
    };
    let node = a.new_number(&total)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_multiply(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = MUL_BASE_COST;
    let mut args = input;
    let mut total: Option<Number> = None;
    while let SExp::Pair(first, rest) = a.sexp(args) {
        atom(a, first, "int arguments for *")?;
        let operand = a.number(first);
        total = Some(match total {
            None => operand,
            Some(acc) => {
                let lhs_size = number_bytes(&acc);
                let rhs_size = number_bytes(&operand);
                cost += MUL_COST_PER_OP
                    + (lhs_size + rhs_size) * MUL_LINEAR_COST_PER_BYTE
                    + (lhs_size * rhs_size) / MUL_SQUARE_COST_PER_BYTE_DIVIDER;
                check_cost(cost, max_cost)?;
                acc * operand
            }
        });
        args = rest;
    }
    let total = total.unwrap_or_else(|| Number::from(1));
    let node = a.new_number(&total)?;
    Ok(malloc_cost(a, cost, node))
}

/// Floor division and remainder, matching the sign convention of the
/// divisor (remainder is zero or has the divisor's sign).
fn floor_divmod(numerator: &Number, divisor: &Number) -> Result<(Number, Number), EvalErr> {
    if divisor.is_zero() {
        return Err(EvalErr::DivisionByZero);
    }
    let mut quotient = numerator / divisor;
    let mut remainder = numerator - &quotient * divisor;
    if !remainder.is_zero() && (remainder.is_negative() != divisor.is_negative()) {
        quotient -= 1;
        remainder += divisor;
    }
    Ok((quotient, remainder))
}

pub fn op_div(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [numerator, divisor] = get_args::<2>(a, input, "/")?;
    let numerator_len = atom(a, numerator, "int arguments for /")?.len();
    let divisor_len = atom(a, divisor, "int arguments for /")?.len();
    let cost = DIV_BASE_COST + (numerator_len + divisor_len) as Cost * DIV_COST_PER_BYTE;
    let (quotient, _) = floor_divmod(&a.number(numerator), &a.number(divisor))?;
    let node = a.new_number(&quotient)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_divmod(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [numerator, divisor] = get_args::<2>(a, input, "divmod")?;
    let numerator_len = atom(a, numerator, "int arguments for divmod")?.len();
    let divisor_len = atom(a, divisor, "int arguments for divmod")?.len();
    let cost = DIVMOD_BASE_COST + (numerator_len + divisor_len) as Cost * DIVMOD_COST_PER_BYTE;
    let (quotient, remainder) = floor_divmod(&a.number(numerator), &a.number(divisor))?;
    let quotient = a.new_number(&quotient)?;
    let remainder = a.new_number(&remainder)?;
    let malloc = (a.atom_len(quotient) + a.atom_len(remainder)) as Cost
        * crate::cost::MALLOC_COST_PER_BYTE;
    let pair = a.new_pair(quotient, remainder)?;
    Ok(Reduction(cost + malloc, pair))
}

pub fn op_gr(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [lhs, rhs] = get_args::<2>(a, input, ">")?;
    let lhs_len = atom(a, lhs, "int arguments for >")?.len();
    let rhs_len = atom(a, rhs, "int arguments for >")?.len();
    let cost = GR_BASE_COST + (lhs_len + rhs_len) as Cost * GR_COST_PER_BYTE;
    let result = node_from_bool(a, a.number(lhs) > a.number(rhs));
    Ok(Reduction(cost, result))
}

pub fn op_gr_bytes(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [lhs, rhs] = get_args::<2>(a, input, ">s")?;
    let lhs_bytes = atom(a, lhs, "atom arguments for >s")?;
    let rhs_bytes = atom(a, rhs, "atom arguments for >s")?;
    let cost =
        GR_BYTES_BASE_COST + (lhs_bytes.len() + rhs_bytes.len()) as Cost * GR_BYTES_COST_PER_BYTE;
    let greater = lhs_bytes > rhs_bytes;
    Ok(Reduction(cost, node_from_bool(a, greater)))
}

pub fn op_sha256(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = SHA256_BASE_COST;
    let mut hasher = Sha256::new();
    let mut args = input;
    while let SExp::Pair(first, rest) = a.sexp(args) {
        let bytes = atom(a, first, "atom arguments for sha256")?;
        cost += SHA256_COST_PER_ARG + bytes.len() as Cost * SHA256_COST_PER_BYTE;
        check_cost(cost, max_cost)?;
        hasher.update(bytes);
        args = rest;
    }
    let digest: [u8; 32] = hasher.finalize().into();
    let node = a.new_atom(&digest)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_strlen(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [node] = get_args::<1>(a, input, "strlen")?;
    let length = atom(a, node, "atom argument for strlen")?.len();
    let cost = STRLEN_BASE_COST + length as Cost * STRLEN_COST_PER_BYTE;
    let result = a.new_small_number(length as u64)?;
    Ok(malloc_cost(a, cost, result))
}

pub fn op_substr(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    // 2 or 3 operands: (substr value start) takes the tail from start
    let ([value, start], end) = match get_args::<3>(a, input, "substr") {
        Ok([value, start, end]) => ([value, start], Some(end)),
        Err(_) => (get_args::<2>(a, input, "substr")?, None),
    };
    let length = atom(a, value, "atom argument for substr")?.len();
    let start = index_arg(a, start, length)?;
    let end = match end {
        Some(end) => index_arg(a, end, length)?,
        None => length,
    };
    if start > end {
        return Err(EvalErr::InvalidIndex);
    }
    let slice = a.atom(value)[start..end].to_vec();
    let node = a.new_atom(&slice)?;
    Ok(Reduction(SUBSTR_BASE_COST, node))
}

fn index_arg(a: &Allocator, node: NodePtr, length: usize) -> Result<usize, EvalErr> {
    atom(a, node, "int index for substr")?;
    let index = a.small_number(node).ok_or(EvalErr::InvalidIndex)?;
    if index as usize > length {
        return Err(EvalErr::InvalidIndex);
    }
    Ok(index as usize)
}

pub fn op_concat(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = CONCAT_BASE_COST;
    let mut output = Vec::new();
    let mut args = input;
    while let SExp::Pair(first, rest) = a.sexp(args) {
        let bytes = atom(a, first, "atom arguments for concat")?;
        cost += CONCAT_COST_PER_ARG + bytes.len() as Cost * CONCAT_COST_PER_BYTE;
        check_cost(cost, max_cost)?;
        output.extend_from_slice(bytes);
        args = rest;
    }
    let node = a.new_atom(&output)?;
    Ok(malloc_cost(a, cost, node))
}

/// Decode a shift count, limited to ±65535 bits.
fn shift_count(a: &Allocator, node: NodePtr, op: &'static str) -> Result<i64, EvalErr> {
    atom(a, node, op)?;
    let count = a.number(node).to_i64().ok_or(EvalErr::ShiftTooLarge)?;
    if count.unsigned_abs() > 65535 {
        return Err(EvalErr::ShiftTooLarge);
    }
    Ok(count)
}

pub fn op_ash(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [value, count] = get_args::<2>(a, input, "ash")?;
    let value_len = atom(a, value, "int arguments for ash")?.len();
    let count = shift_count(a, count, "int arguments for ash")?;
    let number = a.number(value);
    let shifted = if count >= 0 {
        number << count as usize
    } else {
        number >> count.unsigned_abs() as usize
    };
    let cost = ASHIFT_BASE_COST + value_len as Cost * ASHIFT_COST_PER_BYTE;
    let node = a.new_number(&shifted)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_lsh(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [value, count] = get_args::<2>(a, input, "lsh")?;
    let bytes = atom(a, value, "atom arguments for lsh")?;
    let value_len = bytes.len();
    // the operand is reinterpreted as an unsigned integer
    let unsigned = BigUint::from_bytes_be(bytes);
    let count = shift_count(a, count, "int arguments for lsh")?;
    let shifted = if count >= 0 {
        unsigned << count as usize
    } else {
        unsigned >> count.unsigned_abs() as usize
    };
    let cost = LSHIFT_BASE_COST + value_len as Cost * LSHIFT_COST_PER_BYTE;
    let node = a.new_number(&Number::from_biguint(Sign::Plus, shifted))?;
    Ok(malloc_cost(a, cost, node))
}

fn logic_op(
    a: &mut Allocator,
    input: NodePtr,
    op: &'static str,
    initial: Number,
    fold: fn(Number, Number) -> Number,
    max_cost: Cost,
) -> Response {
    let mut cost = LOG_BASE_COST;
    let numbers = int_args(
        a,
        input,
        op,
        &mut cost,
        LOG_COST_PER_ARG,
        LOG_COST_PER_BYTE,
        max_cost,
    )?;
    let total = numbers.into_iter().fold(initial, fold);
    let node = a.new_number(&total)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_logand(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    logic_op(
        a,
        input,
        "int arguments for logand",
        Number::from(-1),
        |acc, n| acc & n,
        max_cost,
    )
}

pub fn op_logior(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    logic_op(
        a,
        input,
        "int arguments for logior",
        Number::zero(),
        |acc, n| acc | n,
        max_cost,
    )
}

pub fn op_logxor(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    logic_op(
        a,
        input,
        "int arguments for logxor",
        Number::zero(),
        |acc, n| acc ^ n,
        max_cost,
    )
}

pub fn op_lognot(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [value] = get_args::<1>(a, input, "lognot")?;
    let value_len = atom(a, value, "int argument for lognot")?.len();
    let result = -(a.number(value) + Number::from(1));
    let cost = LOGNOT_BASE_COST + value_len as Cost * LOGNOT_COST_PER_BYTE;
    let node = a.new_number(&result)?;
    Ok(malloc_cost(a, cost, node))
}

pub fn op_not(a: &mut Allocator, input: NodePtr, _max_cost: Cost) -> Response {
    let [value] = get_args::<1>(a, input, "not")?;
    let result = node_from_bool(a, !truthy(a, value));
    Ok(Reduction(BOOL_BASE_COST, result))
}

pub fn op_any(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = BOOL_BASE_COST;
    let mut result = false;
    let mut args = input;
    while let SExp::Pair(first, rest) = a.sexp(args) {
        cost += BOOL_COST_PER_ARG;
        check_cost(cost, max_cost)?;
        result = result || truthy(a, first);
        args = rest;
    }
    Ok(Reduction(cost, node_from_bool(a, result)))
}

pub fn op_all(a: &mut Allocator, input: NodePtr, max_cost: Cost) -> Response {
    let mut cost = BOOL_BASE_COST;
    let mut result = true;
    let mut args = input;
    while let SExp::Pair(first, rest) = a.sexp(args) {
        cost += BOOL_COST_PER_ARG;
        check_cost(cost, max_cost)?;
        result = result && truthy(a, first);
        args = rest;
    }
    Ok(Reduction(cost, node_from_bool(a, result)))
}
