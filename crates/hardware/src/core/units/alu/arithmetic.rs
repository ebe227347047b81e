//! ALU arithmetic operations.
//!
//! Single-cycle add/subtract/compare live in [`execute`]. The M-extension multiply and divide
//! family lives in [`muldiv`]; it is evaluated by the multi-cycle multiplier and divider models,
//! never by Execute directly.
//!
//! All 32-bit (W) results are sign-extended from bit 31 to 64 bits.

use crate::isa::opcode::Opcode;

/// Number of bits in XLEN for RV64 (used for high-multiply shift).
const XLEN_BITS: u32 = 64;

/// Executes a single-cycle arithmetic or compare operation.
///
/// Returns `0` for tags outside this group.
pub fn execute(op: Opcode, a: u64, b: u64) -> u64 {
    match op {
        Opcode::Add | Opcode::Addi => a.wrapping_add(b),
        Opcode::Addw | Opcode::Addiw => (a as i32).wrapping_add(b as i32) as i64 as u64,
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Subw => (a as i32).wrapping_sub(b as i32) as i64 as u64,
        Opcode::Slt | Opcode::Slti => u64::from((a as i64) < (b as i64)),
        Opcode::Sltu | Opcode::Sltiu => u64::from(a < b),
        _ => 0,
    }
}

/// Executes a multiply, divide or remainder operation.
///
/// Division by zero yields all ones for the quotient and the dividend for the remainder;
/// signed overflow wraps. Returns `0` for tags outside the M extension.
pub fn muldiv(op: Opcode, a: u64, b: u64) -> u64 {
    match op {
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::Mulw => (a as i32).wrapping_mul(b as i32) as i64 as u64,
        // Both operands signed: sign-extend through i64 so negative values survive.
        Opcode::Mulh => (((a as i64 as i128) * (b as i64 as i128)) >> XLEN_BITS) as u64,
        Opcode::Mulhsu => (((a as i64 as i128) * (b as u128 as i128)) >> XLEN_BITS) as u64,
        Opcode::Mulhu => ((u128::from(a) * u128::from(b)) >> XLEN_BITS) as u64,
        Opcode::Div => {
            if b == 0 {
                u64::MAX
            } else {
                (a as i64).wrapping_div(b as i64) as u64
            }
        }
        Opcode::Divu => a.checked_div(b).unwrap_or(u64::MAX),
        Opcode::Divw => {
            if b as i32 == 0 {
                u64::MAX
            } else {
                (a as i32).wrapping_div(b as i32) as i64 as u64
            }
        }
        Opcode::Divuw => match (a as u32).checked_div(b as u32) {
            Some(q) => q as i32 as i64 as u64,
            None => u64::MAX,
        },
        Opcode::Rem => {
            if b == 0 {
                a
            } else {
                (a as i64).wrapping_rem(b as i64) as u64
            }
        }
        Opcode::Remu => a.checked_rem(b).unwrap_or(a),
        // Division by zero returns dividend[31:0] sign-extended.
        Opcode::Remw => {
            if b as i32 == 0 {
                a as i32 as i64 as u64
            } else {
                (a as i32).wrapping_rem(b as i32) as i64 as u64
            }
        }
        Opcode::Remuw => {
            let r = (a as u32).checked_rem(b as u32).unwrap_or(a as u32);
            r as i32 as i64 as u64
        }
        _ => 0,
    }
}
