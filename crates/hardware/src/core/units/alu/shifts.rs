//! ALU shift operations.
//!
//! Shift amounts are masked to 6 bits for RV64 forms and 5 bits for the W forms. W results are
//! sign-extended from bit 31.

use crate::isa::opcode::Opcode;

/// Bit mask for shift amount in RV64 (6 bits: 0-63).
const SHAMT_MASK_RV64: u64 = 0x3f;

/// Bit mask for shift amount in RV32 (5 bits: 0-31).
const SHAMT_MASK_RV32: u32 = 0x1f;

#[derive(Clone, Copy)]
enum Kind {
    Sll,
    Srl,
    Sra,
}

fn kind(op: Opcode) -> Option<Kind> {
    match op {
        Opcode::Sll | Opcode::Slli | Opcode::Sllw | Opcode::Slliw => Some(Kind::Sll),
        Opcode::Srl | Opcode::Srli | Opcode::Srlw | Opcode::Srliw => Some(Kind::Srl),
        Opcode::Sra | Opcode::Srai | Opcode::Sraw | Opcode::Sraiw => Some(Kind::Sra),
        _ => None,
    }
}

/// Executes a shift. `b` supplies the shift amount; upper bits are ignored.
///
/// Returns `0` for tags that are not shifts.
pub fn execute(op: Opcode, a: u64, b: u64) -> u64 {
    let Some(kind) = kind(op) else {
        return 0;
    };
    if op.info().rv32 {
        let sh = b as u32 & SHAMT_MASK_RV32;
        let r = match kind {
            Kind::Sll => (a as u32).wrapping_shl(sh),
            Kind::Srl => (a as u32).wrapping_shr(sh),
            Kind::Sra => ((a as i32) >> sh) as u32,
        };
        r as i32 as i64 as u64
    } else {
        let sh = (b & SHAMT_MASK_RV64) as u32;
        match kind {
            Kind::Sll => a.wrapping_shl(sh),
            Kind::Srl => a.wrapping_shr(sh),
            Kind::Sra => ((a as i64) >> sh) as u64,
        }
    }
}
