//! Instruction tags and the precomputed decode table.
//!
//! The external decoder classifies each instruction into one [`Opcode`]. Everything Execute
//! needs to know about a tag (encoding format, execution class, operand banks, memory-operation
//! shape) is looked up in a static table indexed by the tag, so classification stays a single
//! array access per cycle.
//!
//! The table also carries the fixed encoding bits of every instruction, which lets test benches
//! and the program loader build instruction words with [`Opcode::encode`].

use serde::{Deserialize, Serialize};

use crate::core::pipeline::signals::{MemopSize, MultiSlot};

const OP: u32 = 0x33;
const OP_IMM: u32 = 0x13;
const OP_32: u32 = 0x3B;
const OP_IMM_32: u32 = 0x1B;
const LOAD: u32 = 0x03;
const STORE: u32 = 0x23;
const BRANCH: u32 = 0x63;
const JAL: u32 = 0x6F;
const JALR: u32 = 0x67;
const LUI: u32 = 0x37;
const AUIPC: u32 = 0x17;
const SYSTEM: u32 = 0x73;
const MISC_MEM: u32 = 0x0F;
const AMO: u32 = 0x2F;
const LOAD_FP: u32 = 0x07;
const STORE_FP: u32 = 0x27;
const OP_FP: u32 = 0x53;

/// Instruction formats defined by the base ISA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IsaType {
    /// Register-register.
    R,
    /// Register-immediate, loads, `JALR`, system.
    I,
    /// Stores.
    S,
    /// Conditional branches.
    SB,
    /// Upper immediate.
    U,
    /// Unconditional jump.
    UJ,
}

/// How Execute resolves an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecClass {
    /// Add/sub, logic, compare, `LUI`, `AUIPC`.
    Alu,
    /// Logical and arithmetic shifts.
    Shift,
    /// Conditional branch.
    Branch,
    /// `JAL` and `JALR`.
    Jump,
    /// Integer or floating-point load.
    Load,
    /// Integer or floating-point store.
    Store,
    /// CSR read-modify-write.
    Csr,
    /// `URET`/`SRET`/`HRET`/`MRET`.
    TrapReturn,
    /// `FENCE` and `FENCE.I`.
    Fence,
    /// Wait for interrupt.
    Wfi,
    /// Environment call.
    Ecall,
    /// Software breakpoint.
    Ebreak,
    /// Integer multiplier.
    Mul,
    /// Integer divider.
    Div,
    /// Floating-point unit.
    Fpu,
    /// Atomic memory operation. Recognised by decode but not executed by this core.
    Atomic,
}

impl ExecClass {
    /// Multi-cycle slot the class dispatches to, if any.
    pub const fn slot(self) -> Option<MultiSlot> {
        match self {
            Self::Mul => Some(MultiSlot::Mul),
            Self::Div => Some(MultiSlot::Div),
            Self::Fpu => Some(MultiSlot::Fpu),
            _ => None,
        }
    }

    /// True for memory operations routed through the Memory-Access queue.
    pub const fn is_memop(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }
}

/// Static facts about one instruction tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Assembly mnemonic.
    pub mnemonic: &'static str,
    /// Encoding format.
    pub isa_type: IsaType,
    /// Execution class.
    pub class: ExecClass,
    /// Fixed encoding bits (major opcode, funct3, funct7 and any fixed fields).
    pub base: u32,
    /// 32-bit (W) variant.
    pub rv32: bool,
    /// Unsigned operands.
    pub unsigned: bool,
    /// Memory access size for loads and stores.
    pub memop_size: MemopSize,
    /// Loaded value is sign-extended.
    pub sign_ext: bool,
    /// Reads `rs1`.
    pub reads_rs1: bool,
    /// Reads `rs2`.
    pub reads_rs2: bool,
    /// Writes `rd`.
    pub writes_rd: bool,
    /// `rd` is a floating-point register.
    pub fp_rd: bool,
    /// `rs1` is a floating-point register.
    pub fp_rs1: bool,
    /// `rs2` is a floating-point register.
    pub fp_rs2: bool,
}

const fn enc(major: u32, funct3: u32, funct7: u32) -> u32 {
    (funct7 << 25) | (funct3 << 12) | major
}

const fn op(mnemonic: &'static str, isa_type: IsaType, class: ExecClass, base: u32) -> OpcodeInfo {
    let (reads_rs1, reads_rs2, writes_rd) = match isa_type {
        IsaType::R => (true, true, true),
        IsaType::I => (true, false, true),
        IsaType::S | IsaType::SB => (true, true, false),
        IsaType::U | IsaType::UJ => (false, false, true),
    };
    OpcodeInfo {
        mnemonic,
        isa_type,
        class,
        base,
        rv32: false,
        unsigned: false,
        memop_size: MemopSize::Double,
        sign_ext: false,
        reads_rs1,
        reads_rs2,
        writes_rd,
        fp_rd: false,
        fp_rs1: false,
        fp_rs2: false,
    }
}

impl OpcodeInfo {
    const fn w(mut self) -> Self {
        self.rv32 = true;
        self
    }

    const fn u(mut self) -> Self {
        self.unsigned = true;
        self
    }

    const fn mem(mut self, size: MemopSize, sign_ext: bool) -> Self {
        self.memop_size = size;
        self.sign_ext = sign_ext;
        self
    }

    const fn fp(mut self, rd: bool, rs1: bool, rs2: bool) -> Self {
        self.fp_rd = rd;
        self.fp_rs1 = rs1;
        self.fp_rs2 = rs2;
        self
    }

    const fn no_rs1(mut self) -> Self {
        self.reads_rs1 = false;
        self
    }

    const fn no_rs2(mut self) -> Self {
        self.reads_rs2 = false;
        self
    }

    const fn fixed(mut self) -> Self {
        self.reads_rs1 = false;
        self.reads_rs2 = false;
        self.writes_rd = false;
        self
    }

    /// True when every operand field is part of the fixed encoding.
    const fn is_fixed(&self) -> bool {
        matches!(
            self.class,
            ExecClass::Fence
                | ExecClass::Wfi
                | ExecClass::Ecall
                | ExecClass::Ebreak
                | ExecClass::TrapReturn
        )
    }
}

macro_rules! opcodes {
    ($($variant:ident => $mnemonic:literal, $info:expr;)*) => {
        /// Instruction tag produced by the decoder.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum Opcode {
            $(
                #[doc = $mnemonic]
                #[serde(rename = $mnemonic)]
                $variant,
            )*
        }

        impl Opcode {
            /// Every tag in table order.
            pub const ALL: [Self; Self::COUNT] = [$(Self::$variant,)*];
        }

        static OPCODE_TABLE: [OpcodeInfo; Opcode::COUNT] = [$($info,)*];
    };
}

use ExecClass as C;
use IsaType as T;
use MemopSize as Sz;

opcodes! {
    Add => "ADD", op("ADD", T::R, C::Alu, enc(OP, 0, 0));
    Addi => "ADDI", op("ADDI", T::I, C::Alu, enc(OP_IMM, 0, 0));
    Addiw => "ADDIW", op("ADDIW", T::I, C::Alu, enc(OP_IMM_32, 0, 0)).w();
    Addw => "ADDW", op("ADDW", T::R, C::Alu, enc(OP_32, 0, 0)).w();
    And => "AND", op("AND", T::R, C::Alu, enc(OP, 7, 0));
    Andi => "ANDI", op("ANDI", T::I, C::Alu, enc(OP_IMM, 7, 0));
    Auipc => "AUIPC", op("AUIPC", T::U, C::Alu, AUIPC);
    Beq => "BEQ", op("BEQ", T::SB, C::Branch, enc(BRANCH, 0, 0));
    Bge => "BGE", op("BGE", T::SB, C::Branch, enc(BRANCH, 5, 0));
    Bgeu => "BGEU", op("BGEU", T::SB, C::Branch, enc(BRANCH, 7, 0)).u();
    Blt => "BLT", op("BLT", T::SB, C::Branch, enc(BRANCH, 4, 0));
    Bltu => "BLTU", op("BLTU", T::SB, C::Branch, enc(BRANCH, 6, 0)).u();
    Bne => "BNE", op("BNE", T::SB, C::Branch, enc(BRANCH, 1, 0));
    Jal => "JAL", op("JAL", T::UJ, C::Jump, JAL);
    Jalr => "JALR", op("JALR", T::I, C::Jump, enc(JALR, 0, 0));
    Lb => "LB", op("LB", T::I, C::Load, enc(LOAD, 0, 0)).mem(Sz::Byte, true);
    Lh => "LH", op("LH", T::I, C::Load, enc(LOAD, 1, 0)).mem(Sz::Half, true);
    Lw => "LW", op("LW", T::I, C::Load, enc(LOAD, 2, 0)).mem(Sz::Word, true);
    Ld => "LD", op("LD", T::I, C::Load, enc(LOAD, 3, 0)).mem(Sz::Double, true);
    Lbu => "LBU", op("LBU", T::I, C::Load, enc(LOAD, 4, 0)).mem(Sz::Byte, false).u();
    Lhu => "LHU", op("LHU", T::I, C::Load, enc(LOAD, 5, 0)).mem(Sz::Half, false).u();
    Lwu => "LWU", op("LWU", T::I, C::Load, enc(LOAD, 6, 0)).mem(Sz::Word, false).u();
    Lui => "LUI", op("LUI", T::U, C::Alu, LUI);
    Or => "OR", op("OR", T::R, C::Alu, enc(OP, 6, 0));
    Ori => "ORI", op("ORI", T::I, C::Alu, enc(OP_IMM, 6, 0));
    Slli => "SLLI", op("SLLI", T::I, C::Shift, enc(OP_IMM, 1, 0));
    Slt => "SLT", op("SLT", T::R, C::Alu, enc(OP, 2, 0));
    Slti => "SLTI", op("SLTI", T::I, C::Alu, enc(OP_IMM, 2, 0));
    Sltu => "SLTU", op("SLTU", T::R, C::Alu, enc(OP, 3, 0)).u();
    Sltiu => "SLTIU", op("SLTIU", T::I, C::Alu, enc(OP_IMM, 3, 0)).u();
    Sll => "SLL", op("SLL", T::R, C::Shift, enc(OP, 1, 0));
    Sllw => "SLLW", op("SLLW", T::R, C::Shift, enc(OP_32, 1, 0)).w();
    Slliw => "SLLIW", op("SLLIW", T::I, C::Shift, enc(OP_IMM_32, 1, 0)).w();
    Sra => "SRA", op("SRA", T::R, C::Shift, enc(OP, 5, 0x20));
    Sraw => "SRAW", op("SRAW", T::R, C::Shift, enc(OP_32, 5, 0x20)).w();
    Srai => "SRAI", op("SRAI", T::I, C::Shift, enc(OP_IMM, 5, 0x20));
    Sraiw => "SRAIW", op("SRAIW", T::I, C::Shift, enc(OP_IMM_32, 5, 0x20)).w();
    Srl => "SRL", op("SRL", T::R, C::Shift, enc(OP, 5, 0));
    Srli => "SRLI", op("SRLI", T::I, C::Shift, enc(OP_IMM, 5, 0));
    Srliw => "SRLIW", op("SRLIW", T::I, C::Shift, enc(OP_IMM_32, 5, 0)).w();
    Srlw => "SRLW", op("SRLW", T::R, C::Shift, enc(OP_32, 5, 0)).w();
    Sb => "SB", op("SB", T::S, C::Store, enc(STORE, 0, 0)).mem(Sz::Byte, false);
    Sh => "SH", op("SH", T::S, C::Store, enc(STORE, 1, 0)).mem(Sz::Half, false);
    Sw => "SW", op("SW", T::S, C::Store, enc(STORE, 2, 0)).mem(Sz::Word, false);
    Sd => "SD", op("SD", T::S, C::Store, enc(STORE, 3, 0)).mem(Sz::Double, false);
    Sub => "SUB", op("SUB", T::R, C::Alu, enc(OP, 0, 0x20));
    Subw => "SUBW", op("SUBW", T::R, C::Alu, enc(OP_32, 0, 0x20)).w();
    Xor => "XOR", op("XOR", T::R, C::Alu, enc(OP, 4, 0));
    Xori => "XORI", op("XORI", T::I, C::Alu, enc(OP_IMM, 4, 0));
    Csrrw => "CSRRW", op("CSRRW", T::I, C::Csr, enc(SYSTEM, 1, 0));
    Csrrs => "CSRRS", op("CSRRS", T::I, C::Csr, enc(SYSTEM, 2, 0));
    Csrrc => "CSRRC", op("CSRRC", T::I, C::Csr, enc(SYSTEM, 3, 0));
    Csrrwi => "CSRRWI", op("CSRRWI", T::I, C::Csr, enc(SYSTEM, 5, 0)).no_rs1();
    Csrrci => "CSRRCI", op("CSRRCI", T::I, C::Csr, enc(SYSTEM, 7, 0)).no_rs1();
    Csrrsi => "CSRRSI", op("CSRRSI", T::I, C::Csr, enc(SYSTEM, 6, 0)).no_rs1();
    Uret => "URET", op("URET", T::I, C::TrapReturn, 0x0020_0073).fixed();
    Sret => "SRET", op("SRET", T::I, C::TrapReturn, 0x1020_0073).fixed();
    Hret => "HRET", op("HRET", T::I, C::TrapReturn, 0x2020_0073).fixed();
    Mret => "MRET", op("MRET", T::I, C::TrapReturn, 0x3020_0073).fixed();
    Fence => "FENCE", op("FENCE", T::I, C::Fence, 0x0FF0_000F).fixed();
    FenceI => "FENCE_I", op("FENCE_I", T::I, C::Fence, 0x0000_100F).fixed();
    Wfi => "WFI", op("WFI", T::I, C::Wfi, 0x1050_0073).fixed();
    Div => "DIV", op("DIV", T::R, C::Div, enc(OP, 4, 1));
    Divu => "DIVU", op("DIVU", T::R, C::Div, enc(OP, 5, 1)).u();
    Divw => "DIVW", op("DIVW", T::R, C::Div, enc(OP_32, 4, 1)).w();
    Divuw => "DIVUW", op("DIVUW", T::R, C::Div, enc(OP_32, 5, 1)).w().u();
    Mul => "MUL", op("MUL", T::R, C::Mul, enc(OP, 0, 1));
    Mulw => "MULW", op("MULW", T::R, C::Mul, enc(OP_32, 0, 1)).w();
    Mulh => "MULH", op("MULH", T::R, C::Mul, enc(OP, 1, 1));
    Mulhsu => "MULHSU", op("MULHSU", T::R, C::Mul, enc(OP, 2, 1));
    Mulhu => "MULHU", op("MULHU", T::R, C::Mul, enc(OP, 3, 1)).u();
    Rem => "REM", op("REM", T::R, C::Div, enc(OP, 6, 1));
    Remu => "REMU", op("REMU", T::R, C::Div, enc(OP, 7, 1)).u();
    Remw => "REMW", op("REMW", T::R, C::Div, enc(OP_32, 6, 1)).w();
    Remuw => "REMUW", op("REMUW", T::R, C::Div, enc(OP_32, 7, 1)).w().u();
    AmoaddW => "AMOADD_W", op("AMOADD_W", T::R, C::Atomic, enc(AMO, 2, 0x00));
    AmoxorW => "AMOXOR_W", op("AMOXOR_W", T::R, C::Atomic, enc(AMO, 2, 0x10));
    AmoorW => "AMOOR_W", op("AMOOR_W", T::R, C::Atomic, enc(AMO, 2, 0x20));
    AmoandW => "AMOAND_W", op("AMOAND_W", T::R, C::Atomic, enc(AMO, 2, 0x30));
    AmominW => "AMOMIN_W", op("AMOMIN_W", T::R, C::Atomic, enc(AMO, 2, 0x40));
    AmomaxW => "AMOMAX_W", op("AMOMAX_W", T::R, C::Atomic, enc(AMO, 2, 0x50));
    AmominuW => "AMOMINU_W", op("AMOMINU_W", T::R, C::Atomic, enc(AMO, 2, 0x60));
    AmomaxuW => "AMOMAXU_W", op("AMOMAXU_W", T::R, C::Atomic, enc(AMO, 2, 0x70));
    AmoswapW => "AMOSWAP_W", op("AMOSWAP_W", T::R, C::Atomic, enc(AMO, 2, 0x04));
    LrW => "LR_W", op("LR_W", T::R, C::Atomic, enc(AMO, 2, 0x08)).no_rs2();
    ScW => "SC_W", op("SC_W", T::R, C::Atomic, enc(AMO, 2, 0x0C));
    AmoaddD => "AMOADD_D", op("AMOADD_D", T::R, C::Atomic, enc(AMO, 3, 0x00));
    AmoxorD => "AMOXOR_D", op("AMOXOR_D", T::R, C::Atomic, enc(AMO, 3, 0x10));
    AmoorD => "AMOOR_D", op("AMOOR_D", T::R, C::Atomic, enc(AMO, 3, 0x20));
    AmoandD => "AMOAND_D", op("AMOAND_D", T::R, C::Atomic, enc(AMO, 3, 0x30));
    AmominD => "AMOMIN_D", op("AMOMIN_D", T::R, C::Atomic, enc(AMO, 3, 0x40));
    AmomaxD => "AMOMAX_D", op("AMOMAX_D", T::R, C::Atomic, enc(AMO, 3, 0x50));
    AmominuD => "AMOMINU_D", op("AMOMINU_D", T::R, C::Atomic, enc(AMO, 3, 0x60));
    AmomaxuD => "AMOMAXU_D", op("AMOMAXU_D", T::R, C::Atomic, enc(AMO, 3, 0x70));
    AmoswapD => "AMOSWAP_D", op("AMOSWAP_D", T::R, C::Atomic, enc(AMO, 3, 0x04));
    LrD => "LR_D", op("LR_D", T::R, C::Atomic, enc(AMO, 3, 0x08)).no_rs2();
    ScD => "SC_D", op("SC_D", T::R, C::Atomic, enc(AMO, 3, 0x0C));
    Ecall => "ECALL", op("ECALL", T::I, C::Ecall, 0x0000_0073).fixed();
    Ebreak => "EBREAK", op("EBREAK", T::I, C::Ebreak, 0x0010_0073).fixed();
    FaddD => "FADD_D", op("FADD_D", T::R, C::Fpu, enc(OP_FP, 7, 0x01)).fp(true, true, true);
    FcvtDW => "FCVT_D_W", op("FCVT_D_W", T::R, C::Fpu, enc(OP_FP, 7, 0x69)).fp(true, false, false).no_rs2().w();
    FcvtDWu => "FCVT_D_WU", op("FCVT_D_WU", T::R, C::Fpu, enc(OP_FP, 7, 0x69) | (1 << 20)).fp(true, false, false).no_rs2().w().u();
    FcvtDL => "FCVT_D_L", op("FCVT_D_L", T::R, C::Fpu, enc(OP_FP, 7, 0x69) | (2 << 20)).fp(true, false, false).no_rs2();
    FcvtDLu => "FCVT_D_LU", op("FCVT_D_LU", T::R, C::Fpu, enc(OP_FP, 7, 0x69) | (3 << 20)).fp(true, false, false).no_rs2().u();
    FcvtWD => "FCVT_W_D", op("FCVT_W_D", T::R, C::Fpu, enc(OP_FP, 7, 0x61)).fp(false, true, false).no_rs2().w();
    FcvtWuD => "FCVT_WU_D", op("FCVT_WU_D", T::R, C::Fpu, enc(OP_FP, 7, 0x61) | (1 << 20)).fp(false, true, false).no_rs2().w().u();
    FcvtLD => "FCVT_L_D", op("FCVT_L_D", T::R, C::Fpu, enc(OP_FP, 7, 0x61) | (2 << 20)).fp(false, true, false).no_rs2();
    FcvtLuD => "FCVT_LU_D", op("FCVT_LU_D", T::R, C::Fpu, enc(OP_FP, 7, 0x61) | (3 << 20)).fp(false, true, false).no_rs2().u();
    FdivD => "FDIV_D", op("FDIV_D", T::R, C::Fpu, enc(OP_FP, 7, 0x0D)).fp(true, true, true);
    FeqD => "FEQ_D", op("FEQ_D", T::R, C::Fpu, enc(OP_FP, 2, 0x51)).fp(false, true, true);
    Fld => "FLD", op("FLD", T::I, C::Load, enc(LOAD_FP, 3, 0)).mem(Sz::Double, false).fp(true, false, false);
    FleD => "FLE_D", op("FLE_D", T::R, C::Fpu, enc(OP_FP, 0, 0x51)).fp(false, true, true);
    FltD => "FLT_D", op("FLT_D", T::R, C::Fpu, enc(OP_FP, 1, 0x51)).fp(false, true, true);
    FmaxD => "FMAX_D", op("FMAX_D", T::R, C::Fpu, enc(OP_FP, 1, 0x15)).fp(true, true, true);
    FminD => "FMIN_D", op("FMIN_D", T::R, C::Fpu, enc(OP_FP, 0, 0x15)).fp(true, true, true);
    FmovDX => "FMOV_D_X", op("FMOV_D_X", T::R, C::Fpu, enc(OP_FP, 0, 0x79)).fp(true, false, false).no_rs2();
    FmovXD => "FMOV_X_D", op("FMOV_X_D", T::R, C::Fpu, enc(OP_FP, 0, 0x71)).fp(false, true, false).no_rs2();
    FmulD => "FMUL_D", op("FMUL_D", T::R, C::Fpu, enc(OP_FP, 7, 0x09)).fp(true, true, true);
    Fsd => "FSD", op("FSD", T::S, C::Store, enc(STORE_FP, 3, 0)).mem(Sz::Double, false).fp(false, false, true);
    FsubD => "FSUB_D", op("FSUB_D", T::R, C::Fpu, enc(OP_FP, 7, 0x05)).fp(true, true, true);
}

impl Opcode {
    /// Number of instruction tags.
    pub const COUNT: usize = 120;

    /// Returns the static table entry for this tag.
    #[inline]
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODE_TABLE[self as usize]
    }

    /// Execution class of this tag.
    #[inline]
    pub fn class(self) -> ExecClass {
        self.info().class
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    /// Looks up a tag by its table index.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Looks up a tag by mnemonic. Dots and case are ignored (`fence.i` matches `FENCE_I`).
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_uppercase().replace('.', "_");
        Self::ALL.iter().copied().find(|o| o.mnemonic() == wanted)
    }

    /// Builds an instruction word for this tag.
    ///
    /// Fields the encoding fixes (for example `rs2` of `FCVT.D.L`, or every field of `MRET`)
    /// are ignored. For CSR instructions `imm` is the CSR address and `rs1` the register or the
    /// 5-bit immediate. Shift immediates are masked to the shift-amount width.
    pub fn encode(self, rd: u8, rs1: u8, rs2: u8, imm: i64) -> u32 {
        let info = self.info();
        let rd = u32::from(rd & 0x1F);
        let rs1 = u32::from(rs1 & 0x1F);
        let rs2 = u32::from(rs2 & 0x1F);
        let imm = imm as u32;
        let mut word = info.base;
        if info.is_fixed() {
            return word;
        }
        match info.isa_type {
            IsaType::R => {
                word |= (rd << 7) | (rs1 << 15);
                if info.reads_rs2 {
                    word |= rs2 << 20;
                }
            }
            IsaType::I => {
                let imm = match info.class {
                    ExecClass::Shift if info.rv32 => imm & 0x1F,
                    ExecClass::Shift => imm & 0x3F,
                    _ => imm & 0xFFF,
                };
                word |= (imm << 20) | (rs1 << 15) | (rd << 7);
            }
            IsaType::S => {
                word |= ((imm >> 5) & 0x7F) << 25 | (rs2 << 20) | (rs1 << 15) | (imm & 0x1F) << 7;
            }
            IsaType::SB => {
                word |= ((imm >> 12) & 1) << 31
                    | ((imm >> 5) & 0x3F) << 25
                    | (rs2 << 20)
                    | (rs1 << 15)
                    | ((imm >> 1) & 0xF) << 8
                    | ((imm >> 11) & 1) << 7;
            }
            IsaType::U => {
                word |= (imm & 0xFFFF_F000) | (rd << 7);
            }
            IsaType::UJ => {
                word |= ((imm >> 20) & 1) << 31
                    | ((imm >> 1) & 0x3FF) << 21
                    | ((imm >> 11) & 1) << 20
                    | ((imm >> 12) & 0xFF) << 12
                    | (rd << 7);
            }
        }
        word
    }
}
