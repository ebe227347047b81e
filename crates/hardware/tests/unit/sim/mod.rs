pub mod debug_access;
pub mod traps;
pub mod vcd;
