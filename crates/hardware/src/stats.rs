//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics of the modelled core. It provides:
//! 1. **Cycle and IPC:** Total cycles, issued instructions, and derived metrics (CPI, kHz).
//! 2. **Instruction mix:** Single-cycle versus multi-cycle, loads, stores, branches, CSR.
//! 3. **Stalls:** Hazard, hold, queue-full, and CSR-wait cycles.
//! 4. **System:** Traps, exception pulses, arbiter grants, and memory requests.

use std::time::Instant;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Instructions accepted by Execute.
    pub instructions: u64,

    /// Instructions completed without a multi-cycle unit.
    pub inst_single: u64,
    /// Instructions dispatched to a multi-cycle unit.
    pub inst_multi: u64,
    /// Loads pushed to Memory-Access.
    pub inst_load: u64,
    /// Stores pushed to Memory-Access.
    pub inst_store: u64,
    /// Branches and jumps.
    pub inst_branch: u64,
    /// CSR, trap-return, and WFI instructions.
    pub inst_csr: u64,

    /// Cycles Execute spent in `Hazard`.
    pub stalls_hazard: u64,
    /// Cycles Execute spent in `Hold`, or held by a halted core.
    pub stalls_hold: u64,
    /// Cycles the Memory-Access queue was full.
    pub queue_full: u64,
    /// Cycles Execute waited on a CSR transaction.
    pub csr_wait: u64,

    /// Traps taken.
    pub traps: u64,
    /// Cycles with at least one exception pulse.
    pub exceptions: u64,
    /// CSR bus grants per master.
    pub arbiter_grants: [u64; 2],
    /// Requests accepted by the data memory.
    pub mem_requests: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions: 0,
            inst_single: 0,
            inst_multi: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_csr: 0,
            stalls_hazard: 0,
            stalls_hold: 0,
            queue_full: 0,
            csr_wait: 0,
            traps: 0,
            exceptions: 0,
            arbiter_grants: [0; 2],
            mem_requests: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"stalls"`, `"system"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "stalls", "system"];

impl SimStats {
    /// Renders the requested sections. An empty slice selects every section.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64().max(f64::EPSILON);
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions.max(1) as f64;
        let pct = |n: u64, of: f64| (n as f64 / of) * 100.0;
        let mut s = String::new();
        let mut line = |text: String| {
            s.push_str(&text);
            s.push('\n');
        };

        line("==========================================================".into());
        if want("summary") {
            line("RVPIPE SIMULATION STATISTICS".into());
            line("==========================================================".into());
            line(format!("host_seconds             {seconds:.4} s"));
            line(format!("sim_cycles               {}", self.cycles));
            line(format!("sim_freq                 {:.2} kHz", (self.cycles as f64 / seconds) / 1000.0));
            line(format!("sim_insts                {}", self.instructions));
            line(format!("sim_ipc                  {:.4}", self.instructions as f64 / cyc));
            line(format!("sim_cpi                  {:.4}", cyc / instr));
            line("----------------------------------------------------------".into());
        }
        if want("instruction_mix") {
            line("INSTRUCTION MIX".into());
            for (name, n) in [
                ("op.single", self.inst_single),
                ("op.multi", self.inst_multi),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.csr", self.inst_csr),
            ] {
                line(format!("  {name:<22} {n} ({:.2}%)", pct(n, instr)));
            }
            line("----------------------------------------------------------".into());
        }
        if want("stalls") {
            line("STALLS".into());
            for (name, n) in [
                ("stalls.hazard", self.stalls_hazard),
                ("stalls.hold", self.stalls_hold),
                ("stalls.queue_full", self.queue_full),
                ("stalls.csr_wait", self.csr_wait),
            ] {
                line(format!("  {name:<22} {n} ({:.2}%)", pct(n, cyc)));
            }
            line("----------------------------------------------------------".into());
        }
        if want("system") {
            line("SYSTEM".into());
            line(format!("  traps                  {}", self.traps));
            line(format!("  exceptions             {}", self.exceptions));
            line(format!("  csr.grants.execute     {}", self.arbiter_grants[0]));
            line(format!("  csr.grants.dport       {}", self.arbiter_grants[1]));
            line(format!("  mem.requests           {}", self.mem_requests));
        }
        line("==========================================================".into());
        s
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an empty slice to
    /// print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.render_sections(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
