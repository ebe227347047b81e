//! RISC-V pipelined core model CLI.
//!
//! This binary runs a JSON program image on the modelled core. It performs:
//! 1. **Setup:** Loads the configuration (or defaults) and the program image.
//! 2. **Run:** Clocks the system until the program leaves its image or the cycle limit is hit.
//! 3. **Report:** Prints the final registers and, optionally, the statistics.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rvpipe_core::common::SimError;
use rvpipe_core::config::Config;
use rvpipe_core::sim::{ProgramImage, Simulator, StopReason};

#[derive(Parser, Debug)]
#[command(
    name = "rvpipe",
    author,
    version,
    about = "Cycle-accurate RISC-V pipelined core model",
    long_about = "Run a JSON program image on the modelled core.\n\nExamples:\n  rvpipe run --program prog.json\n  rvpipe run --program prog.json --config cfg.json --vcd out.vcd --stats"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program image.
    Run {
        /// Program image (JSON).
        #[arg(short, long)]
        program: PathBuf,

        /// Configuration file (JSON); built-in defaults otherwise.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cycle limit; overrides `general.max_cycles`.
        #[arg(long)]
        cycles: Option<u64>,

        /// Write a VCD trace; overrides `general.trace_vcd`.
        #[arg(long)]
        vcd: Option<String>,

        /// Print statistics after the run. Repeat `--section` to select sections.
        #[arg(long)]
        stats: bool,

        /// Statistics section to print (summary, instruction_mix, stalls, system).
        #[arg(long = "section")]
        sections: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            program,
            config,
            cycles,
            vcd,
            stats,
            sections,
        } => cmd_run(&program, config.as_deref(), cycles, vcd, stats, &sections),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n[!] FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(
    program: &Path,
    config: Option<&Path>,
    cycles: Option<u64>,
    vcd: Option<String>,
    print_stats: bool,
    sections: &[String],
) -> Result<ExitCode, SimError> {
    let mut config = match config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if vcd.is_some() {
        config.general.trace_vcd = vcd;
    }
    let limit = cycles.unwrap_or(config.general.max_cycles);

    let image = ProgramImage::from_file(program)?;
    let mut sim = Simulator::from_image(&config, &image)?;
    tracing::info!(
        "running {} instructions from {:#x}",
        image.instructions.len(),
        image.base
    );

    let reason = sim.run(limit)?;
    sim.finish_trace()?;

    println!("[rvpipe] stopped after {} cycles ({reason:?})", sim.cycle());
    println!("[rvpipe] npc = {:#x}", sim.execute().npc());
    sim.regs().dump();
    if print_stats {
        sim.stats().print_sections(sections);
    }

    Ok(match reason {
        StopReason::Finished => ExitCode::SUCCESS,
        StopReason::CycleLimit => ExitCode::from(2),
    })
}
