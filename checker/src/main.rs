use clap::Parser;
use std::path::PathBuf;

use kpc::config::CheckOptions;
use kpc::pattern::Pattern;
use kpc::pipeline::{run_pipeline, CheckState, PipelineError};
use kpc::report::Report;
use kpc::stage::StageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EmitStage {
    Problems,
    Loops,
    Resolved,
    Report,
}

#[derive(Parser, Debug)]
#[command(
    name = "kpc",
    version,
    about = "KnitPaint Checker — simulates a V-bed flat knitting machine to validate knitpaint patterns"
)]
struct Cli {
    /// Input .kp pattern file
    pattern: PathBuf,

    /// Check the pattern as a repeating motif (tiled and padded)
    #[arg(long)]
    tile: bool,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Problems)]
    emit: EmitStage,

    /// JSON file with thresholds and tiling options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit successfully when only warnings were found
    #[arg(long)]
    allow_warnings: bool,

    /// Print check stages, timing and trace events
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
        eprintln!("kpc: pattern = {}", cli.pattern.display());
        eprintln!("kpc: emit    = {:?}", cli.emit);
    }

    // ── Load options ──
    let options = match &cli.config {
        Some(path) => match CheckOptions::load(path) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("kpc: error: {}", e);
                std::process::exit(2);
            }
        },
        None => CheckOptions::default(),
    };

    // ── Read and parse pattern ──
    let source = match std::fs::read_to_string(&cli.pattern) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("kpc: error: {}: {}", cli.pattern.display(), e);
            std::process::exit(2);
        }
    };

    let pattern = match Pattern::parse(&source) {
        Ok(p) => p,
        Err(errors) => {
            for err in &errors {
                eprintln!("kpc: parse error: {}", err);
            }
            std::process::exit(2);
        }
    };
    let pattern = if cli.tile {
        pattern.tile(&options.tile)
    } else {
        pattern
    };

    if cli.verbose {
        eprintln!(
            "kpc: {} courses x {} needles",
            pattern.height(),
            pattern.width()
        );
    }

    // ── Check ──
    let terminal = match cli.emit {
        EmitStage::Resolved => StageId::ResolveCables,
        _ => StageId::ScanPickups,
    };
    let print_problems = cli.emit != EmitStage::Report;
    let mut state = CheckState::new(pattern);
    let result = run_pipeline(&mut state, terminal, &options, cli.verbose, |_, problems| {
        if print_problems {
            for p in problems {
                eprintln!("kpc: {}", p);
            }
        }
    });
    match result {
        Ok(()) | Err(PipelineError::Halted { .. }) => {}
        Err(e) => {
            eprintln!("kpc: error: {}", e);
            std::process::exit(2);
        }
    }

    // ── Emit ──
    match cli.emit {
        EmitStage::Problems => {
            let n = state.problems.len();
            match (&state.loops, n) {
                (Some(loops), 0) => println!("ok: {} loops", loops.len()),
                _ => println!("{} problem(s)", n),
            }
        }
        EmitStage::Loops => {
            if let Some(loops) = &state.loops {
                for l in loops {
                    println!("{}", l);
                }
            }
        }
        EmitStage::Resolved => {
            if let Some(codes) = &state.resolved {
                match Pattern::new(state.pattern.width(), codes.clone()) {
                    Ok(resolved) => print!("{}", resolved),
                    Err(e) => {
                        eprintln!("kpc: error: {}", e);
                        std::process::exit(2);
                    }
                }
            }
        }
        EmitStage::Report => match Report::new(&state).to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("kpc: error: {}", e);
                std::process::exit(2);
            }
        },
    }

    let blocking = state.problems.has_blocking_problems();
    if blocking || (!state.problems.is_empty() && !cli.allow_warnings) {
        std::process::exit(1);
    }
}
