// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! RQC-Hash command line
//!
//! # Usage
//!
//! ```bash
//! # Hash a message on the local simulator
//! rqc-hash hash --message "hello" -n 6 -d 6 --seed 12345
//!
//! # Try IBM Runtime first, falling back to the provider and then local
//! QISKIT_IBM_TOKEN=... rqc-hash hash -m "hello" --backend ibm_brisbane --runtime auto
//!
//! # Show the circuit that would be evaluated
//! rqc-hash circuit -m "hello" --qasm
//!
//! # List available evaluators
//! rqc-hash backends
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rqc_hash::backend::{Capabilities, EvaluatorAdapter, RuntimeMode};
use rqc_hash::circuit::qasm::to_qasm3;
use rqc_hash::config::Config;
use rqc_hash::pipeline::{self, HashOutcome, HashRequest};
use rqc_hash::{Result, VERSION};

/// Random quantum circuit hash
#[derive(Parser)]
#[command(name = "rqc-hash")]
#[command(author = "RQC-Hash Contributors")]
#[command(version = VERSION)]
#[command(about = "Derive a hex digest from a message via a sampled random circuit")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to logging.level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Circuit parameters shared by `hash` and `circuit`.
#[derive(clap::Args)]
struct CircuitArgs {
    /// Message to hash (UTF-8)
    #[arg(short, long)]
    message: Option<String>,

    /// Number of qubits
    #[arg(short = 'n', long = "n", visible_alias = "n-qubits")]
    n_qubits: Option<u32>,

    /// Circuit depth (layers)
    #[arg(short = 'd', long = "d", visible_alias = "depth")]
    depth: Option<u32>,

    /// Seed for the circuit structure
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a message
    Hash {
        #[command(flatten)]
        circuit: CircuitArgs,

        /// Number of shots
        #[arg(long)]
        shots: Option<u32>,

        /// IBM backend name (e.g. ibm_brisbane); empty runs locally
        #[arg(long, default_value = "")]
        backend: String,

        /// Connection mode: auto, provider, cloud, or empty for local only
        #[arg(long)]
        runtime: Option<RuntimeMode>,

        /// Runtime resilience level (0..=3)
        #[arg(long)]
        resilience: Option<u8>,

        /// Where to write the JSON result record
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not write the result record
        #[arg(long)]
        no_record: bool,

        /// Number of top outcomes to print
        #[arg(long, default_value_t = 8)]
        top: usize,

        /// Also write the circuit as OpenQASM 3.0
        #[arg(long)]
        emit_qasm: Option<PathBuf>,
    },

    /// Print the circuit without evaluating it
    Circuit {
        #[command(flatten)]
        circuit: CircuitArgs,

        /// Print OpenQASM 3.0 instead of the operation list
        #[arg(long)]
        qasm: bool,
    },

    /// List available evaluators
    Backends,

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, &config.logging.format);

    match cli.command {
        Commands::Hash {
            circuit,
            shots,
            backend,
            runtime,
            resilience,
            output,
            no_record,
            top,
            emit_qasm,
        } => {
            config.validate()?;

            let mut request = build_request(&config, circuit);
            if let Some(shots) = shots {
                request.shots = shots;
            }
            request.backend = backend.trim().to_string();
            if let Some(mode) = runtime {
                request.runtime = mode;
            }
            if let Some(r) = resilience {
                request.resilience = r;
            }

            if let Some(path) = emit_qasm.as_deref() {
                request.validate(&config.validation.limits)?;
                let circuit = request.build_circuit()?;
                std::fs::write(path, to_qasm3(&circuit))?;
                info!(path = %path.display(), "OpenQASM written");
            }

            let adapter = EvaluatorAdapter::from_config(&config.backends);
            let outcome = pipeline::run(&request, &adapter, &config.validation.limits).await?;

            let record_path = if no_record || !config.output.write_record {
                None
            } else {
                Some(output.unwrap_or_else(|| PathBuf::from(&config.output.record_path)))
            };
            if let Some(path) = record_path.as_deref() {
                outcome.to_record(&request).write_to(path)?;
            }

            print_outcome(&request, &outcome, record_path.as_deref(), top);
        }

        Commands::Circuit { circuit, qasm } => {
            let request = build_request(&config, circuit);
            request.validate(&config.validation.limits)?;
            let spec = request.build_circuit()?;

            if qasm {
                print!("{}", to_qasm3(&spec));
            } else {
                let stats = spec.stats();
                println!("{}", spec.name());
                println!(
                    "  operations: {} (set {}, rz {}, rx {}, cx {}, measure {})",
                    stats.total(),
                    stats.set_bits,
                    stats.rotations_z,
                    stats.rotations_x,
                    stats.entangles,
                    stats.measurements
                );
                for op in spec.operations() {
                    println!("  {}", op);
                }
            }
        }

        Commands::Backends => {
            let detected = Capabilities::detect(&config.backends);
            let adapter = EvaluatorAdapter::from_config(&config.backends);
            let caps = adapter.capabilities();

            println!("Available evaluators:");
            print_capability("local simulator", detected.local_simulator, caps.local_simulator);
            print_capability("IBM Runtime session", detected.managed_session, caps.managed_session);
            print_capability("IBM direct provider", detected.direct_provider, caps.direct_provider);

            if !cfg!(feature = "ibm") {
                println!("  (built without the 'ibm' feature)");
            } else if !config.backends.ibm.has_credentials() {
                println!("  (set QISKIT_IBM_TOKEN to enable IBM evaluators)");
            }
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => {
            // Validate configuration
            match config.validate() {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    error!(error = %e, "Invalid configuration");
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Merge CLI circuit arguments over configured defaults.
fn build_request(config: &Config, args: CircuitArgs) -> HashRequest {
    let mut request = HashRequest::from_defaults(&config.hash);
    if let Some(message) = args.message {
        request.message = message;
    }
    if let Some(n) = args.n_qubits {
        request.n_qubits = n;
    }
    if let Some(d) = args.depth {
        request.depth = d;
    }
    if let Some(seed) = args.seed {
        request.seed = seed;
    }
    request
}

fn print_outcome(request: &HashRequest, outcome: &HashOutcome, record: Option<&Path>, top: usize) {
    println!("=== RQC-Hash Result ===");
    println!("Mode      : {}", outcome.provenance);
    println!("Message   : {:?}", request.message);
    println!(
        "n_qubits  : {}, depth: {}, seed: {}, shots: {}",
        request.n_qubits, request.depth, request.seed, request.shots
    );
    println!("Top bitstr: {}  (MSB..LSB)", outcome.bit_pattern);
    println!("Hash hex  : {} (LSB-first integer)", outcome.digest);
    if let Some(path) = record {
        println!("Saved     : {}", path.display());
    }

    if top > 0 && !outcome.distribution.is_empty() {
        println!("Top results:");
        for (pattern, count) in outcome.distribution.top(top) {
            println!("  {} {}", pattern, count);
        }
    }
}

fn print_capability(name: &str, detected: bool, ready: bool) {
    let status = match (detected, ready) {
        (true, true) => "ready",
        (true, false) => "failed to initialize",
        (false, _) => "not configured",
    };
    println!("  {:<22} {}", name, status);
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
