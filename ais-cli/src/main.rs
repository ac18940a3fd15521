//! ais: command-line front end for ais-core.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ais_core::checksum;
use ais_core::config::{self, Config, OutputFormat};
use ais_core::{Pipeline, PipelineStats};

mod listen;
mod output;

use output::Printer;

#[derive(Parser)]
#[command(name = "ais", version, about = "AIS NMEA 0183 decoder")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to ~/.ais-decode/config.yaml)
    #[arg(long, global = true, env = "AIS_DECODE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode NMEA sentences from a file (or - for stdin)
    Decode {
        /// Path to file containing AIVDM/AIVDO sentences (one per line)
        file: PathBuf,

        /// Print one JSON object per message
        #[arg(short, long)]
        json: bool,

        /// Include failures with the raw input that caused them
        #[arg(short, long)]
        errors: bool,

        /// Drop sentences whose NMEA checksum does not match
        #[arg(long)]
        strict: bool,

        /// Evict incomplete multi-sentence messages after this many seconds
        #[arg(long)]
        idle_timeout: Option<f64>,
    },

    /// Summarize a capture: counters and messages per type
    Stats {
        /// Path to file containing AIVDM/AIVDO sentences (one per line)
        file: PathBuf,

        /// Drop sentences whose NMEA checksum does not match
        #[arg(long)]
        strict: bool,
    },

    /// Receive sentences over UDP and decode them as they arrive
    Listen {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// UDP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Print one JSON object per message
        #[arg(short, long)]
        json: bool,

        /// Include failures with the raw input that caused them
        #[arg(short, long)]
        errors: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::config_file);
    let config = config::load_config_from(&config_path);
    init_tracing(cli.verbose, &config.log_level);
    debug!(path = %config_path.display(), "configuration loaded");

    match cli.command {
        Commands::Decode {
            file,
            json,
            errors,
            strict,
            idle_timeout,
        } => {
            let format = if json { OutputFormat::Json } else { config.output.format };
            let options = DecodeOptions {
                strict,
                idle_timeout: idle_timeout
                    .or(config.reassembly.idle_timeout_secs)
                    .filter(|secs| *secs > 0.0),
            };
            cmd_decode(&file, &options, format, errors || config.output.include_errors);
        }
        Commands::Stats { file, strict } => {
            let options = DecodeOptions {
                strict,
                idle_timeout: config.reassembly.idle_timeout_secs,
            };
            cmd_stats(&file, &options);
        }
        Commands::Listen {
            host,
            port,
            json,
            errors,
        } => {
            let host = host.unwrap_or_else(|| config.listen.host.clone());
            let port = port.unwrap_or(config.listen.port);
            let format = if json { OutputFormat::Json } else { config.output.format };
            cmd_listen(
                &host,
                port,
                config.reassembly.idle_timeout_secs,
                format,
                errors || config.output.include_errors,
            );
        }
        Commands::Config { write } => cmd_config(&config, &config_path, write),
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags, then the configured level. Logs go to stderr.
fn init_tracing(verbose: u8, default_level: &str) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_input(file: &Path) -> Box<dyn BufRead> {
    if file.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        let f = File::open(file).unwrap_or_else(|e| {
            eprintln!("Error opening {}: {e}", file.display());
            std::process::exit(1);
        });
        Box::new(BufReader::new(f))
    }
}

struct DecodeOptions {
    strict: bool,
    idle_timeout: Option<f64>,
}

/// Counters for one run over an input stream.
struct RunSummary {
    stats: PipelineStats,
    /// Lines dropped by `--strict`
    bad_checksums: u64,
}

/// Feed every line of `reader` through a fresh pipeline, printing outcomes.
///
/// Lines get a synthetic timestamp 0.1 s apart; tag block times ride along as
/// `received_at` and never drive eviction.
fn decode_stream<R: BufRead, W: Write>(
    reader: R,
    options: &DecodeOptions,
    printer: &mut Printer<W>,
) -> io::Result<RunSummary> {
    let mut pipeline = Pipeline::new(options.idle_timeout);
    let mut bad_checksums = 0u64;
    let mut timestamp = 0.0;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "unreadable line");
                continue;
            }
        };
        timestamp += 0.1;

        if options.strict && checksum::verify(&line).is_ok_and(|ok| !ok) {
            debug!(line = %line.trim(), "checksum mismatch, dropping");
            bad_checksums += 1;
            continue;
        }

        for outcome in pipeline.feed(&line, timestamp) {
            printer.outcome(&outcome)?;
        }
    }

    if let Some(outcome) = pipeline.finish() {
        printer.outcome(&outcome)?;
    }

    Ok(RunSummary {
        stats: pipeline.stats().clone(),
        bad_checksums,
    })
}

fn cmd_decode(file: &Path, options: &DecodeOptions, format: OutputFormat, include_errors: bool) {
    let reader = open_input(file);
    let stdout = io::stdout().lock();
    let mut printer = Printer::new(stdout, format, include_errors);

    let summary = decode_stream(reader, options, &mut printer).unwrap_or_else(|e| {
        eprintln!("Error writing output: {e}");
        std::process::exit(1);
    });

    info!(
        lines = summary.stats.lines,
        messages = summary.stats.messages,
        errors = summary.stats.errors(),
        bad_checksums = summary.bad_checksums,
        "decode finished"
    );
}

fn cmd_stats(file: &Path, options: &DecodeOptions) {
    let reader = open_input(file);
    let mut printer = Printer::new(io::sink(), OutputFormat::Text, false);

    let summary = decode_stream(reader, options, &mut printer).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", file.display());
        std::process::exit(1);
    });

    let mut stdout = io::stdout().lock();
    let written = output::write_summary(&mut stdout, &summary.stats).and_then(|()| {
        if options.strict {
            writeln!(stdout, "Checksum mismatches dropped: {}", summary.bad_checksums)?;
        }
        Ok(())
    });
    if let Err(e) = written {
        eprintln!("Error writing output: {e}");
        std::process::exit(1);
    }
}

fn cmd_listen(
    host: &str,
    port: u16,
    idle_timeout: Option<f64>,
    format: OutputFormat,
    include_errors: bool,
) {
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Error starting runtime: {e}");
        std::process::exit(1);
    });

    runtime.block_on(async {
        let socket = tokio::net::UdpSocket::bind((host, port))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error binding {host}:{port}: {e}");
                std::process::exit(1);
            });
        if let Ok(addr) = socket.local_addr() {
            info!(%addr, "listening for AIS sentences");
        }

        let mut pipeline = Pipeline::new(idle_timeout);
        let mut printer = Printer::new(io::stdout().lock(), format, include_errors);
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        };

        if let Err(e) = listen::serve(socket, &mut pipeline, &mut printer, shutdown).await {
            eprintln!("Error writing output: {e}");
            std::process::exit(1);
        }
        info!(messages = pipeline.stats().messages, "listener stopped");
    });
}

fn cmd_config(config: &Config, path: &Path, write: bool) {
    if write {
        if let Err(e) = config::save_config_to(config, path) {
            eprintln!("Error writing {}: {e}", path.display());
            std::process::exit(1);
        }
        println!("Wrote {}", path.display());
        return;
    }

    println!("# {}", path.display());
    print!("{}", config::serialize_config(config));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
