//! Command line front end.
//!
//! ```text
//! rs232c <PORT> <FILE> <RESPONSE_LENGTH> [WAIT_MS]
//! ```
//!
//! Example: send `command.bin` to COM1, expect 10 reply bytes within 2000 ms,
//! and keep the diagnostics in a file:
//!
//! ```text
//! rs232c COM1 command.bin 10 2000 2> error.log
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use log::debug;

use rs232c::constants::DEFAULT_WAIT_MS;
use rs232c::{ports, Settings, Transaction};

/// Send a file to a serial device and check that the expected number of reply
/// bytes arrives before the deadline.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Serial port, e.g. COM1 or /dev/ttyUSB0
    port: Option<String>,

    /// File whose contents are sent as one frame
    file: Option<PathBuf>,

    /// Number of reply bytes the device should send
    response_length: Option<usize>,

    /// How long to wait for the reply, in milliseconds
    #[arg(default_value_t = DEFAULT_WAIT_MS)]
    wait_ms: u64,

    /// Serial settings file (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the available serial ports and exit
    #[arg(short, long)]
    list_ports: bool,
}

fn print_port_list() {
    println!("[-- COM Port List --]");
    match ports::list_ports() {
        Ok(names) => {
            for name in names {
                println!("{}", name);
            }
        }
        Err(e) => debug!("Port enumeration failed: {}", e),
    }
}

fn show_usage() {
    let mut command = Cli::command();
    if let Err(e) = command.print_help() {
        debug!("Cannot print usage: {}", e);
    }
    println!();
    print_port_list();
}

fn run(port: &str, file: PathBuf, response_length: usize, cli: &Cli) -> rs232c::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let payload = Transaction::load_payload(&file)?;

    let mut tx = Transaction::new(port, settings, payload, response_length)
        .with_wait(Duration::from_millis(cli.wait_ms));

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let report = tx.run(&mut stdout, &mut stderr)?;
    if let Err(e) = stdout.flush() {
        debug!("Cannot flush trace output: {}", e);
    }

    debug!(
        "{} of {} bytes received: {:?}",
        report.received.len(),
        report.expected_len,
        report.verdict
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.list_ports {
        print_port_list();
        return ExitCode::SUCCESS;
    }

    let (Some(port), Some(file), Some(response_length)) =
        (cli.port.clone(), cli.file.clone(), cli.response_length)
    else {
        show_usage();
        return ExitCode::FAILURE;
    };

    match run(&port, file, response_length, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
