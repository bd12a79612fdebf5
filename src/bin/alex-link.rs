use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use alex_link::command::{CommandRegistry, CommandRequest, Parsed};
use alex_link::handler::{describe_rejection, Report};
use alex_link::protocol::Inbound;
use alex_link::transport::{SerialTransport, Transport};
use alex_link::{CancelToken, Link, LinkConfig, LinkError, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "alex-link",
    about = "Drive the Alex robot over its serial link",
    version
)]
struct Cli {
    /// JSON config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serial device, overrides the config file.
    #[arg(long, value_name = "DEVICE")]
    port: Option<String>,

    /// Line speed, overrides the config file.
    #[arg(long, value_name = "BAUD")]
    baud: Option<u32>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print reports as JSON lines.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("alex-link: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_level);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("alex-link: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<LinkConfig> {
    let mut config = match &cli.config {
        Some(path) => LinkConfig::from_file(path)?,
        None => LinkConfig::default(),
    };
    if let Some(port) = &cli.port {
        config.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if cli.json {
        config.json_reports = true;
    }
    Ok(config)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("alex_link={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(config: &LinkConfig) -> Result<()> {
    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel)?;

    let transport = SerialTransport::open(config)?;
    tracing::info!(
        "Waiting {} ms for the device to reboot",
        config.reboot_delay_ms
    );
    std::thread::sleep(config.reboot_delay());

    let mut link = Link::with_cancel_token(transport, cancel.clone());
    let outcome = session(&mut link, config);
    settle(outcome, &cancel)?;

    link.into_transport();
    println!("Closing connection to Arduino.");
    Ok(())
}

/// First Ctrl-C cancels the link; a second one exits at once (e.g. when
/// blocked on stdin).
fn install_interrupt_handler(cancel: &CancelToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        tracing::info!("Interrupt received, stopping");
        token.cancel();
    })
    .map_err(|e| LinkError::Io(io::Error::new(io::ErrorKind::Other, e)))
}

/// Cancellation is a clean stop, including a handshake cut short by it.
fn settle(outcome: Result<()>, cancel: &CancelToken) -> Result<()> {
    match outcome {
        Err(err) if err.is_cancelled() => {
            tracing::info!("Link cancelled");
            Ok(())
        }
        Err(LinkError::HandshakeMismatch { observed: None }) if cancel.is_cancelled() => {
            tracing::info!("Handshake cancelled");
            Ok(())
        }
        other => other,
    }
}

fn session<T: Transport>(link: &mut Link<T>, config: &LinkConfig) -> Result<()> {
    link.handshake()?;

    let cancel = link.cancel_token();
    let registry = CommandRegistry::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("{}", registry.help());
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if cancel.is_cancelled() {
            return Err(LinkError::Cancelled);
        }

        let request = match read_request(&registry, &line, &mut lines) {
            Ok(Some(Parsed::Command(request))) => request,
            Ok(Some(Parsed::Quit)) | Ok(None) => {
                cancel.cancel();
                break;
            }
            Ok(Some(Parsed::NeedParams { spec, .. })) => {
                println!("Too few parameters for '{}'", spec.token);
                continue;
            }
            Err(err @ (LinkError::UnknownCommand(_) | LinkError::InvalidInput(_))) => {
                println!("Bad command: {err}");
                continue;
            }
            Err(err) => return Err(err),
        };

        exchange(link, &request, config.json_reports)?;
    }
    Ok(())
}

/// Parse a line, prompting once for missing params. `None` means stdin closed.
fn read_request(
    registry: &CommandRegistry,
    line: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Option<Parsed>> {
    let (spec, given) = match registry.parse(line)? {
        Parsed::NeedParams { spec, given } => (spec, given),
        parsed => return Ok(Some(parsed)),
    };

    if let Some(prompt) = spec.prompt {
        println!("{prompt}");
    }
    io::stdout().flush()?;
    match lines.next().transpose()? {
        Some(more) => registry.complete(&spec, &given, &more).map(Some),
        None => Ok(None),
    }
}

fn exchange<T: Transport>(
    link: &mut Link<T>,
    request: &CommandRequest,
    json: bool,
) -> Result<()> {
    link.send(request)?;
    match link.receive()? {
        Inbound::Packet(packet) => {
            let report = Report::from_packet(&packet);
            if json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{report}");
            }
        }
        Inbound::Rejected(err) => {
            if json {
                let line = serde_json::json!({
                    "kind": "rejected",
                    "error": describe_rejection(&err),
                });
                println!("{line}");
            } else {
                println!("PACKET ERROR");
                println!("{}", describe_rejection(&err));
            }
        }
    }
    Ok(())
}
