use clap::{Parser, Subcommand};
use oc_auth::exchange::{Exchange, LineSink, LineSource};
use oc_auth::responder::{ConsoleResponder, Responder, ScriptedResponder};
use oc_auth::{Config, Outcome};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "oc-auth")]
#[command(about = "Interactive authentication exchange for OpenConnect-compatible VPN daemons")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the authentication exchange over stdin/stdout
    ///
    /// Prompt records are read from stdin and answer batches are written to
    /// stdout, so the daemon's control channel can be piped straight
    /// through. Prompts and logging go to stderr.
    Run {
        /// Answer fields from a JSON file instead of prompting
        #[arg(short, long)]
        answers: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Generate default config file
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging
    // Everything goes to stderr; stdout belongs to the control channel
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { answers, config } => {
            let config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::discover(),
            };
            run_exchange(&config, answers.as_deref())?;
        }
        Commands::Init => {
            let config = Config::default();
            let path = PathBuf::from("oc-auth.toml");
            config.save(&path)?;
            println!("Created default config: oc-auth.toml");
        }
    }

    Ok(())
}

fn run_exchange(
    config: &Config,
    answers: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match answers {
        Some(path) => {
            info!("Answering from file: {}", path.display());
            drive(config, ScriptedResponder::from_file(path)?)
        }
        None => drive(config, ConsoleResponder::new(config.prompt.title.clone())),
    }
}

fn drive<R: Responder>(config: &Config, responder: R) -> Result<(), Box<dyn std::error::Error>> {
    let source = LineSource::new(io::BufReader::new(io::stdin()));
    let sink = LineSink::new(io::stdout());

    let mut exchange = Exchange::new(source, sink, responder);
    if let Some(timeout) = config.answer_timeout() {
        exchange = exchange.with_answer_timeout(timeout);
    }

    // Ctrl+C declines the connection instead of killing us mid-write
    let cancel = exchange.reply_handle();
    ctrlc::set_handler(move || cancel.cancel())?;

    match exchange.run() {
        Ok(Outcome::Completed) => {
            info!("Authentication exchange completed");
            Ok(())
        }
        Ok(Outcome::Cancelled) => {
            info!("Authentication exchange cancelled");
            std::process::exit(2);
        }
        Err(e) => {
            error!("Authentication exchange failed: {}", e);
            std::process::exit(1);
        }
    }
}
