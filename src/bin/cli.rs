//! browser-readiness CLI
//!
//! Runs one readiness-gated operation against a launched or attached browser and
//! prints the result as JSON. Failures print the structured error report.

use browser_readiness::{
    BrowserSession, ClickOptions, ConnectionOptions, LaunchOptions, TypeOptions, WaitConditions,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "browser-readiness")]
#[command(version)]
#[command(about = "Wait for and interact with page elements over CDP", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H', global = true)]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH", global = true)]
    chrome_path: Option<String>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL", global = true)]
    ws_endpoint: Option<String>,

    /// Page to open before running the command
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wait until an element is visible, enabled and stable
    Ready {
        selector: String,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Wait for a combination of page conditions
    Wait {
        #[arg(long)]
        element: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Regular expression for the current URL
        #[arg(long = "url-pattern")]
        url_pattern: Option<String>,
        #[arg(long)]
        network_idle_ms: Option<u64>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Click an element once it is ready
    Click {
        selector: String,
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Hover and focus before waiting for readiness
        #[arg(long)]
        ensure_interactive: bool,
    },
    /// Type text into an element once it is ready
    Type {
        selector: String,
        text: String,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize result: {}", e),
    }
}

/// Runs the command; `Ok(false)` means it completed without reaching its goal
async fn run(session: &BrowserSession, cli: Cli) -> browser_readiness::Result<bool> {
    if let Some(url) = &cli.url {
        let loaded = session.navigate(url).await?;
        log::info!("Navigated to {}", loaded);
    }

    let reached = match cli.command {
        Command::Ready { selector, timeout_ms } => {
            let result = session.wait_for_ready(&selector, timeout_ms).await?;
            print_json(&result);
            result.ready
        }
        Command::Wait { element, text, url_pattern, network_idle_ms, timeout_ms } => {
            let conditions = WaitConditions { element, text, url: url_pattern, network_idle_ms, timeout_ms };
            let outcome = session.wait_for(&conditions).await?;
            print_json(&outcome);
            outcome.success
        }
        Command::Click { selector, timeout_ms, ensure_interactive } => {
            let options = ClickOptions { timeout_ms, ensure_interactive };
            print_json(&session.click(&selector, &options).await?);
            true
        }
        Command::Type { selector, text, timeout_ms } => {
            print_json(&session.type_text(&selector, &text, &TypeOptions { timeout_ms }).await?);
            true
        }
    };

    Ok(reached)
}

fn exit_status(outcome: &browser_readiness::Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let session = match &cli.ws_endpoint {
        Some(endpoint) => {
            eprintln!("WebSocket endpoint: {}", endpoint);
            BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))
        }
        None => {
            let mut options = LaunchOptions::new().headless(!cli.headed);
            if let Some(path) = &cli.chrome_path {
                eprintln!("Browser executable: {}", path);
                options = options.chrome_path(path);
            }
            BrowserSession::launch(options)
        }
    };

    let outcome = run(&session, cli).await;

    if let Err(e) = session.disconnect().await {
        log::debug!("Disconnect failed: {}", e);
    }

    if let Err(e) = &outcome {
        print_json(&e.report());
    }
    ExitCode::from(exit_status(&outcome))
}
