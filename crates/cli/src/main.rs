use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "askline")]
#[command(about = "Askline — LINE webhook Q&A bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook server. Reads LINE_CHANNEL_ACCESS (required) plus
    /// LINE_CHANNEL_SECRET and ANSWER_COOKIES (optional) from the environment.
    Serve {
        /// HTTP port (default from PORT env or 3000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from BIND env or 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("askline {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { port, bind }) => {
            if let Err(e) = run_serve(port, bind).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(port: Option<u16>, bind: Option<String>) -> anyhow::Result<()> {
    let mut config = lib::config::load_config()?;
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(b) = bind {
        config.server.bind = b;
    }

    let answer = Arc::new(lib::answer::AnswerClient::new(
        config.answer.base_url.clone(),
        config.answer.cookies.clone(),
    ));
    let messaging = Arc::new(lib::line::LineClient::new(
        config.line.channel_access_token.clone(),
        config.line.api_base.clone(),
    ));

    log::info!(
        "starting askline on {}:{}",
        config.server.bind,
        config.server.port
    );
    lib::server::run_server(config, answer, messaging).await
}
