use std::net::SocketAddr;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use vibecraft::{
    config::{self, Config, StoreKind},
    error, info, server, success, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the login and playlist web server
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS
    #[clap(long)]
    addr: Option<SocketAddr>,

    /// Session store backend, overrides SESSION_STORE
    #[clap(long, value_enum)]
    store: Option<StoreKind>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vibecraft=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => {
            init_tracing();

            if let Err(e) = config::load_env().await {
                warning!("Cannot load .env file, using process environment. Err: {}", e);
            }

            let mut config = match Config::from_env() {
                Ok(config) => config,
                Err(e) => error!("Invalid configuration: {}", e),
            };
            if let Some(addr) = opt.addr {
                config.server_addr = addr;
            }
            if let Some(store) = opt.store {
                config.store = store;
            }

            info!("Using {:?} session store", config.store);

            let state = match server::AppState::from_config(&config).await {
                Ok(state) => state,
                Err(e) => error!("Failed to initialize session store: {}", e),
            };

            success!("Listening on http://{}", config.server_addr);
            if let Err(e) = server::serve(config.server_addr, state).await {
                error!("Server stopped: {}", e);
            }
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
