use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use fitgate::{
    cli::{self, Resource},
    config::{self, Config},
    error,
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
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// CRM base URL, overrides CRM_BASE_URL
    #[clap(long, global = true)]
    crm_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the REST server
    Serve(ServeOptions),

    /// Fetch one resource from the CRM and print it
    Check(CheckOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Listen address, overrides SERVER_ADDRESS
    #[clap(long)]
    addr: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckOptions {
    #[clap(long, value_enum, default_value_t = Resource::Branches)]
    resource: Resource,

    /// Schedule date (YYYY-MM-DD), defaults to today
    #[clap(long)]
    date: Option<String>,

    /// Schedule branch ID
    #[clap(long, default_value_t = 0)]
    branch: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn load_config(crm_url: Option<String>) -> Config {
    // the flag must count before the required-value check
    let lookup = |key: &str| match key {
        "CRM_BASE_URL" if crm_url.is_some() => crm_url.clone(),
        _ => std::env::var(key).ok(),
    };

    match Config::from_lookup(lookup) {
        Ok(config) => config,
        Err(e) => error!("Cannot load configuration. Err: {}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => {
            let config = load_config(cli.crm_url).with_server_address(opt.addr);
            cli::serve(config).await
        }
        Command::Check(opt) => {
            cli::check(load_config(cli.crm_url), opt.resource, opt.date, opt.branch).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
