use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};

use warrant::authz::loader;
use warrant::errors::WarrantError;
use warrant::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "warrant",
    version,
    about = "Attribute-based access control policy engine"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the check API (default)
    Serve,
    /// Evaluate a single query against the loaded policies and print the decision
    Check {
        #[arg(long)]
        role: String,
        #[arg(long)]
        action: String,
        #[arg(long)]
        resource: String,
        /// JSON object consulted by grant conditions
        #[arg(long, default_value = "{}")]
        context: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // all grants are registered before anything is served
    let registry = loader::load_policies(&settings.policies.dir)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => warrant::web::serve(&settings, registry).await?,
        Command::Check {
            role,
            action,
            resource,
            context,
        } => {
            let context: serde_json::Value =
                serde_json::from_str(&context).map_err(WarrantError::from)?;
            let decision = registry
                .can(role)
                .context(context)
                .execute(action)
                .on(&resource)?;
            let rendered = serde_json::to_string_pretty(&decision).map_err(WarrantError::from)?;
            println!("{rendered}");
        }
    }
    Ok(())
}
