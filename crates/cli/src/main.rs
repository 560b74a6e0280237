use anyhow::Context;
use clap::{Parser, Subcommand};
use gateway_kernel::Settings;

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "IPA gateway control")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective settings as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load gateway settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => ipa_gateway::run(settings).await,
        Command::Migrate => {
            gateway_telemetry::init(&settings.telemetry)?;
            let registry = ipa_gateway::build_registry()?;
            let pool = gateway_db::connect(&settings.database).await?;
            let applied = ipa_gateway::migrate(&registry, &pool).await?;
            pool.close().await;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
