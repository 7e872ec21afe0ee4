use anyhow::Context;
use clap::{Parser, Subcommand};

use biblio_app::App;
use biblio_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "biblio", version, about = "Biblio library catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run migrations and serve the HTTP API
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the merged OpenAPI document as JSON
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Biblio settings")?;
    biblio_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            App::bootstrap(settings).await?.serve().await
        }
        Command::Migrate => {
            let applied = App::migrate(&settings).await?;
            for migration in &applied {
                println!("applied {}/{}", migration.module, migration.id);
            }
            println!("{} migration(s) applied", applied.len());
            Ok(())
        }
        Command::Openapi => {
            let spec = App::openapi(&settings)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&spec).context("failed to render OpenAPI")?
            );
            Ok(())
        }
    }
}
