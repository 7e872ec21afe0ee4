use anyhow::Context;
use biblio_app::App;
use biblio_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Biblio settings")?;
    biblio_telemetry::init(&settings.telemetry);

    App::bootstrap(settings).await?.serve().await
}
