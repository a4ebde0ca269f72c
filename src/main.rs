use linglong::{GameAI, Session, Settings, app::App, logging};
use std::sync::Arc;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = Settings::load()?;
    let log_file = logging::init(settings.debug_mode)?;
    log::info!("Linglong start: {}", chrono::Local::now());
    log::debug!("Logging to {}", log_file.display());

    let gateway = GameAI::from_settings(&settings)?;
    log::info!("Game Master model: {}", settings.model);

    let mut app = App::new(Session::new(Arc::new(gateway)));
    app.run().await?;
    Ok(())
}
