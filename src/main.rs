use std::error::Error;

use race_results_eda::{
    handlers::{acquisition::load_race_results, render::render_all},
    utils::{config::Config, logging},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let config = Config::init();
    logging::init(&config.log_level);
    info!(output_dir = %config.output_dir.display(), "Configuration loaded successfully");

    let rows = load_race_results(&config).await?;
    let figures = render_all(&rows, &config)?;

    info!(
        histograms = %figures.histograms.display(),
        overview = %figures.overview.display(),
        "Figures rendered"
    );
    Ok(())
}
