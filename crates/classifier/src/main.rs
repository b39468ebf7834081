//! ONNX Image Classifier - Main Entry Point

use anyhow::Context;
use classifier::{init_logging, run, ClassifierConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = ClassifierConfig::load().context("Failed to load configuration")?;
    init_logging(config.log_format).context("Failed to initialize logging")?;

    info!("=== ONNX Image Classifier v{} ===", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&config, &mut out)
        .with_context(|| format!("Failed to classify {}", config.image_path.display()))?;

    Ok(())
}
