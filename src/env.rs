use std::path::Path;

use anyhow::Context;
use tracing::info;

/// Layers env files onto the process environment: `.env` first, then the
/// profile-specific overrides. Missing files are skipped silently so a bare
/// checkout still starts in demo mode.
pub fn load_environment() -> anyhow::Result<()> {
    let profile = std::env::var("APP_PROFILE").unwrap_or_else(|_| "development".to_string());

    for file in [".env".to_string(), format!("config/{}.env", profile)] {
        load_env_file(&file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> anyhow::Result<()> {
    if !Path::new(path).exists() {
        return Ok(());
    }

    dotenvy::from_filename_override(path)
        .with_context(|| format!("Failed to load environment from {}", path))?;
    info!("Loaded environment from: {}", path);
    Ok(())
}
