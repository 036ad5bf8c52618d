use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::path::Path;
use tracing::warn;

pub fn load_app_settings() -> Result<AppSettings> {
    // Need to load from dotenv so secrets in .env can overwrite the yaml values.
    dotenv::from_path(".env").ok();
    let settings = load_settings_from_path(Path::new("config/settings.yaml"))?;

    if settings.secrets.replicate_api_token.is_empty() {
        warn!("No replicate api token configured, synthesis calls will be rejected upstream.");
    }
    if !settings.catalog.data_file.exists() {
        warn!(
            "Catalog file {} does not exist yet.",
            settings.catalog.data_file.display()
        );
    }

    Ok(settings)
}

/// Read a settings file, with `APP__*` environment overrides on top.
pub fn load_settings_from_path(path: &Path) -> Result<AppSettings> {
    let config_path = path.canonicalize()?;

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    Ok(raw_settings.into())
}
