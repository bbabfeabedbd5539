use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Loads `Settings` from `./configuration/base.yaml` layered with `APP_` prefixed
/// environment variables, e.g. `APP_SCRAPER__OUTPUT_DIR`.
///
/// The file is optional; anything it leaves out falls back to the serde defaults
/// declared on `Settings`.
pub fn config<Settings: DeserializeOwned>() -> anyhow::Result<Settings> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    config_from_directory(&base_path.join("configuration"))
}

pub fn config_from_directory<Settings: DeserializeOwned>(
    configuration_directory: &Path,
) -> anyhow::Result<Settings> {
    let file = if cfg!(test) { "test.yaml" } else { "base.yaml" };
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join(file)).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Failed to build configuration")?;

    settings
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}
