use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use directories::ProjectDirs;
use vcamera_prefs::MediumConfiguration;

/// Environment variable overriding the database directory.
pub const CONFIG_DIR_ENV: &str = "VCPREFS_CONFIG_DIR";

const DB_NAME: &str = "vcamera";

/// Resolve where the settings database lives.
///
/// An explicit directory wins, otherwise the platform config directory is used
/// (e.g. `~/.config/vcamera` on Linux).
pub(crate) fn medium_configuration(config_dir: Option<PathBuf>) -> Result<MediumConfiguration> {
    let folder_path = match config_dir {
        Some(dir) => dir,
        None => ProjectDirs::from("dev", "vcamera", "vcamera")
            .ok_or_else(|| eyre!("Config directory not found (HOME environment variable not set)"))?
            .config_dir()
            .to_path_buf(),
    };

    Ok(MediumConfiguration::Sqlite {
        db_name: DB_NAME.to_string(),
        folder_path,
    })
}
