use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;

pub fn run(config_path: Option<String>, show: bool, set: Option<Vec<String>>) -> Result<()> {
    if let Some(pair) = set {
        let [key, value] = pair.as_slice() else {
            bail!("--set expects exactly KEY VALUE");
        };
        let target = Config::write_path(config_path.as_deref());
        set_and_save(&target, key, value)?;
        println!("✅ Saved {} = {} ({})", key, value, target.display());
        if !show {
            return Ok(());
        }
    }

    let config = Config::load_with_path(config_path)?;
    println!("\n⚙️  Current configuration\n{}", "=".repeat(60));
    println!("{}", config.to_toml()?);
    Ok(())
}

/// Update one key in the file at `target`, starting from defaults if it doesn't exist yet.
pub fn set_and_save(target: &Path, key: &str, value: &str) -> Result<Config> {
    let mut config = if target.exists() {
        Config::load_from_path(target)?
    } else {
        Config::default()
    };
    config.set_value(key, value)?;
    config.save_to_path(target)?;
    info!("Updated {} in {}", key, target.display());
    Ok(config)
}
