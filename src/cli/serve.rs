use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::providers::create_providers;
use crate::server::{self, AppState};
use crate::store::ProjectStore;

pub async fn run(config_path: Option<String>, bind: Option<String>, dry_run: bool) -> Result<()> {
    let config = Config::load_with_path(config_path)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    let store = ProjectStore::open(&config.db_path())?;
    info!("Project database: {}", config.db_path().display());
    let providers = create_providers(&config, dry_run)?;

    let state = AppState::new(config, store, providers);
    server::serve(state, &bind).await?;
    Ok(())
}
