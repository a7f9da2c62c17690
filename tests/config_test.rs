//! Configuration defaults, file round trips and environment-backed keys.

use anyhow::Result;
use safecheck::config::Config;
use safecheck::providers::create_providers;
use serial_test::serial;
use std::env;
use tempfile::TempDir;

#[test]
fn test_config_has_defaults() -> Result<()> {
    let config = Config::default();

    assert_eq!(config.output_dir, "output");
    assert_eq!(config.max_results_per_source, 10);
    assert_eq!(config.provider_timeout_secs, 10);
    assert_eq!(config.tech.github_min_stars, 10);
    assert_eq!(config.server.bind, "127.0.0.1:8000");
    assert!(config.web.enabled && config.papers.enabled && config.tech.enabled && config.apis.enabled);
    assert!(config.db_path().ends_with("projects.db"));

    Ok(())
}

#[test]
fn test_partial_file_fills_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("safecheck.toml");
    std::fs::write(&path, "output_dir = \"reports\"\n\n[tech]\nenabled = false\n")?;

    let config = Config::load_with_path(Some(path.display().to_string()))?;
    assert_eq!(config.output_dir, "reports");
    assert!(!config.tech.enabled);
    assert_eq!(config.tech.github_url, Config::default().tech.github_url);
    assert!(config.papers.enabled);

    Ok(())
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    assert!(Config::load_with_path(Some("/nonexistent/safecheck.toml".to_string())).is_err());
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set_value("max_results_per_source", "25")?;
    config.set_value("server.bind", "0.0.0.0:9000")?;
    config.save_to_path(&path)?;

    let reloaded = Config::load_from_path(&path)?;
    assert_eq!(reloaded, config);
    assert_eq!(reloaded.max_results_per_source, 25);
    assert_eq!(reloaded.server.bind, "0.0.0.0:9000");

    Ok(())
}

#[test]
fn test_disabled_sources_build_fewer_providers() -> Result<()> {
    let mut config = Config::default();
    config.set_value("web.enabled", "false")?;
    let set = create_providers(&config, false)?;
    assert_eq!(set.enabled_count(), 3);
    assert!(set.web.is_none());
    Ok(())
}

#[test]
#[serial]
fn test_api_keys_come_from_named_env_vars() {
    let mut config = Config::default();
    config.api_keys.github_env = Some("SAFECHECK_TEST_GH".to_string());

    env::remove_var("SAFECHECK_TEST_GH");
    assert!(config.github_token().is_none());

    env::set_var("SAFECHECK_TEST_GH", "ghp_secret");
    let token = config.github_token();
    assert_eq!(token.as_ref().map(|t| t.expose()), Some("ghp_secret"));
    assert_eq!(format!("{:?}", token), "Some(***)");

    env::remove_var("SAFECHECK_TEST_GH");
}
