use std::path::{Path, PathBuf};

use qmlbridge_lib::{BridgeError, Config};

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/qmlbridge/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, BridgeError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        BridgeError::Unclassified(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        BridgeError::Unclassified(prefix)
    })?;
    Ok(cfg)
}

/// `--store-dir` wins over the config file.
pub fn resolve_store_dir(cli_store_dir: Option<&Path>, config: &Config) -> PathBuf {
    cli_store_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.resolved_store_dir())
}

/// Log effective config to stderr (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, store_dir: &Path, config: &Config) {
    eprintln!("{}", format_effective_config(config_path, store_dir, config));
}

/// Format effective config as a single-line string. The API key is never printed.
pub fn format_effective_config(config_path: Option<&Path>, store_dir: &Path, config: &Config) -> String {
    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: store={}, fonts: api={}, key={}, timeout={}s, archive: level={}, upload: max={} bytes",
        store_dir.display(),
        config.fonts.api_url,
        if config.fonts.api_key.is_some() { "set" } else { "unset" },
        config.fonts.timeout.as_secs(),
        config.archive.compression_level,
        config.upload.max_size_bytes,
    )
}
