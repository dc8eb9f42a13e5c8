use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use toml::{map::Map, Value};

pub fn workspace_dir() -> anyhow::Result<PathBuf> {
    let output = std::process::Command::new(env!("CARGO"))
        .arg("locate-project")
        .arg("--workspace")
        .arg("--message-format=plain")
        .output()
        .context("failed to run cargo locate-project")?;

    ensure!(
        output.status.success(),
        "cargo locate-project exited with {}",
        output.status
    );

    let stdout = std::str::from_utf8(&output.stdout)
        .context("cargo locate-project printed invalid utf-8")?;
    let cargo_path = Path::new(stdout.trim());

    cargo_path
        .parent()
        .map(Path::to_path_buf)
        .context("workspace manifest has no parent directory")
}

pub fn load_config(config_name: &str) -> anyhow::Result<Map<String, Value>> {
    load_toml(&workspace_dir()?.join(config_name))
}

pub fn load_env(secrets_name: &str) -> anyhow::Result<Map<String, Value>> {
    load_toml(&workspace_dir()?.join(secrets_name))
}

pub fn load_toml(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    toml::from_str::<Map<String, Value>>(&text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Looks `key` up in the process environment first, then in `secrets`.
pub fn secret(secrets: &Map<String, Value>, key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| {
            secrets
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}
