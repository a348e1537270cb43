use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{default_config_toml, CONFIG_FILE_NAME};

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    write_default_config(&config_path, force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}

pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }
    let contents = format!("# codeprint configuration\n\n{}", default_config_toml());
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
