use anyhow::Context;
use slotdesk_core::config::Config;
use slotdesk_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing slotdesk in: {}", root.display());

    let data_dir = paths::data_dir(root);
    io::ensure_dir(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new()
            .save(root)
            .with_context(|| format!("failed to write {}", paths::CONFIG_FILE))?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    println!("\nNext: add an account with 'slotdesk user add <username>'.");
    Ok(())
}
