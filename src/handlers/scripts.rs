//! Script storage commands.

use std::path::Path;

use anyhow::{bail, Context, Result};

use scriptrun::{store::ScriptStore, Config};

use crate::printer::TextPrinter;

pub fn add(cfg: &Config, id: &str, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading script file: {}", file.display()))?;
    let path = ScriptStore::from_config(cfg).write(id, &content)?;
    println!("Stored {} at {}", id, path.display());
    Ok(())
}

pub fn remove(cfg: &Config, id: &str) -> Result<()> {
    if !ScriptStore::from_config(cfg).remove(id)? {
        bail!("script not found: {}", id);
    }
    println!("Removed {}", id);
    Ok(())
}

pub fn list(cfg: &Config) -> Result<()> {
    let printer = TextPrinter::for_terminal(cfg.get("DEFAULT_COLOR"));
    for id in ScriptStore::from_config(cfg).list()? {
        printer.print(&id);
    }
    Ok(())
}
