//! History listing.

use anyhow::Result;

use scriptrun::{store::HistoryLog, Config};

use crate::printer::TextPrinter;

pub fn list(cfg: &Config, limit: Option<usize>, json: bool) -> Result<()> {
    let mut records = HistoryLog::from_config(cfg).list()?;
    if let Some(n) = limit {
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let printer = TextPrinter::for_terminal(cfg.get("DEFAULT_COLOR"));
    for r in records {
        println!(
            "{} {} {} ({}ms)",
            r.finished_at.format("%Y-%m-%d %H:%M:%S"),
            printer.paint(&r.script_id, "cyan"),
            r.outcome.status,
            r.outcome.elapsed_millis
        );
    }
    Ok(())
}
