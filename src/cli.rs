use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "scriptrun", about = "Run stored scripts with a hard timeout", version)]
#[command(group(ArgGroup::new("mode").args(["add_script", "remove_script", "list_scripts", "list_history"]).multiple(false)))]
pub struct Cli {
    /// Id of the stored script to run (or the history id when used with --file).
    #[arg(value_name = "ID")]
    pub id: Option<String>,

    /// Run this file instead of a stored script; with --add-script, the file to store.
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    /// Store the script given by --file under this id.
    #[arg(long = "add-script", requires = "file")]
    pub add_script: Option<String>,

    /// Delete a stored script.
    #[arg(long = "remove-script")]
    pub remove_script: Option<String>,

    /// List stored script ids.
    #[arg(short = 'l', long = "list-scripts", visible_alias = "ls")]
    pub list_scripts: bool,

    /// Show outcomes of past runs.
    #[arg(long = "list-history", visible_alias = "lh")]
    pub list_history: bool,

    /// Show only the most recent N history entries.
    #[arg(long, requires = "list_history")]
    pub limit: Option<usize>,

    /// Debug logging (overrides RUST_LOG).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
