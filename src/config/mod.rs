//! Configuration: `.scriptrunrc` key/value file overlaid by environment variables.

use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Environment takes precedence over the rc file
        for (k, v) in env::vars() {
            if let Some(key) = config_key(&k) {
                map.insert(key, v);
            }
        }

        Self {
            inner: map,
            config_path: config_path.to_path_buf(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.get_path("SCRATCH_PATH")
            .unwrap_or_else(|| temp_base().join("scratch"))
    }

    pub fn scripts_path(&self) -> PathBuf {
        self.get_path("SCRIPT_STORAGE_PATH")
            .unwrap_or_else(|| config_base().join("scripts"))
    }

    pub fn history_path(&self) -> PathBuf {
        self.get_path("HISTORY_PATH")
            .unwrap_or_else(|| temp_base().join("history"))
    }

    pub fn history_length(&self) -> usize {
        self.get_usize("HISTORY_LENGTH").unwrap_or(100)
    }
}

/// Interpreter invocation: program plus flags placed before the script path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
    pub args: Vec<String>,
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

impl std::fmt::Display for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}

/// Constants the engine runs under. Fixed for the lifetime of a `Runner`.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub interpreter: Interpreter,
    pub timeout: Duration,
    pub scratch_root: PathBuf,
    pub extension: String,
}

impl EngineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        let program = cfg
            .get("INTERPRETER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "python3".into());
        let args = cfg
            .get("INTERPRETER_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let timeout_ms = cfg
            .get_u64("EXEC_TIMEOUT_MS")
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let extension = cfg
            .get("SCRIPT_EXTENSION")
            .map(|e| e.trim_start_matches('.').to_string())
            .unwrap_or_else(|| "py".into());

        Self {
            interpreter: Interpreter {
                program,
                args,
            },
            timeout: Duration::from_millis(timeout_ms),
            scratch_root: cfg.scratch_path(),
            extension,
        }
    }
}

fn config_key(k: &str) -> Option<String> {
    const KEYS: &[&str] = &[
        "INTERPRETER",
        "INTERPRETER_ARGS",
        "EXEC_TIMEOUT_MS",
        "SCRATCH_PATH",
        "SCRIPT_EXTENSION",
        "SCRIPT_STORAGE_PATH",
        "HISTORY_PATH",
        "HISTORY_LENGTH",
        "DEFAULT_COLOR",
    ];

    if let Some(stripped) = k.strip_prefix("SCRIPTRUN_") {
        return Some(stripped.to_string());
    }
    KEYS.contains(&k).then(|| k.to_string())
}

fn config_base() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("scriptrun")
}

fn temp_base() -> PathBuf {
    env::temp_dir().join("scriptrun")
}

fn default_config_path() -> PathBuf {
    config_base().join(".scriptrunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let temp = temp_base();

    m.insert(
        "SCRATCH_PATH".into(),
        temp.join("scratch").to_string_lossy().into_owned(),
    );
    m.insert(
        "HISTORY_PATH".into(),
        temp.join("history").to_string_lossy().into_owned(),
    );
    m.insert(
        "SCRIPT_STORAGE_PATH".into(),
        config_base().join("scripts").to_string_lossy().into_owned(),
    );

    m.insert("INTERPRETER".into(), "python3".into());
    m.insert("INTERPRETER_ARGS".into(), String::new());
    m.insert("EXEC_TIMEOUT_MS".into(), DEFAULT_TIMEOUT_MS.to_string());
    m.insert("SCRIPT_EXTENSION".into(), "py".into());
    m.insert("HISTORY_LENGTH".into(), "100".into());
    m.insert("DEFAULT_COLOR".into(), "magenta".into());

    m
}
