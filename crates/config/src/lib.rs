use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Rotation mode ─────────────────────────────────────────────────────────────

/// Controls how the memory store is addressed over time.
///
/// | Mode      | Behaviour                                                      |
/// |-----------|----------------------------------------------------------------|
/// | `monthly` | One store file per UTC calendar month (`memory_YYYY-MM.mv2`).  |
/// | `single`  | Every record goes to one fixed store file.                     |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    #[default]
    Monthly,
    Single,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Append-only JSONL journal file.  Overridden at runtime by the
    /// `TURNLOG_JOURNAL_PATH` environment variable when set.
    pub path: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_workspace_file("conversation_log.jsonl"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Directory holding the memory store files.  Env override:
    /// `TURNLOG_MEMORY_DIR`.
    pub dir: String,
    /// Shard addressing mode.  Env override: `TURNLOG_ROTATION`
    /// (`monthly` or `single`; unrecognised values keep the default).
    pub rotation: RotationMode,
    /// Store file name used in `single` rotation mode.
    pub single_store: String,
    /// Path to the memvid binary.  Empty means search the fallback
    /// locations (see [`LoggerConfig::memvid_bin`]).  Env override:
    /// `TURNLOG_MEMVID_BIN`.
    pub bin: String,
    /// Wall-clock budget for one external store invocation, in seconds.
    pub timeout_secs: u64,
    /// Character budget for the content preview embedded in store titles.
    pub preview_chars: usize,
    /// How many leading characters of the session id go into the
    /// `session:` tag.
    pub session_prefix_chars: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
            rotation: RotationMode::Monthly,
            single_store: "memory.mv2".to_string(),
            bin: String::new(),
            timeout_secs: 30,
            preview_chars: 60,
            session_prefix_chars: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggerConfig {
    pub journal: JournalConfig,
    pub memory: MemoryConfig,
}

impl LoggerConfig {
    /// Load from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error — defaults apply.  Environment
    /// variables always win over file values so a wrapper script can
    /// redirect a single invocation without touching the config file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build a config purely from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("TURNLOG_JOURNAL_PATH") {
            if !path.is_empty() {
                self.journal.path = path;
            }
        }
        if let Ok(dir) = env::var("TURNLOG_MEMORY_DIR") {
            if !dir.is_empty() {
                self.memory.dir = dir;
            }
        }
        if let Ok(mode) = env::var("TURNLOG_ROTATION") {
            match mode.to_ascii_lowercase().as_str() {
                "monthly" => self.memory.rotation = RotationMode::Monthly,
                "single" => self.memory.rotation = RotationMode::Single,
                _ => {}
            }
        }
        if let Ok(bin) = env::var("TURNLOG_MEMVID_BIN") {
            if !bin.is_empty() {
                self.memory.bin = bin;
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Resolved memvid binary: explicit config value, else the npm global
    /// install location if it exists, else a bare `memvid` left to PATH
    /// resolution at spawn time.
    pub fn memvid_bin(&self) -> PathBuf {
        if !self.memory.bin.is_empty() {
            return PathBuf::from(&self.memory.bin);
        }
        let npm_global = home_dir().join(".npm-global/bin/memvid");
        if npm_global.exists() {
            return npm_global;
        }
        PathBuf::from("memvid")
    }

    /// Default location of the config file itself.
    pub fn default_path() -> PathBuf {
        home_dir().join(".openclaw/turnlog.toml")
    }
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn default_workspace_dir() -> String {
    home_dir().join(".openclaw/workspace").display().to_string()
}

fn default_workspace_file(name: &str) -> String {
    home_dir()
        .join(".openclaw/workspace")
        .join(name)
        .display()
        .to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
