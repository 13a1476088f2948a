//! Configuration loading and parsing.
//!
//! Parses `notevim.toml` (or an override path provided by the binary) into
//! [`ConfigFile`]. Missing files and parse errors fall back to defaults so a
//! broken config never prevents editing. Unknown fields are ignored.
//!
//! Numeric options are clamped when converted to [`EditorOptions`]; the raw
//! parsed values are kept in `Config::file`.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

const INDENT_RANGE: std::ops::RangeInclusive<usize> = 1..=16;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_shiftwidth")]
    pub shiftwidth: usize,
    #[serde(default = "EditorConfig::default_tabstop")]
    pub tabstop: usize,
    #[serde(default = "EditorConfig::default_expandtab")]
    pub expandtab: bool,
    /// Line-count threshold above which linewise changes are reported.
    #[serde(default)]
    pub report: usize,
    #[serde(default = "EditorConfig::default_undo_history")]
    pub undo_history: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            shiftwidth: Self::default_shiftwidth(),
            tabstop: Self::default_tabstop(),
            expandtab: Self::default_expandtab(),
            report: 0,
            undo_history: Self::default_undo_history(),
        }
    }
}

impl EditorConfig {
    const fn default_shiftwidth() -> usize {
        4
    }
    const fn default_tabstop() -> usize {
        8
    }
    const fn default_expandtab() -> bool {
        true
    }
    const fn default_undo_history() -> usize {
        200
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Accept a register selector after count1 (`3"add`) as well as before it.
    #[serde(default = "ParserConfig::default_register_after_count")]
    pub register_after_count: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            register_after_count: Self::default_register_after_count(),
        }
    }
}

impl ParserConfig {
    const fn default_register_after_count() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Effective options consumed by the modal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub shiftwidth: usize,
    pub tabstop: usize,
    pub expandtab: bool,
    pub report: usize,
    pub undo_history: usize,
    pub register_after_count: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Config::default().options()
    }
}

/// Config path: local `notevim.toml` first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("notevim.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("notevim").join("notevim.toml");
    }
    PathBuf::from("notevim.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            info!(target: "config", path = %path.display(), error = %err, "config_missing_using_defaults");
            return Ok(Config::default());
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(err) => {
            info!(target: "config", path = %path.display(), error = %err, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

fn clamp_indent(name: &'static str, raw: usize) -> usize {
    let clamped = raw.clamp(*INDENT_RANGE.start(), *INDENT_RANGE.end());
    if clamped != raw {
        info!(target: "config", option = name, raw, clamped, "indent_option_clamped");
    }
    clamped
}

impl Config {
    /// Effective options with numeric values clamped to their valid ranges.
    pub fn options(&self) -> EditorOptions {
        let editor = &self.file.editor;
        EditorOptions {
            shiftwidth: clamp_indent("shiftwidth", editor.shiftwidth),
            tabstop: clamp_indent("tabstop", editor.tabstop),
            expandtab: editor.expandtab,
            report: editor.report,
            undo_history: editor.undo_history.max(1),
            register_after_count: self.file.parser.register_after_count,
        }
    }
}
