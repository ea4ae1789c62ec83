//! Saved defaults for the `taskreveal` command.
//!
//! Defaults are stored as command-line flags, one or more per line, in a
//! global config file and an optional `.taskrevealrc` in the working
//! directory. Later sources override earlier ones.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::reveal::{RevealTiming, Strategy};

/// Highlight duration used when `--highlight` is given without a value.
pub const DEFAULT_HIGHLIGHT_MS: u64 = 2_000;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub settle_ms: Option<u64>,
    pub poll_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub no_timeout: bool,
    pub highlight_ms: Option<u64>,
    pub rendered: bool,
    pub json: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            settle_ms: other.settle_ms.or(self.settle_ms),
            poll_ms: other.poll_ms.or(self.poll_ms),
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
            no_timeout: self.no_timeout || other.no_timeout,
            highlight_ms: other.highlight_ms.or(self.highlight_ms),
            rendered: self.rendered || other.rendered,
            json: self.json || other.json,
        }
    }

    /// Pipeline delays, falling back to the built-in defaults.
    pub fn timing(&self) -> RevealTiming {
        let defaults = RevealTiming::default();
        RevealTiming {
            settle_ms: self.settle_ms.unwrap_or(defaults.settle_ms),
            poll_interval_ms: self.poll_ms.unwrap_or(defaults.poll_interval_ms),
            ready_timeout_ms: if self.no_timeout {
                None
            } else {
                self.timeout_ms.or(defaults.ready_timeout_ms)
            },
        }
    }

    /// Highlight when a duration was given, otherwise select.
    pub fn strategy(&self) -> Strategy {
        self.highlight_ms
            .map_or(Strategy::SelectAndScroll, |duration_ms| {
                Strategy::TimedHighlight { duration_ms }
            })
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("taskreveal").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskreveal")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("taskreveal").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("taskreveal")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".taskrevealrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# taskreveal defaults (saved with --save)".to_string()];
    if let Some(ms) = flags.settle_ms {
        lines.push(format!("--settle-ms {ms}"));
    }
    if let Some(ms) = flags.poll_ms {
        lines.push(format!("--poll-ms {ms}"));
    }
    if let Some(ms) = flags.timeout_ms {
        lines.push(format!("--timeout-ms {ms}"));
    }
    if flags.no_timeout {
        lines.push("--no-timeout".to_string());
    }
    if let Some(ms) = flags.highlight_ms {
        lines.push(format!("--highlight={ms}"));
    }
    if flags.rendered {
        lines.push("--rendered".to_string());
    }
    if flags.json {
        lines.push("--json".to_string());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the saveable flags out of raw arguments, ignoring everything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let next = tokens.get(i + 1).and_then(|t| parse_ms(t));
        match token {
            "--no-timeout" => flags.no_timeout = true,
            "--rendered" => flags.rendered = true,
            "--json" => flags.json = true,
            "--highlight" => flags.highlight_ms = Some(DEFAULT_HIGHLIGHT_MS),
            "--settle-ms" | "--poll-ms" | "--timeout-ms" => {
                if let Some(ms) = next {
                    *ms_slot(&mut flags, token) = Some(ms);
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--highlight=") {
                    flags.highlight_ms = parse_ms(value);
                } else if let Some((name, value)) = token.split_once('=')
                    && matches!(name, "--settle-ms" | "--poll-ms" | "--timeout-ms")
                {
                    *ms_slot(&mut flags, name) = parse_ms(value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn ms_slot<'a>(flags: &'a mut ConfigFlags, name: &str) -> &'a mut Option<u64> {
    match name {
        "--settle-ms" => &mut flags.settle_ms,
        "--poll-ms" => &mut flags.poll_ms,
        _ => &mut flags.timeout_ms,
    }
}

fn parse_ms(s: &str) -> Option<u64> {
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&args(&[
            "taskreveal",
            "--settle-ms",
            "200",
            "--poll-ms=50",
            "--highlight",
            "--rendered",
            "tasks.md",
            "--text",
            "call mom",
        ]));
        assert_eq!(flags.settle_ms, Some(200));
        assert_eq!(flags.poll_ms, Some(50));
        assert_eq!(flags.highlight_ms, Some(DEFAULT_HIGHLIGHT_MS));
        assert!(flags.rendered);
        assert!(!flags.json);
    }

    #[test]
    fn test_bare_highlight_does_not_consume_file_argument() {
        let flags = parse_flag_tokens(&args(&["--highlight", "500"]));
        assert_eq!(flags.highlight_ms, Some(DEFAULT_HIGHLIGHT_MS));
    }

    #[test]
    fn test_timing_defaults_and_overrides() {
        assert_eq!(ConfigFlags::default().timing(), RevealTiming::default());

        let flags = ConfigFlags {
            settle_ms: Some(10),
            timeout_ms: Some(900),
            ..ConfigFlags::default()
        };
        let timing = flags.timing();
        assert_eq!(timing.settle_ms, 10);
        assert_eq!(timing.poll_interval_ms, 100);
        assert_eq!(timing.ready_timeout_ms, Some(900));
    }

    #[test]
    fn test_no_timeout_wins_over_timeout_value() {
        let flags = ConfigFlags {
            timeout_ms: Some(900),
            no_timeout: true,
            ..ConfigFlags::default()
        };
        assert_eq!(flags.timing().ready_timeout_ms, None);
    }

    #[test]
    fn test_strategy_follows_highlight_flag() {
        assert_eq!(ConfigFlags::default().strategy(), Strategy::SelectAndScroll);
        let flags = ConfigFlags {
            highlight_ms: Some(750),
            ..ConfigFlags::default()
        };
        assert_eq!(
            flags.strategy(),
            Strategy::TimedHighlight { duration_ms: 750 }
        );
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            rendered: true,
            settle_ms: Some(500),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            json: true,
            settle_ms: Some(100),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.rendered);
        assert!(merged.json);
        assert_eq!(merged.settle_ms, Some(100));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            settle_ms: Some(120),
            poll_ms: Some(40),
            timeout_ms: Some(3_000),
            no_timeout: true,
            highlight_ms: Some(800),
            rendered: true,
            json: true,
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
