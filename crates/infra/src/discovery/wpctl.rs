//! `wpctl status` based target discovery

use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info, trace};
use volmix_core::domain::{
    Category, DiscoveryConfig, DiscoveryError, Target, TargetDirectory, TargetDiscovery, TargetId,
};

/// Characters `wpctl` uses to draw its tree, plus the default-node marker
const TREE_GLYPHS: &[char] = &['│', '├', '└', '─', '*', ' ', '\t'];

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\s│├└─*]*(\d+)\.\s+(.+)$").expect("entry pattern is a valid regex")
    })
}

/// Runs a `wpctl status` compatible command and parses its output
#[derive(Debug, Clone)]
pub struct WpctlDiscovery {
    command: String,
    args: Vec<String>,
}

impl WpctlDiscovery {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for WpctlDiscovery {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl TargetDiscovery for WpctlDiscovery {
    fn discover(&self) -> Result<TargetDirectory, DiscoveryError> {
        debug!(command = %self.command_line(), "Running target discovery");

        let output = Command::new(&self.command)
            .args(&self.args)
            .output()
            .map_err(|source| DiscoveryError::Spawn {
                command: self.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(DiscoveryError::CommandFailed {
                command: self.command_line(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| DiscoveryError::InvalidOutput(e.to_string()))?;
        let directory = parse_status(&text);

        info!(targets = directory.len(), "Targets discovered");
        Ok(directory)
    }
}

/// Parse `wpctl status` output.
///
/// Only the `Audio` group is considered. `Sinks` are outputs, `Sources` and
/// `Filters` are inputs and `Streams` are applications; entries under any
/// other header are ignored. Stream port lines (`>` / `<` links) are skipped.
pub fn parse_status(text: &str) -> TargetDirectory {
    let mut directory = TargetDirectory::new();
    let mut in_audio = false;
    let mut category: Option<Category> = None;

    for line in text.lines() {
        if !line.starts_with(TREE_GLYPHS) && !line.trim().is_empty() {
            in_audio = line.trim() == "Audio";
            category = None;
            continue;
        }

        let Some(caps) = entry_pattern().captures(line) else {
            let content = line.trim_start_matches(TREE_GLYPHS).trim_end();
            if let Some(header) = content.strip_suffix(':') {
                category = match header {
                    "Sinks" => Some(Category::Output),
                    "Sources" | "Filters" => Some(Category::Input),
                    "Streams" => Some(Category::Application),
                    _ => None,
                };
            }
            continue;
        };
        let Some(category) = category.filter(|_| in_audio) else {
            continue;
        };

        let rest = &caps[2];
        if rest.contains(" > ") || rest.contains(" < ") {
            trace!(line, "Skipping stream port");
            continue;
        }
        let name = rest.split('[').next().unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }

        directory.insert(Target::new(TargetId::new(&caps[1]), category, name));
    }

    directory
}
