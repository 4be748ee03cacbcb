/// Config file loading and creation for the bestworst CLI.
///
/// Config lives at ~/.config/bestworst/config.toml.
/// All fields are optional; CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BestworstConfig {
    pub iterations: Option<usize>,
    pub per_trial: Option<usize>,
    pub generator: Option<String>,
    pub dummy_anchors: Option<bool>,
    pub methods: Option<Vec<String>>,
    pub separator: Option<String>,
    pub seed: Option<u64>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# bestworst configuration
# All values here can be overridden by CLI flags.

# Passes over the pairings for Elo, Value and RW scoring
# iterations = 100

# Items shown per trial (K)
# per_trial = 4

# Trial generator: random, even, norepeat, norepeateven or semirandom
# generator = \"norepeateven\"

# Bound the iterative scores with always-win / always-lose anchors
# dummy_anchors = true

# Scoring methods, in output column order
# methods = [\"Value\", \"Elo\", \"RW\", \"Best\", \"Worst\", \"Unchosen\", \"BestWorst\", \"ABW\", \"David\", \"ValueLogit\", \"RWLogit\", \"BestWorstLogit\"]

# Column separator for input sheets. Default: tab for .tsv, comma otherwise.
# separator = \",\"

# Fixed random seed, for reproducible designs and scores
# seed = 42
";

/// Returns the default config path: ~/.config/bestworst/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("bestworst").join("config.toml")
}

pub fn parse_config(content: &str) -> Result<BestworstConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> BestworstConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BestworstConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file at `path`. Errors if it already exists.
pub fn create_default_config(path: &Path) {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}
