use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    scorer::ScoringConfig,
};

/// The scope applied on every machine, lowest priority.
pub const GLOBAL_SCOPE: &str = "global";

/// TOML configuration: knowledge sources, tool directories, scoring.
///
/// Scopes under `[knowledge.sources]` and `[knowledge.tools]` name the
/// layer they feed: `global` applies everywhere and has the lowest
/// priority; any other key is a host name whose entries override the
/// global ones on that machine.
///
/// ```toml
/// [knowledge.sources]
/// global = "/home/me/.local/share/lore/knowledge.json"
/// workstation = "/home/me/.local/share/lore/knowledge.workstation.json"
///
/// [knowledge.tools]
/// global = "/home/me/.local/share/lore/tools"
///
/// [scoring]
/// run_bonus = 1.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KnowledgeConfig {
    /// Scope name to knowledge file (a JSON object of tags to value).
    #[serde(default)]
    pub sources: BTreeMap<String, PathBuf>,
    /// Scope name to directory of tool manifests.
    #[serde(default)]
    pub tools: BTreeMap<String, PathBuf>,
}

/// One parsed file; `scoring` stays `None` when the table is absent so
/// a later file without one does not clobber an earlier override.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    knowledge: KnowledgeConfig,
    scoring: Option<ScoringConfig>,
}

impl Config {
    /// Load and merge configuration files in the given order.
    ///
    /// Source and tool scopes merge per key with later files winning;
    /// the last `[scoring]` table present wins wholesale. Every path
    /// must exist and parse.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = Config::default();

        for path in paths {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read config file {}: {e}", path.display()))
            })?;
            let file: FileConfig = toml::from_str(&content).map_err(|e| {
                Error::Config(format!("invalid config file {}: {e}", path.display()))
            })?;

            merged.knowledge.sources.extend(file.knowledge.sources);
            merged.knowledge.tools.extend(file.knowledge.tools);
            if let Some(scoring) = file.scoring {
                merged.scoring = scoring;
            }
        }

        merged.scoring.validate()?;
        Ok(merged)
    }

    /// Knowledge files in layer order: global first, then the selected
    /// host scope when the configuration defines one. Scopes for other
    /// hosts are ignored.
    pub fn source_layers(&self, host: Option<&str>) -> Vec<(String, PathBuf)> {
        scope_layers(&self.knowledge.sources, host)
    }

    /// Tool directories in the same layer order as [`source_layers`].
    ///
    /// [`source_layers`]: Config::source_layers
    pub fn tool_layers(&self, host: Option<&str>) -> Vec<(String, PathBuf)> {
        scope_layers(&self.knowledge.tools, host)
    }
}

fn scope_layers(
    scopes: &BTreeMap<String, PathBuf>,
    host: Option<&str>,
) -> Vec<(String, PathBuf)> {
    let mut layers = Vec::new();
    if let Some(path) = scopes.get(GLOBAL_SCOPE) {
        layers.push((GLOBAL_SCOPE.to_string(), path.clone()));
    }
    if let Some(host) = host
        && host != GLOBAL_SCOPE
        && let Some(path) = scopes.get(host)
    {
        layers.push((host.to_string(), path.clone()));
    }
    layers
}

/// The configuration written on first use.
pub fn default_toml(knowledge_file: &Path, tools_dir: &Path) -> String {
    format!(
        "# lore configuration\n\
         #\n\
         # Scopes under [knowledge.sources] and [knowledge.tools] are layers:\n\
         # 'global' applies everywhere; a key matching this machine's host name\n\
         # overrides it. All [scoring] parameters are optional: primary_weight,\n\
         # secondary_weight, soft_match_factor, run_bonus, max_edit_distance,\n\
         # occurrence_cap, min_score.\n\
         \n\
         [knowledge.sources]\n\
         global = '{}'\n\
         \n\
         [knowledge.tools]\n\
         global = '{}'\n",
        knowledge_file.display(),
        tools_dir.display(),
    )
}
