use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    config::{self, Config},
    data_dir::DataDir,
    entry::{Entry, Layer},
    error::{Error, Result},
};

#[derive(Debug, Deserialize)]
struct ToolManifest {
    name: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    exec: Option<String>,
}

/// Path of the configuration file inside the data directory, writing
/// the default one on first use.
pub fn ensure_config(data_dir: &DataDir) -> Result<PathBuf> {
    let path = data_dir.config_file();
    if !path.exists() {
        let rendered =
            config::default_toml(&data_dir.knowledge_file(), &data_dir.tools_dir()?);
        std::fs::write(&path, rendered)?;
        tracing::info!(path = %path.display(), "wrote default configuration");
    }
    Ok(path)
}

/// Read one knowledge file into entries, in tag order.
///
/// A knowledge file is a JSON object mapping a tag string to its value.
/// A non-string value is logged and skipped, never fatal for the rest
/// of the file.
pub fn load_knowledge_file(path: &Path) -> Result<Vec<Entry>> {
    let content = std::fs::read_to_string(path)?;
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .map_err(|e| {
            Error::Config(format!("invalid knowledge file {}: {e}", path.display()))
        })?;

    let mut entries = Vec::new();
    for (tags, value) in map {
        match value {
            serde_json::Value::String(value) => {
                entries.push(Entry::knowledge(&tags, &value));
            }
            _ => {
                tracing::warn!(
                    path = %path.display(),
                    tags = %tags,
                    "skipping knowledge entry with a non-string value"
                );
            }
        }
    }
    Ok(entries)
}

/// Read every `.toml` manifest in a tool directory, in file name order.
///
/// A manifest declares the tool's name plus optional tags, description,
/// and command line:
///
/// ```toml
/// name = "backup"
/// tags = "archive nightly"
/// description = "Run the nightly backup"
/// exec = "rsync -a ~/docs /backup"
/// ```
///
/// Hidden files are ignored, and a malformed manifest is logged and
/// skipped.
pub fn load_tool_dir(dir: &Path) -> Result<Vec<Entry>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("toml")
            && path.is_file()
        {
            paths.push(path);
        }
    }
    paths.sort();

    let mut entries = Vec::new();
    for path in paths {
        match read_manifest(&path) {
            Ok(tool) => entries.push(Entry::tool(
                &tool.name,
                &tool.tags,
                &tool.description,
                tool.exec,
            )),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping tool manifest"
                );
            }
        }
    }
    Ok(entries)
}

fn read_manifest(path: &Path) -> Result<ToolManifest> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("invalid tool manifest {}: {e}", path.display()))
    })
}

/// Load every configured scope into layers, lowest priority first: the
/// global knowledge file and tool directory, then the host's.
///
/// Missing knowledge files are created empty and missing tool
/// directories are created, so a fresh configuration works on first
/// run.
pub fn load_layers(config: &Config, host: Option<&str>) -> Result<Vec<Layer>> {
    let host = host.filter(|h| *h != config::GLOBAL_SCOPE);
    let mut layers = Vec::new();

    for scope in std::iter::once(config::GLOBAL_SCOPE).chain(host) {
        if let Some(path) = config.knowledge.sources.get(scope) {
            ensure_knowledge_file(path)?;
            layers.push(Layer::new(scope, load_knowledge_file(path)?));
        }
        if let Some(path) = config.knowledge.tools.get(scope) {
            std::fs::create_dir_all(path)
                .map_err(|_| Error::DataDir(path.clone()))?;
            layers.push(Layer::new(&format!("tools:{scope}"), load_tool_dir(path)?));
        }
    }

    Ok(layers)
}

fn ensure_knowledge_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, "{}\n")?;
    tracing::info!(path = %path.display(), "created empty knowledge file");
    Ok(())
}
