use anyhow::{Context, Result};
use engine::GraphragCli;
use query::LabelQuoting;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub projects: ProjectsConfig,
    pub visualization: VisualizationConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable that provides the `init`/`index`/`query`... subcommands.
    pub program: String,
    /// Arguments inserted before the subcommand, e.g. `["-m", "graphrag"]`.
    pub base_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub artifact_path: PathBuf,
    /// Quote-escape labels inside the generated Cypher text.
    pub escape_cypher_labels: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "graphrag".to_string(),
            base_args: Vec::new(),
        }
    }
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("projects"),
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("filtered_graph_visualization.html"),
            escape_cypher_labels: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// A path was given but nothing exists there.
    Missing(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => tracing::info!("Loading configuration from file: {:?}", path),
            ConfigSource::Missing(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path)
            }
            ConfigSource::Defaults => tracing::info!("No config file given, using defaults"),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// File (when given and present), then environment overrides.
    ///
    /// Runs before logging is set up, so where the settings came from is
    /// returned for the caller to report.
    pub fn load(config_file: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (config, source) = match config_file {
            Some(path) if path.exists() => {
                (Self::from_file(path)?, ConfigSource::File(path.to_path_buf()))
            }
            Some(path) => (Self::default(), ConfigSource::Missing(path.to_path_buf())),
            None => (Self::default(), ConfigSource::Defaults),
        };

        Ok((config.with_env_overrides(|key| std::env::var(key).ok()), source))
    }

    /// Apply `GRAPHRAG_UI_*` variables looked up through `lookup`.
    ///
    /// `GRAPHRAG_UI_ENGINE` is split on whitespace: the first word is the
    /// program, the rest become base arguments.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup("GRAPHRAG_UI_BIND") {
            self.server.bind_addr = addr;
        }

        if let Some(engine) =
            lookup("GRAPHRAG_UI_ENGINE").and_then(|line| GraphragCli::from_command_line(&line))
        {
            self.engine.program = engine.program().to_string();
            self.engine.base_args = engine.base_args().to_vec();
        }

        if let Some(root) = lookup("GRAPHRAG_UI_PROJECTS") {
            self.projects.root = PathBuf::from(root);
        }

        if let Some(artifact) = lookup("GRAPHRAG_UI_ARTIFACT") {
            self.visualization.artifact_path = PathBuf::from(artifact);
        }

        self
    }

    pub fn engine(&self) -> GraphragCli {
        GraphragCli::new(self.engine.program.clone(), self.engine.base_args.clone())
    }

    pub fn label_quoting(&self) -> LabelQuoting {
        if self.visualization.escape_cypher_labels {
            LabelQuoting::Escaped
        } else {
            LabelQuoting::Verbatim
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [engine]
            program = "python"
            base_args = ["-m", "graphrag"]

            [visualization]
            escape_cypher_labels = true
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.program, "python");
        assert_eq!(config.engine.base_args, vec!["-m", "graphrag"]);
        assert_eq!(config.server.bind_addr, "127.0.0.1:8501");
        assert_eq!(config.projects.root, PathBuf::from("projects"));
        assert_eq!(config.label_quoting(), LabelQuoting::Escaped);
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GRAPHRAG_UI_BIND", "0.0.0.0:9000"),
            ("GRAPHRAG_UI_ENGINE", "python -m graphrag"),
            ("GRAPHRAG_UI_PROJECTS", "/srv/projects"),
        ]);

        let config = AppConfig::default().with_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.engine.program, "python");
        assert_eq!(config.engine.base_args, vec!["-m", "graphrag"]);
        assert_eq!(config.projects.root, PathBuf::from("/srv/projects"));
        assert_eq!(
            config.visualization.artifact_path,
            PathBuf::from("filtered_graph_visualization.html")
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let absent = tmp.path().join("absent.toml");
        let (config, source) = AppConfig::load(Some(&absent)).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8501");
        assert_eq!(source, ConfigSource::Missing(absent));
    }

    #[test]
    fn test_load_reports_file_source() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("graphrag-ui.toml");
        std::fs::write(&path, "[projects]\nroot = \"/data/projects\"\n").unwrap();

        let (config, source) = AppConfig::load(Some(&path)).unwrap();

        assert_eq!(source, ConfigSource::File(path));
        assert_eq!(config.visualization.artifact_path, PathBuf::from("filtered_graph_visualization.html"));
        assert_eq!(AppConfig::load(None).unwrap().1, ConfigSource::Defaults);
    }

    #[test]
    fn test_log_format_parses() {
        let config: AppConfig = toml::from_str("[server]\nlog_format = \"json\"\n").unwrap();
        assert_eq!(config.server.log_format, LogFormat::Json);
    }
}
