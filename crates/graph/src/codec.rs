//! Reading and writing graph files.
//!
//! The canonical on-disk encoding is JSON, stored with an `.ax` extension
//! (plain `.json` is accepted too). `.axd` is a debug encoding: the same
//! graph as YAML, preceded by a `#` comment block describing every node.
//! The loader never validates program structure; that is the transpiler's
//! job.

use crate::describe::describe_graph;
use crate::types::Graph;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions recognised as graph files.
pub const GRAPH_EXTENSIONS: &[&str] = &["ax", "json", "axd"];

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// `.ax` or `.json`.
    Json,
    /// `.axd`: commented YAML.
    DebugYaml,
}

impl GraphFormat {
    pub fn from_path(path: &Path) -> Result<GraphFormat, GraphError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "ax" | "json" => Ok(GraphFormat::Json),
            "axd" => Ok(GraphFormat::DebugYaml),
            _ => Err(GraphError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: extension.to_string(),
            }),
        }
    }
}

/// Errors while loading or saving a graph file.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("error reading or writing '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse debug graph '{}': {source}", .path.display())]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize graph: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to serialize debug graph: {0}")]
    SerializeYaml(#[source] serde_yaml::Error),

    #[error("unsupported graph file extension '{extension}' for '{}': must be .ax, .json or .axd", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },
}

impl Graph {
    /// Parse a graph from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Graph, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Render the graph as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a graph from `.axd` text. The comment header is ignored.
    pub fn from_debug_str(text: &str) -> Result<Graph, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Render the graph as `.axd` text: node descriptions as `#` comments,
    /// then the YAML body.
    pub fn to_debug_string(&self) -> Result<String, serde_yaml::Error> {
        let mut out = String::new();
        for line in describe_graph(self).lines() {
            if line.is_empty() {
                out.push_str("#\n");
            } else {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(&serde_yaml::to_string(self)?);
        Ok(out)
    }
}

/// Load a graph file, dispatching on its extension.
pub fn load_graph(path: &Path) -> Result<Graph, GraphError> {
    let format = GraphFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match format {
        GraphFormat::Json => Graph::from_json_str(&text).map_err(|source| GraphError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        GraphFormat::DebugYaml => {
            Graph::from_debug_str(&text).map_err(|source| GraphError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Persist a graph, choosing the encoding from the target extension.
pub fn save_graph(graph: &Graph, path: &Path) -> Result<(), GraphError> {
    let text = match GraphFormat::from_path(path)? {
        GraphFormat::Json => {
            let mut text = graph.to_json_string().map_err(GraphError::Serialize)?;
            text.push('\n');
            text
        }
        GraphFormat::DebugYaml => graph.to_debug_string().map_err(GraphError::SerializeYaml)?,
    };
    fs::write(path, text).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })
}
