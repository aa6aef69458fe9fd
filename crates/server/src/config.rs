//! Process configuration, parsed once at startup.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "gallery-server", about = "Deep-zoom imagery gallery with annotations and visual Q&A")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "GALLERY_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Directory holding one sub-directory per tile pyramid
    #[arg(long, default_value = "static/tiles")]
    pub tiles_root: PathBuf,

    /// File whose presence marks a pyramid as complete
    #[arg(long, default_value = "output.dzi")]
    pub manifest_name: String,

    /// Directory for per-dataset annotation files
    #[arg(long, default_value = "annotations")]
    pub annotations_dir: PathBuf,

    /// Gemini API key; the ask endpoint is disabled without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, default_value = "gemini-2.0-flash")]
    pub gemini_model: String,

    #[arg(long, default_value = "https://generativelanguage.googleapis.com")]
    pub gemini_base_url: String,

    /// Comparison pair `LEFT=RIGHT`, may be repeated
    #[arg(long = "pair", value_parser = parse_pair)]
    pub pairs: Vec<(String, String)>,
}

impl Config {
    /// Defaults rooted at `dir`, used by tests and embedding.
    pub fn with_root(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            bind: "127.0.0.1:0".to_string(),
            tiles_root: dir.join("tiles"),
            manifest_name: "output.dzi".to_string(),
            annotations_dir: dir.join("annotations"),
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            pairs: Vec::new(),
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (left, right) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LEFT=RIGHT, got '{}'", raw))?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(format!("empty dataset name in pair '{}'", raw));
    }
    if left == right {
        return Err(format!("dataset '{}' cannot be paired with itself", left));
    }
    Ok((left.to_string(), right.to_string()))
}

/// Symmetric dataset → dataset mapping for the side-by-side view.
#[derive(Debug, Clone, Default)]
pub struct ComparisonPairs {
    partners: HashMap<String, String>,
}

impl ComparisonPairs {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut partners = HashMap::new();
        for (left, right) in pairs {
            if left == right {
                tracing::warn!("ignoring self-pair for '{}'", left);
                continue;
            }
            if partners.contains_key(&left) || partners.contains_key(&right) {
                tracing::warn!(
                    "ignoring pair {}={}: one side is already paired",
                    left,
                    right
                );
                continue;
            }
            partners.insert(left.clone(), right.clone());
            partners.insert(right, left);
        }
        Self { partners }
    }

    pub fn partner(&self, name: &str) -> Option<&str> {
        self.partners.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.partners.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}
