use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    svgs: HashMap<String, SvgEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SvgEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        expected: Option<String>,
    },
}

impl SvgEntry {
    fn as_path(&self) -> &str {
        match self {
            SvgEntry::Path(path) => path,
            SvgEntry::Detailed { path, .. } => path,
        }
    }

    fn expected(&self) -> Option<&str> {
        match self {
            SvgEntry::Path(_) => None,
            SvgEntry::Detailed { expected, .. } => expected.as_deref(),
        }
    }
}

/// Fixture files resolved against the workspace `fixtures/` directory.
fn fixture_file(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel)
}

fn entry(name: &str) -> Result<&'static SvgEntry> {
    MANIFEST
        .svgs
        .get(name)
        .ok_or_else(|| anyhow!("no svg fixture named '{name}' in manifest.json"))
}

fn read_fixture(rel: &str) -> Result<String> {
    let file = fixture_file(rel);
    fs::read_to_string(&file).with_context(|| format!("reading fixture {}", file.display()))
}

pub mod svgs {
    use super::*;

    /// Manifest names, sorted.
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.svgs.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn text(name: &str) -> Result<String> {
        read_fixture(entry(name)?.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(fixture_file(entry(name)?.as_path()))
    }

    /// Expected measurement results, when the fixture declares them.
    pub fn expected<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let Some(rel) = entry(name)?.expected() else {
            return Ok(None);
        };
        let raw = read_fixture(rel)?;
        serde_json::from_str(&raw)
            .map(Some)
            .with_context(|| format!("expected results for '{name}' are not valid JSON"))
    }
}
