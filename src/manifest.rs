//! Manifest loading and batch page generation.
//!
//! A manifest is a JSON document naming the vanity domain and the packages
//! served under it:
//!
//! ```json
//! {
//!   "domain": "go.example.com",
//!   "packages": [
//!     { "suffix": "project", "repo": "github.com/user/project" },
//!     { "suffix": "foo/bar", "repo": "github.com/user/bar" }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::page;

/// Declarative list of vanity pages to generate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    /// Custom domain; may be left empty when overridden by the caller.
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageEntry {
    /// Import suffix under the domain, e.g. `project` or `foo/bar`.
    pub suffix: String,
    /// Backing repository, e.g. `github.com/user/project`.
    pub repo: String,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Picks the override when it is non-empty, the manifest's domain otherwise.
    pub fn resolve_domain<'a>(&'a self, domain_override: Option<&'a str>) -> Result<&'a str> {
        let domain = domain_override
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(self.domain.as_str())
            .trim();
        if domain.is_empty() {
            Err(Error::MissingDomain)
        } else {
            Ok(domain)
        }
    }
}

/// Loads the manifest at `manifest_path` and writes one page per package.
pub fn build(
    manifest_path: &Path,
    out_dir: &Path,
    domain_override: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let manifest = Manifest::load(manifest_path)?;
    build_manifest(&manifest, out_dir, domain_override, |_| {})
}

/// Writes one page per package in manifest order, calling `on_page` after
/// each one. Stops at the first failing entry.
pub fn build_manifest(
    manifest: &Manifest,
    out_dir: &Path,
    domain_override: Option<&str>,
    mut on_page: impl FnMut(&Path),
) -> Result<Vec<PathBuf>> {
    let domain = manifest.resolve_domain(domain_override)?;
    let mut written = Vec::with_capacity(manifest.packages.len());

    for entry in &manifest.packages {
        let path = page::generate_page(domain, &entry.repo, &entry.suffix, out_dir).map_err(
            |source| Error::Entry {
                suffix: entry.suffix.clone(),
                source: Box::new(source),
            },
        )?;
        on_page(&path);
        written.push(path);
    }

    Ok(written)
}
