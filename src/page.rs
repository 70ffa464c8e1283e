//! Vanity import page generation.
//!
//! Each page is a fixed HTML document carrying the `go-import` and
//! `go-source` meta tags the Go toolchain looks for, plus a refresh redirect
//! to the package documentation for human visitors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::write::write_atomic;

/// Version control system announced in the `go-import` tag.
pub const VCS: &str = "git";

const INDEX_FILE: &str = "index.html";

/// Where a vanity import path lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSpec {
    domain: String,
    repository: String,
    suffix: String,
}

impl RedirectSpec {
    /// Validates and builds a spec for `domain/suffix` backed by `repository`.
    pub fn new(domain: &str, repository: &str, suffix: &str) -> Result<Self> {
        let domain = domain.trim().trim_end_matches('/');
        if domain.is_empty() {
            return Err(Error::MissingDomain);
        }
        let repository = normalize_repository(repository)?;
        let suffix = validate_suffix(suffix)?;

        Ok(Self {
            domain: domain.to_string(),
            repository,
            suffix,
        })
    }

    /// Builds a spec whose suffix is the repository's last path segment.
    pub fn for_repository(domain: &str, repository: &str) -> Result<Self> {
        let normalized = normalize_repository(repository)?;
        let suffix = normalized
            .rsplit('/')
            .next()
            .ok_or_else(|| Error::InvalidRepository(repository.to_string()))?;
        Self::new(domain, &normalized, suffix)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The vanity import path, e.g. `go.example.com/project`.
    pub fn import_path(&self) -> String {
        format!("{}/{}", self.domain, self.suffix)
    }

    /// `out_dir/<suffix>/index.html`, one directory level per suffix segment.
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        self.suffix
            .split('/')
            .fold(out_dir.to_path_buf(), |dir, segment| dir.join(segment))
            .join(INDEX_FILE)
    }

    pub fn render(&self) -> String {
        let import_path = escape_attr(&self.import_path());
        let repo = escape_attr(&self.repository);
        format!(
            r#"<!DOCTYPE html>
<html><head>
  <meta charset="utf-8"/>
  <meta name="go-import" content="{import_path} {VCS} https://{repo}">
  <meta name="go-source" content="{import_path} https://{repo} https://{repo}/tree/master{{/dir}} https://{repo}/blob/master{{/dir}}/{{file}}#L{{line}}">
  <meta http-equiv="refresh" content="0; url=https://pkg.go.dev/{import_path}">
</head><body>
  Redirecting…
</body></html>"#
        )
    }
}

/// Strips an optional scheme and trailing slashes, and requires at least
/// `host/owner/project`.
fn normalize_repository(repository: &str) -> Result<String> {
    let trimmed = repository.trim();
    let stripped = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    let segments: Vec<&str> = stripped.split('/').collect();
    if segments.len() < 3 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::InvalidRepository(repository.to_string()));
    }
    Ok(stripped.to_string())
}

fn validate_suffix(suffix: &str) -> Result<String> {
    let valid = !suffix.is_empty()
        && suffix.split('/').all(|segment| {
            !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
        });
    if valid {
        Ok(suffix.to_string())
    } else {
        Err(Error::InvalidSuffix(suffix.to_string()))
    }
}

/// Escapes a value for use inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '+' => out.push_str("&#43;"),
            '\0' => out.push('\u{fffd}'),
            c => out.push(c),
        }
    }
    out
}

/// Writes the page for `spec` under `out_dir` and returns its path.
pub fn generate(spec: &RedirectSpec, out_dir: &Path) -> Result<PathBuf> {
    let path = spec.output_path(out_dir);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    write_atomic(&path, spec.render().as_bytes())?;
    Ok(path)
}

/// Validates the inputs and writes `out_dir/<suffix>/index.html`.
pub fn generate_page(
    domain: &str,
    repository: &str,
    suffix: &str,
    out_dir: &Path,
) -> Result<PathBuf> {
    generate(&RedirectSpec::new(domain, repository, suffix)?, out_dir)
}

/// Like [`generate_page`], deriving the suffix from the repository's last segment.
pub fn generate_for_repository(domain: &str, repository: &str, out_dir: &Path) -> Result<PathBuf> {
    generate(&RedirectSpec::for_repository(domain, repository)?, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn renders_resolver_metadata() {
        let spec = RedirectSpec::for_repository("go.example.com", "github.com/user/project").unwrap();
        insta::assert_snapshot!(spec.render(), @r#"
<!DOCTYPE html>
<html><head>
  <meta charset="utf-8"/>
  <meta name="go-import" content="go.example.com/project git https://github.com/user/project">
  <meta name="go-source" content="go.example.com/project https://github.com/user/project https://github.com/user/project/tree/master{/dir} https://github.com/user/project/blob/master{/dir}/{file}#L{line}">
  <meta http-equiv="refresh" content="0; url=https://pkg.go.dev/go.example.com/project">
</head><body>
  Redirecting…
</body></html>
"#);
    }

    #[test]
    fn generates_page_for_repository() {
        let temp = TempDir::new().unwrap();

        let path =
            generate_for_repository("go.example.com", "github.com/user/project", temp.path())
                .unwrap();

        assert_eq!(path, temp.path().join("project").join("index.html"));
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("meta name=\"go-import\""));
        assert!(html.contains("go.example.com"));
        assert!(html.contains("github.com/user/project"));
    }

    #[test]
    fn invalid_repository_writes_nothing() {
        let temp = TempDir::new().unwrap();

        let err = generate_for_repository("go.example.com", "invalid", temp.path()).unwrap_err();

        assert!(matches!(err, Error::InvalidRepository(_)));
        assert!(err.is_validation());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn nests_multi_segment_suffix() {
        let temp = TempDir::new().unwrap();

        let path = generate_page("go.example.com", "github.com/user/bar", "foo/bar", temp.path())
            .unwrap();

        assert_eq!(path, temp.path().join("foo").join("bar").join("index.html"));
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("content=\"go.example.com/foo/bar git https://github.com/user/bar\""));
    }

    #[test]
    fn normalizes_repository_urls() {
        let spec =
            RedirectSpec::for_repository("go.example.com", "https://github.com/user/project//")
                .unwrap();
        assert_eq!(spec.repository(), "github.com/user/project");
        assert_eq!(spec.suffix(), "project");
    }

    #[test]
    fn rejects_short_or_hollow_repositories() {
        for repo in ["invalid", "github.com/user", "github.com//project", "", "///"] {
            assert!(
                matches!(
                    RedirectSpec::for_repository("go.example.com", repo),
                    Err(Error::InvalidRepository(_))
                ),
                "accepted {repo:?}"
            );
        }
    }

    #[test]
    fn rejects_escaping_suffixes() {
        for suffix in ["", "../etc", "a//b", "./x", "a\\b"] {
            assert!(
                matches!(
                    RedirectSpec::new("go.example.com", "github.com/u/p", suffix),
                    Err(Error::InvalidSuffix(_))
                ),
                "accepted {suffix:?}"
            );
        }
    }

    #[test]
    fn rejects_empty_domain() {
        let err = RedirectSpec::for_repository("  ", "github.com/u/p").unwrap_err();
        assert!(matches!(err, Error::MissingDomain));
    }

    #[test]
    fn escapes_attribute_values() {
        assert_eq!(escape_attr(r#"a"b<c>&'d+"#), "a&#34;b&lt;c&gt;&amp;&#39;d&#43;");
    }
}
