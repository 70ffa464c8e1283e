//! vanityimport library for Go vanity import paths.
//!
//! This library provides programmatic access to the two halves of the tool:
//!
//! 1. **Pages**: render `go-import` / `go-source` redirect pages for a custom
//!    domain, one at a time ([`page`]) or from a JSON manifest ([`manifest`])
//! 2. **Rewriting**: walk a Go source tree and move import paths from one
//!    prefix to another ([`rewriter`])
//!
//! The rewriter parses every eligible `.go` file, so a single malformed file
//! aborts the run before the tree is left half-migrated.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vanityimport::{page, rewriter};
//!
//! // Publish go.example.com/project -> github.com/user/project
//! let written = page::generate_for_repository(
//!     "go.example.com",
//!     "github.com/user/project",
//!     Path::new("public"),
//! )
//! .unwrap();
//! println!("Generated {}", written.display());
//!
//! // Point every import at the new location
//! let report = rewriter::rewrite(
//!     Path::new("."),
//!     "github.com/user/project",
//!     "go.example.com/project",
//! )
//! .unwrap();
//! println!("Rewrote {} files", report.modified.len());
//! ```

pub mod error;
pub mod literal;
pub mod manifest;
pub mod page;
pub mod printer;
pub mod rewriter;
pub mod rule;
pub mod scanner;
pub mod source;
pub mod write;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use page::RedirectSpec;
pub use rewriter::{FileRewrite, ImportChange, RewriteOptions, RewriteReport, Reviewer};
pub use rule::RewriteRule;
pub use source::{ImportSpec, SourceFile};
