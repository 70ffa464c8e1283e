//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: generating a single
//! vanity page, rewriting import paths in a source tree, or building every
//! page listed in a manifest.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Utilities for Go vanity imports.
///
/// Generate vanity import pages and rewrite import paths in a Go codebase.
#[derive(Debug, Parser)]
#[command(name = "vanityimport", author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a single index.html for one vanity import path.
    #[command(visible_alias = "html")]
    Generate(GenerateArgs),

    /// Rewrite Go import paths in source files.
    Rewrite(RewriteArgs),

    /// Generate HTML pages for every package specified in a manifest file.
    Build(BuildArgs),
}

#[derive(Debug, ClapArgs)]
pub struct GenerateArgs {
    /// Custom domain (e.g. go.example.com).
    #[arg(short, long)]
    pub domain: String,

    /// VCS repository path (e.g. github.com/user/project).
    /// The last path segment becomes the import suffix.
    #[arg(short, long)]
    pub repo: String,

    /// Output directory for index.html.
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, ClapArgs)]
pub struct RewriteArgs {
    /// Old import prefix to replace (e.g. github.com/user/project).
    #[arg(short, long)]
    pub old: String,

    /// New import prefix (e.g. go.example.com/project).
    #[arg(short, long)]
    pub new: String,

    /// Directory to scan recursively for .go files.
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Glob patterns for directories/files to exclude (e.g., "testdata", "*.pb.go").
    /// Hidden entries and `vendor` directories are always excluded.
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Show what would change without writing any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Interactively confirm each file's changes before writing.
    #[arg(short, long, conflicts_with_all = ["dry_run", "json"])]
    pub interactive: bool,

    /// Emit the rewrite report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print additional diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, ClapArgs)]
pub struct BuildArgs {
    /// Path to manifest file (json).
    #[arg(short, long, default_value = "vanity.json")]
    pub config: PathBuf,

    /// Output directory for generated pages.
    #[arg(short, long, default_value = "public")]
    pub out: PathBuf,

    /// Override domain defined in manifest.
    #[arg(short, long)]
    pub domain: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_generate_with_short_flags() {
        let args = Args::try_parse_from([
            "vanityimport",
            "generate",
            "-d",
            "go.example.com",
            "-r",
            "github.com/user/project",
        ])
        .unwrap();
        match args.command {
            Commands::Generate(generate) => {
                assert_eq!(generate.domain, "go.example.com");
                assert_eq!(generate.repo, "github.com/user/project");
                assert_eq!(generate.out, PathBuf::from("."));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn html_is_an_alias_for_generate() {
        let args = Args::try_parse_from([
            "vanityimport",
            "html",
            "--domain",
            "go.example.com",
            "--repo",
            "github.com/user/project",
        ])
        .unwrap();
        assert!(matches!(args.command, Commands::Generate(_)));
    }

    #[test]
    fn generate_requires_domain_and_repo() {
        assert!(Args::try_parse_from(["vanityimport", "generate", "-d", "x.com"]).is_err());
        assert!(Args::try_parse_from(["vanityimport", "generate", "-r", "a/b/c"]).is_err());
    }

    #[test]
    fn rewrite_defaults() {
        let args =
            Args::try_parse_from(["vanityimport", "rewrite", "-o", "a.com/x", "-n", "b.com/x"])
                .unwrap();
        match args.command {
            Commands::Rewrite(rewrite) => {
                assert_eq!(rewrite.dir, PathBuf::from("."));
                assert!(rewrite.exclude.is_empty());
                assert!(!rewrite.dry_run && !rewrite.interactive && !rewrite.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rewrite_requires_old_and_new() {
        assert!(Args::try_parse_from(["vanityimport", "rewrite", "--old", "a"]).is_err());
        assert!(Args::try_parse_from(["vanityimport", "rewrite", "--new", "b"]).is_err());
    }

    #[test]
    fn interactive_conflicts_with_dry_run() {
        let result = Args::try_parse_from([
            "vanityimport",
            "rewrite",
            "-o",
            "a",
            "-n",
            "b",
            "--dry-run",
            "--interactive",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn build_defaults() {
        let args = Args::try_parse_from(["vanityimport", "build"]).unwrap();
        match args.command {
            Commands::Build(build) => {
                assert_eq!(build.config, PathBuf::from("vanity.json"));
                assert_eq!(build.out, PathBuf::from("public"));
                assert_eq!(build.domain, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
