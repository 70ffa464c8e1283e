//! Import path rewriting over a source tree.
//!
//! Each eligible file is parsed, its import specs are matched against a
//! [`RewriteRule`], and files with at least one match are re-printed in
//! canonical form and replaced atomically. Files without matches are never
//! written. The first read, parse, or write failure aborts the whole run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::printer;
use crate::rule::RewriteRule;
use crate::scanner;
use crate::source::{GoParser, SourceFile};
use crate::write::write_atomic;

/// One rewritten import path.
#[derive(Debug, Clone, Serialize)]
pub struct ImportChange {
    /// Line of the import literal, 1-indexed.
    pub line: usize,
    /// Column of the import literal, 1-indexed.
    pub column: usize,
    pub old: String,
    pub new: String,
}

/// The pending rewrite of a single file.
#[derive(Debug, Clone)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub changes: Vec<ImportChange>,
    /// Canonical file contents after the rewrite.
    pub contents: String,
}

/// Options for a tree rewrite.
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// Glob patterns excluding additional files or directories.
    pub exclude: Vec<String>,
    /// Compute changes without writing any file.
    pub dry_run: bool,
}

/// Outcome of a tree rewrite.
#[derive(Debug, Default, Serialize)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub imports_rewritten: usize,
    /// Files that were (or, in a dry run, would be) rewritten.
    pub modified: Vec<PathBuf>,
    /// Files whose changes were rejected by the reviewer.
    pub declined: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Decides whether each pending file rewrite is applied.
pub trait Reviewer {
    type Error: From<Error>;

    /// Called before a file is written. Returning `false` leaves it untouched.
    fn review(&mut self, rewrite: &FileRewrite) -> std::result::Result<bool, Self::Error>;

    /// Called once a file has been written, or accepted during a dry run.
    fn applied(&mut self, _rewrite: &FileRewrite) {}
}

/// Accepts every rewrite.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Reviewer for AcceptAll {
    type Error = Error;

    fn review(&mut self, _rewrite: &FileRewrite) -> Result<bool> {
        Ok(true)
    }
}

/// Rewrites every import under `root` starting with `old` to start with `new`.
pub fn rewrite(root: &Path, old: &str, new: &str) -> Result<RewriteReport> {
    let rule = RewriteRule::new(old, new)?;
    rewrite_tree(root, &rule, &RewriteOptions::default(), &mut AcceptAll)
}

/// Rewrites the tree under `root`, consulting `reviewer` before each write.
pub fn rewrite_tree<R: Reviewer>(
    root: &Path,
    rule: &RewriteRule,
    options: &RewriteOptions,
    reviewer: &mut R,
) -> std::result::Result<RewriteReport, R::Error> {
    let files = scanner::collect_go_files(root, &options.exclude)?;
    let mut parser = GoParser::new()?;
    let mut report = RewriteReport {
        dry_run: options.dry_run,
        ..RewriteReport::default()
    };

    for path in files {
        report.files_scanned += 1;

        let Some(rewrite) = rewrite_file(&mut parser, &path, rule)? else {
            continue;
        };

        if !reviewer.review(&rewrite)? {
            report.declined.push(path);
            continue;
        }

        if !options.dry_run {
            write_atomic(&path, rewrite.contents.as_bytes())?;
        }
        report.imports_rewritten += rewrite.changes.len();
        reviewer.applied(&rewrite);
        report.modified.push(path);
    }

    Ok(report)
}

/// Parses `path` and computes its rewrite, or `None` if no import matches.
pub fn rewrite_file(
    parser: &mut GoParser,
    path: &Path,
    rule: &RewriteRule,
) -> Result<Option<FileRewrite>> {
    let mut file = parser.parse_file(path)?;
    let changes = apply_rule(&mut file, rule);
    if changes.is_empty() {
        return Ok(None);
    }

    Ok(Some(FileRewrite {
        path: path.to_path_buf(),
        changes,
        contents: printer::print(&file),
    }))
}

/// Rewrites matching import specs in place and returns what changed.
pub fn apply_rule(file: &mut SourceFile, rule: &RewriteRule) -> Vec<ImportChange> {
    let mut changes = Vec::new();
    for spec in file.imports_mut() {
        if let Some(new_path) = rule.apply(&spec.path) {
            changes.push(ImportChange {
                line: spec.line,
                column: spec.column,
                old: spec.path.clone(),
                new: new_path.clone(),
            });
            spec.set_path(new_path);
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_source;
    use std::fs;
    use tempfile::TempDir;

    const OLD: &str = "github.com/hungtrd/project";
    const NEW: &str = "go.hung.rocks/project";

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn rule() -> RewriteRule {
        RewriteRule::new(OLD, NEW).unwrap()
    }

    struct DeclineAll;

    impl Reviewer for DeclineAll {
        type Error = Error;

        fn review(&mut self, _rewrite: &FileRewrite) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn apply_rule_reports_changes_with_positions() {
        let mut file = parse_source(
            "package main\n\nimport (\n\t\"fmt\"\n\tp \"github.com/hungtrd/project/pkg\"\n)\n",
        )
        .unwrap();
        let changes = apply_rule(&mut file, &rule());
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].line, changes[0].column), (5, 4));
        assert_eq!(changes[0].old, "github.com/hungtrd/project/pkg");
        assert_eq!(changes[0].new, "go.hung.rocks/project/pkg");
        assert_eq!(
            printer::print(&file),
            "package main\n\nimport (\n\t\"fmt\"\n\tp \"go.hung.rocks/project/pkg\"\n)\n"
        );
    }

    #[test]
    fn rewrite_leaves_comments_and_strings_alone() {
        let source = r#"package main

// Migrated from github.com/hungtrd/project.
import "github.com/hungtrd/project/foo"

const origin = "github.com/hungtrd/project/foo"

func main() {}
"#;
        let mut file = parse_source(source).unwrap();
        apply_rule(&mut file, &rule());
        insta::assert_snapshot!(printer::print(&file), @r#"
package main

// Migrated from github.com/hungtrd/project.
import "go.hung.rocks/project/foo"

const origin = "github.com/hungtrd/project/foo"

func main() {}
"#);
    }

    #[test]
    fn rewrites_raw_literal_to_interpreted() {
        let mut file = parse_source("package main\n\nimport `github.com/hungtrd/project`\n").unwrap();
        apply_rule(&mut file, &rule());
        assert_eq!(
            printer::print(&file),
            "package main\n\nimport \"go.hung.rocks/project\"\n"
        );
    }

    #[test]
    fn rewrites_matching_files_only() {
        let temp = TempDir::new().unwrap();
        let main = write(
            temp.path(),
            "main.go",
            "package main\nimport \"github.com/hungtrd/project/foo\"\nfunc main() {}\n",
        );
        let untouched_src = "package util\n\nimport \"github.com/hungtrd/projectx/foo\"\n";
        let untouched = write(temp.path(), "util/util.go", untouched_src);

        let report = rewrite(temp.path(), OLD, NEW).unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.modified, vec![main.clone()]);
        assert_eq!(report.imports_rewritten, 1);
        assert_eq!(
            fs::read_to_string(&main).unwrap(),
            "package main\nimport \"go.hung.rocks/project/foo\"\nfunc main() {}\n"
        );
        assert_eq!(fs::read_to_string(&untouched).unwrap(), untouched_src);
    }

    #[test]
    fn second_run_modifies_nothing() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "main.go",
            "package main\n\nimport (\n\t\"github.com/hungtrd/project/b\"\n\t\"github.com/hungtrd/project/a\"\n)\n",
        );

        let first = rewrite(temp.path(), OLD, NEW).unwrap();
        let after_first = fs::read_to_string(temp.path().join("main.go")).unwrap();
        let second = rewrite(temp.path(), OLD, NEW).unwrap();

        assert_eq!(first.modified.len(), 1);
        assert!(second.modified.is_empty());
        assert_eq!(
            fs::read_to_string(temp.path().join("main.go")).unwrap(),
            after_first
        );
    }

    #[test]
    fn respects_traversal_exclusions() {
        let temp = TempDir::new().unwrap();
        let import = "import \"github.com/hungtrd/project/x\"\n";
        write(temp.path(), "main.go", &format!("package main\n{import}"));
        let vendored = write(temp.path(), "vendor/v.go", &format!("package v\n{import}"));
        let idea = write(temp.path(), ".idea/h.go", &format!("package h\n{import}"));
        let dotfile = write(temp.path(), ".hidden.go", &format!("package hidden\n{import}"));

        let report = rewrite(temp.path(), OLD, NEW).unwrap();

        assert_eq!(report.modified, vec![temp.path().join("main.go")]);
        for path in [vendored, idea, dotfile] {
            assert!(fs::read_to_string(path).unwrap().contains(OLD));
        }
    }

    #[test]
    fn parse_error_aborts_before_later_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.go", "package a\n\nfunc broken( {\n");
        let later_src = "package b\nimport \"github.com/hungtrd/project/b\"\n";
        let later = write(temp.path(), "b.go", later_src);

        let err = rewrite(temp.path(), OLD, NEW).unwrap_err();

        match err {
            Error::Parse { path, .. } => assert_eq!(path, temp.path().join("a.go")),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(later).unwrap(), later_src);
    }

    /// Swaps the first reviewed file for a directory so its write fails.
    struct BlockFirstWrite;

    impl Reviewer for BlockFirstWrite {
        type Error = Error;

        fn review(&mut self, rewrite: &FileRewrite) -> Result<bool> {
            if rewrite.path.ends_with("a.go") {
                fs::remove_file(&rewrite.path).unwrap();
                fs::create_dir(&rewrite.path).unwrap();
            }
            Ok(true)
        }
    }

    #[test]
    fn write_error_aborts_before_later_files() {
        let temp = TempDir::new().unwrap();
        let first = write(
            temp.path(),
            "a.go",
            "package a\nimport \"github.com/hungtrd/project/a\"\n",
        );
        let later_src = "package b\nimport \"github.com/hungtrd/project/b\"\n";
        let later = write(temp.path(), "b.go", later_src);

        let err = rewrite_tree(
            temp.path(),
            &rule(),
            &RewriteOptions::default(),
            &mut BlockFirstWrite,
        )
        .unwrap_err();

        match err {
            Error::Write { path, .. } => assert_eq!(path, first),
            other => panic!("expected write error, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(later).unwrap(), later_src);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let source = "package main\nimport \"github.com/hungtrd/project\"\n";
        let main = write(temp.path(), "main.go", source);
        let options = RewriteOptions {
            dry_run: true,
            ..RewriteOptions::default()
        };

        let report = rewrite_tree(temp.path(), &rule(), &options, &mut AcceptAll).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.modified, vec![main.clone()]);
        assert_eq!(fs::read_to_string(main).unwrap(), source);
    }

    #[test]
    fn declined_files_are_left_untouched() {
        let temp = TempDir::new().unwrap();
        let source = "package main\nimport \"github.com/hungtrd/project\"\n";
        let main = write(temp.path(), "main.go", source);

        let report =
            rewrite_tree(temp.path(), &rule(), &RewriteOptions::default(), &mut DeclineAll)
                .unwrap();

        assert!(report.modified.is_empty());
        assert_eq!(report.declined, vec![main.clone()]);
        assert_eq!(fs::read_to_string(main).unwrap(), source);
    }

    #[test]
    fn invalid_rule_fails_before_walking() {
        let err = rewrite(Path::new("/definitely/not/here"), OLD, OLD).unwrap_err();
        assert!(err.is_validation());
    }
}
