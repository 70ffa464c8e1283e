//! Go source parsing.
//!
//! Parses `.go` files with tree-sitter and extracts the import declarations
//! into a small model the printer can re-emit. Everything outside import
//! declarations is kept as the original text and never touched.
//!
//! tree-sitter's Go grammar is more permissive than the Go compiler, so a few
//! extra structural checks are applied on top of the grammar: the file must
//! start with a `package` clause, imports must precede all other declarations,
//! statements are not allowed at top level, and every import path must be a
//! valid, well-formed literal.

use std::ops::Range;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser};

use crate::error::{Error, Result};
use crate::literal;

/// One `[name] "path"` entry of an import declaration.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Explicit package name, `.` or `_`, if present.
    pub name: Option<String>,
    /// Unquoted import path.
    pub path: String,
    /// Literal as it will be printed (original text until the path changes).
    pub literal: String,
    /// Line of the path literal, 1-indexed.
    pub line: usize,
    /// Column of the path literal, 1-indexed (bytes).
    pub column: usize,
    pub(crate) literal_range: Range<usize>,
    pub(crate) inner_comments: bool,
    pub(crate) leading: Vec<String>,
    pub(crate) trailing: Vec<String>,
}

impl ImportSpec {
    /// Replaces the import path, re-quoting it canonically.
    pub fn set_path(&mut self, path: String) {
        self.literal = literal::quote(&path);
        self.path = path;
    }
}

/// A single `import` keyword and the specs it introduces.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub(crate) range: Range<usize>,
    pub(crate) specs: Vec<ImportSpec>,
    pub(crate) layout: Layout,
}

impl ImportDecl {
    pub fn specs(&self) -> &[ImportSpec] {
        &self.specs
    }

    /// Whether the declaration uses the parenthesized form.
    pub fn is_grouped(&self) -> bool {
        match &self.layout {
            Layout::Grouped(_) => true,
            Layout::Single => false,
            Layout::Verbatim { grouped } => *grouped,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Layout {
    /// `import [name] "path"` without comments.
    Single,
    /// Parenthesized specs split into blank-line separated groups.
    Grouped(Vec<Group>),
    /// Comments sit where the canonical layout has no room for them; only the
    /// literals are replaced.
    Verbatim { grouped: bool },
}

/// Consecutive specs of a parenthesized declaration, not separated by blank lines.
#[derive(Debug, Clone, Default)]
pub(crate) struct Group {
    pub(crate) len: usize,
    /// Comments after the group's last spec.
    pub(crate) dangling: Vec<String>,
}

/// A parsed Go source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    source: String,
    decls: Vec<ImportDecl>,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn decls(&self) -> &[ImportDecl] {
        &self.decls
    }

    /// Import specs in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|decl| decl.specs.iter())
    }

    pub fn imports_mut(&mut self) -> impl Iterator<Item = &mut ImportSpec> {
        self.decls.iter_mut().flat_map(|decl| decl.specs.iter_mut())
    }
}

/// Reusable Go parser.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Reads and parses the file at `path`.
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceFile> {
        let bytes = std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8(bytes).map_err(|err| {
            let (line, column) = offset_to_line_col(&err.as_bytes()[..err.utf8_error().valid_up_to()]);
            Error::Parse {
                path: path.to_path_buf(),
                line,
                column,
                message: "invalid UTF-8 encoding".to_string(),
            }
        })?;
        self.parse(path, source)
    }

    /// Parses `source`, attributing errors to `path`.
    pub fn parse(&mut self, path: &Path, source: String) -> Result<SourceFile> {
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| Error::Parse {
                path: path.to_path_buf(),
                line: 1,
                column: 1,
                message: "parser produced no syntax tree".to_string(),
            })?;
        let root = tree.root_node();

        let extractor = Extractor {
            path,
            source: &source,
        };

        if let Some(node) = first_error(root) {
            let message = if node.is_missing() {
                format!("syntax error: missing {}", node.kind())
            } else {
                "syntax error".to_string()
            };
            return Err(extractor.error_at(node, message));
        }

        let decls = extractor.top_level(root)?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            source,
            decls,
        })
    }
}

struct Extractor<'a> {
    path: &'a Path,
    source: &'a str,
}

impl Extractor<'_> {
    fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    fn error_at(&self, node: Node<'_>, message: impl Into<String>) -> Error {
        let point = node.start_position();
        Error::Parse {
            path: self.path.to_path_buf(),
            line: point.row + 1,
            column: point.column + 1,
            message: message.into(),
        }
    }

    fn top_level(&self, root: Node<'_>) -> Result<Vec<ImportDecl>> {
        let mut decls = Vec::new();
        let mut seen_package = false;
        let mut seen_other = false;
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                "package_clause" if !seen_package => seen_package = true,
                kind if !seen_package => {
                    return Err(self.error_at(child, format!("expected 'package', found {}", kind)));
                }
                "import_declaration" => {
                    if seen_other {
                        return Err(self.error_at(
                            child,
                            "syntax error: imports must appear before other declarations",
                        ));
                    }
                    decls.push(self.import_decl(child)?);
                }
                "function_declaration" | "method_declaration" | "type_declaration"
                | "const_declaration" | "var_declaration" => seen_other = true,
                _ => {
                    return Err(self.error_at(
                        child,
                        "syntax error: non-declaration statement outside function body",
                    ));
                }
            }
        }

        if !seen_package {
            return Err(Error::Parse {
                path: self.path.to_path_buf(),
                line: 1,
                column: 1,
                message: "expected 'package', found 'EOF'".to_string(),
            });
        }

        Ok(decls)
    }

    fn import_decl(&self, node: Node<'_>) -> Result<ImportDecl> {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        let direct_comments = children.iter().any(|c| c.kind() == "comment");

        if let Some(list) = children.iter().find(|c| c.kind() == "import_spec_list") {
            let (specs, groups, inline_comments) = self.spec_list(*list)?;
            let layout = if direct_comments || inline_comments {
                Layout::Verbatim { grouped: true }
            } else {
                Layout::Grouped(groups)
            };
            return Ok(ImportDecl {
                range: node.byte_range(),
                specs,
                layout,
            });
        }

        let spec_node = children
            .iter()
            .find(|c| c.kind() == "import_spec")
            .ok_or_else(|| self.error_at(node, "syntax error: missing import path"))?;
        let spec = self.import_spec(*spec_node)?;
        let layout = if direct_comments || spec.inner_comments {
            Layout::Verbatim { grouped: false }
        } else {
            Layout::Single
        };

        Ok(ImportDecl {
            range: node.byte_range(),
            specs: vec![spec],
            layout,
        })
    }

    /// Splits a parenthesized spec list into groups, attaching each comment to
    /// the spec on the same line, the spec below it, or the end of its group.
    ///
    /// The returned flag is set when a comment shares a line with the opening
    /// parenthesis or precedes a spec on that spec's line. Those positions have
    /// no place in the canonical layout.
    fn spec_list(&self, list: Node<'_>) -> Result<(Vec<ImportSpec>, Vec<Group>, bool)> {
        let mut specs: Vec<ImportSpec> = Vec::new();
        let mut groups = Vec::new();
        let mut current = Group::default();
        let mut pending: Vec<String> = Vec::new();
        let mut pending_end_row = None;
        let mut inline_comments = false;
        let open_row = list.start_position().row;
        let mut last_row = open_row;
        let mut last_spec_row = None;
        let mut cursor = list.walk();

        for child in list.named_children(&mut cursor) {
            let start_row = child.start_position().row;
            if start_row > last_row + 1 && (current.len > 0 || !pending.is_empty()) {
                current.dangling.append(&mut pending);
                groups.push(std::mem::take(&mut current));
                last_spec_row = None;
            }

            match child.kind() {
                "comment" => {
                    if start_row == open_row {
                        inline_comments = true;
                    }
                    let text = self.text(child).trim_end().to_string();
                    match specs.last_mut() {
                        Some(spec) if last_spec_row == Some(start_row) && pending.is_empty() => {
                            spec.trailing.push(text);
                        }
                        _ => {
                            pending.push(text);
                            pending_end_row = Some(child.end_position().row);
                        }
                    }
                }
                "import_spec" => {
                    let mut spec = self.import_spec(child)?;
                    if spec.inner_comments
                        || (!pending.is_empty() && pending_end_row == Some(start_row))
                    {
                        inline_comments = true;
                    }
                    spec.leading = std::mem::take(&mut pending);
                    last_spec_row = Some(child.end_position().row);
                    specs.push(spec);
                    current.len += 1;
                }
                _ => {}
            }
            last_row = child.end_position().row;
        }

        current.dangling.append(&mut pending);
        if current.len > 0 || !current.dangling.is_empty() {
            groups.push(current);
        }

        Ok((specs, groups, inline_comments))
    }

    fn import_spec(&self, node: Node<'_>) -> Result<ImportSpec> {
        let literal_node = node
            .child_by_field_name("path")
            .ok_or_else(|| self.error_at(node, "syntax error: missing import path"))?;
        let literal_text = self.text(literal_node).to_string();

        let path = literal::unquote(&literal_text).ok_or_else(|| {
            self.error_at(literal_node, format!("invalid import path literal {}", literal_text))
        })?;
        if !literal::is_valid_import_path(&path) {
            return Err(self.error_at(literal_node, format!("invalid import path: {}", literal_text)));
        }

        let mut cursor = node.walk();
        let inner_comments = node
            .children(&mut cursor)
            .any(|child| child.kind() == "comment");
        let point = literal_node.start_position();

        Ok(ImportSpec {
            name: node
                .child_by_field_name("name")
                .map(|name| self.text(name).to_string()),
            path,
            literal: literal_text,
            line: point.row + 1,
            column: point.column + 1,
            literal_range: literal_node.byte_range(),
            inner_comments,
            leading: Vec::new(),
            trailing: Vec::new(),
        })
    }
}

/// Finds the first ERROR or MISSING node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn offset_to_line_col(prefix: &[u8]) -> (usize, usize) {
    let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = prefix.iter().rev().take_while(|&&b| b != b'\n').count() + 1;
    (line, column)
}

#[cfg(test)]
pub(crate) fn parse_source(source: &str) -> Result<SourceFile> {
    GoParser::new()?.parse(Path::new("test.go"), source.to_string())
}
