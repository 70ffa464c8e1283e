//! Canonical printing of import declarations.
//!
//! Each import declaration's byte range is replaced with its canonical text;
//! everything between declarations is copied unchanged. Replacements are
//! applied in reverse offset order so earlier offsets stay valid.
//!
//! Canonical form follows gofmt: single declarations print as
//! `import [name] "path"`, parenthesized ones put each spec on its own line
//! indented by a tab, keep blank-line separated groups, and sort each group by
//! path and name. Printing a canonical file again yields identical bytes.
//!
//! Only import declarations are reformatted; the rest of the file, including
//! code gofmt would reflow, is copied byte for byte.

use std::cmp::Ordering;

use crate::source::{ImportDecl, ImportSpec, Layout, SourceFile};

/// A single text replacement with position information.
#[derive(Debug, Clone)]
struct Replacement {
    start: usize,
    end: usize,
    new_text: String,
}

/// Renders `file` with every import declaration in canonical form.
pub fn print(file: &SourceFile) -> String {
    let source = file.source();
    let replacements = file
        .decls()
        .iter()
        .map(|decl| Replacement {
            start: decl.range.start,
            end: decl.range.end,
            new_text: print_decl(source, decl),
        })
        .collect();
    apply_replacements(source, replacements)
}

fn apply_replacements(content: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for rep in replacements {
        if rep.start <= rep.end && rep.end <= result.len() {
            result.replace_range(rep.start..rep.end, &rep.new_text);
        }
    }
    result
}

fn print_decl(source: &str, decl: &ImportDecl) -> String {
    match &decl.layout {
        Layout::Single => format!("import {}", spec_text(&decl.specs[0])),
        Layout::Verbatim { .. } => {
            let base = decl.range.start;
            let replacements = decl
                .specs
                .iter()
                .map(|spec| Replacement {
                    start: spec.literal_range.start - base,
                    end: spec.literal_range.end - base,
                    new_text: spec.literal.clone(),
                })
                .collect();
            apply_replacements(&source[decl.range.clone()], replacements)
        }
        Layout::Grouped(groups) => {
            if groups.is_empty() {
                return "import ()".to_string();
            }

            let newline = if source[decl.range.clone()].contains("\r\n") {
                "\r\n"
            } else {
                "\n"
            };

            let mut out = format!("import ({}", newline);
            let mut specs = decl.specs.iter();
            for (index, group) in groups.iter().enumerate() {
                if index > 0 {
                    out.push_str(newline);
                }

                let mut members: Vec<&ImportSpec> = specs.by_ref().take(group.len).collect();
                members.sort_by(|a, b| compare_specs(a, b));

                for (i, spec) in members.iter().enumerate() {
                    if members.get(i + 1).is_some_and(|next| collapses(spec, next)) {
                        continue;
                    }
                    for comment in &spec.leading {
                        out.push('\t');
                        out.push_str(comment);
                        out.push_str(newline);
                    }
                    out.push('\t');
                    out.push_str(&spec_text(spec));
                    for comment in &spec.trailing {
                        out.push(' ');
                        out.push_str(comment);
                    }
                    out.push_str(newline);
                }
                for comment in &group.dangling {
                    out.push('\t');
                    out.push_str(comment);
                    out.push_str(newline);
                }
            }
            out.push(')');
            out
        }
    }
}

fn spec_text(spec: &ImportSpec) -> String {
    match &spec.name {
        Some(name) => format!("{} {}", name, spec.literal),
        None => spec.literal.clone(),
    }
}

fn compare_specs(a: &ImportSpec, b: &ImportSpec) -> Ordering {
    a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name))
}

/// A spec without comments is dropped when the next one imports the same
/// path under the same name.
fn collapses(spec: &ImportSpec, next: &ImportSpec) -> bool {
    spec.path == next.path
        && spec.name == next.name
        && spec.leading.is_empty()
        && spec.trailing.is_empty()
        && !spec.inner_comments
}
