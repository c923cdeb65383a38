use std::fs;
use std::path::{Path, PathBuf};

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "scanner/exports_grammar.pest"] // relative to src
pub struct ExportScanner;

/// One export surfaced by the scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannedExport {
    /// A named export (`export const foo`, `exports.foo = ...`).
    Named(String),
    /// A default export of unknown shape.
    Default,
    /// The module re-exports everything from another module
    /// (`export * from './x'`, `module.exports = require('./x')`).
    ReexportAll(String),
    /// A named re-export (`export { a } from './x'`).
    ReexportNamed { name: String, from: String },
}

/// Scan source text for its export surface. Best-effort: anything the
/// scanner cannot make sense of is skipped, and a failed parse yields an
/// empty list, never an error.
pub fn scan_source(source: &str) -> Vec<ScannedExport> {
    let pairs = match ExportScanner::parse(Rule::scan, source) {
        Ok(mut pairs) => match pairs.next() {
            Some(scan) => scan.into_inner(),
            None => return Vec::new(),
        },
        Err(_) => return Vec::new(),
    };

    let mut exports = Vec::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::cjs_member => {
                if let Some(name) = first_ident(pair) {
                    exports.push(ScannedExport::Named(name));
                }
            }
            Rule::cjs_define => {
                if let Some(name) = first_str_lit(pair) {
                    exports.push(ScannedExport::Named(name));
                }
            }
            Rule::cjs_require => {
                if let Some(path) = first_str_lit(pair) {
                    exports.push(ScannedExport::ReexportAll(path));
                }
            }
            Rule::cjs_object => {
                for key in pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::obj)
                    .map(|obj| extract_object_keys(obj.as_str()))
                    .unwrap_or_default()
                {
                    exports.push(ScannedExport::Named(key));
                }
            }
            Rule::cjs_ident => {
                exports.push(ScannedExport::Default);
            }
            Rule::esm_star_from => {
                if let Some(path) = first_str_lit(pair) {
                    exports.push(ScannedExport::ReexportAll(path));
                }
            }
            Rule::esm_named => {
                let mut names = Vec::new();
                let mut from = None;
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::name_spec => {
                            // `a as b` exports `b`; plain `a` exports `a`.
                            let idents: Vec<String> = inner
                                .into_inner()
                                .filter(|p| p.as_rule() == Rule::ident)
                                .map(|p| p.as_str().to_string())
                                .collect();
                            if let Some(name) = idents.last() {
                                names.push(name.clone());
                            }
                        }
                        Rule::str_lit => from = str_lit_text(inner),
                        _ => {}
                    }
                }
                for name in names {
                    match &from {
                        Some(path) => exports.push(ScannedExport::ReexportNamed {
                            name,
                            from: path.clone(),
                        }),
                        None => exports.push(ScannedExport::Named(name)),
                    }
                }
            }
            Rule::esm_decl => {
                let mut is_default = false;
                let mut name = None;
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::default_kw => is_default = true,
                        Rule::ident => name = Some(inner.as_str().to_string()),
                        _ => {}
                    }
                }
                if is_default {
                    exports.push(ScannedExport::Default);
                } else if let Some(name) = name {
                    exports.push(ScannedExport::Named(name));
                }
            }
            Rule::esm_default => {
                exports.push(ScannedExport::Default);
            }
            _ => {}
        }
    }
    dedup_preserving_order(exports)
}

/// Scan a file on disk. Read failures yield an empty list.
pub fn scan_file(path: &Path) -> Vec<ScannedExport> {
    match fs::read_to_string(path) {
        Ok(source) => scan_source(&source),
        Err(_) => Vec::new(),
    }
}

/// Scan an entry file and follow re-exports one level through sibling files.
/// Re-exports pointing at other packages are kept as-is; relative ones are
/// replaced by the named exports of the target file.
pub fn scan_with_reexports(entry: &Path) -> Vec<ScannedExport> {
    let mut resolved = Vec::new();
    for export in scan_file(entry) {
        match &export {
            ScannedExport::ReexportAll(from) if from.starts_with('.') => {
                match resolve_sibling(entry, from) {
                    Some(sibling) => {
                        for inner in scan_file(&sibling) {
                            // One level only: nested re-exports are dropped.
                            match inner {
                                ScannedExport::Named(_) | ScannedExport::Default => {
                                    resolved.push(inner)
                                }
                                _ => {}
                            }
                        }
                    }
                    None => resolved.push(export),
                }
            }
            ScannedExport::ReexportNamed { name, from } if from.starts_with('.') => {
                // The name is known either way; the sibling scan is only a
                // reachability check.
                let _ = resolve_sibling(entry, from);
                resolved.push(ScannedExport::Named(name.clone()));
            }
            _ => resolved.push(export),
        }
    }
    dedup_preserving_order(resolved)
}

fn resolve_sibling(entry: &Path, relative: &str) -> Option<PathBuf> {
    let base = entry.parent()?;
    let target = base.join(relative);
    if target.is_file() {
        return Some(target);
    }
    let with_ext = base.join(format!("{}.js", relative));
    if with_ext.is_file() {
        return Some(with_ext);
    }
    let index = target.join("index.js");
    if index.is_file() {
        return Some(index);
    }
    None
}

fn first_ident(pair: pest::iterators::Pair<Rule>) -> Option<String> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
}

fn first_str_lit(pair: pest::iterators::Pair<Rule>) -> Option<String> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::str_lit)
        .and_then(str_lit_text)
}

fn str_lit_text(pair: pest::iterators::Pair<Rule>) -> Option<String> {
    pair.into_inner().next().map(|p| p.as_str().to_string())
}

/// Extract the top-level keys of an object-literal span, tolerating nested
/// objects, arrays, call arguments, strings, and shorthand/method members.
fn extract_object_keys(text: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut expect_key = false;
    let mut current = String::new();

    for ch in text.chars() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => in_string = Some(ch),
            '{' | '[' | '(' => {
                // `d() {}` method shorthand: the key ends at the paren.
                if ch == '(' && depth == 1 && !current.is_empty() {
                    keys.push(current.clone());
                }
                if ch == '{' && depth == 0 {
                    expect_key = true;
                } else {
                    expect_key = false;
                }
                depth += 1;
                current.clear();
            }
            '}' | ']' | ')' => {
                if depth == 1 && !current.is_empty() {
                    keys.push(current.clone());
                }
                current.clear();
                depth = depth.saturating_sub(1);
                expect_key = false;
            }
            ',' if depth == 1 => {
                if !current.is_empty() {
                    keys.push(current.clone());
                }
                current.clear();
                expect_key = true;
            }
            ':' if depth == 1 => {
                if !current.is_empty() {
                    keys.push(current.clone());
                }
                current.clear();
                expect_key = false;
            }
            c if depth == 1 && expect_key => {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    current.push(c);
                } else if c == '.' {
                    // spread entry: not a key we can name
                    current.clear();
                    expect_key = false;
                } else if !c.is_whitespace() {
                    current.clear();
                }
            }
            _ => {}
        }
    }
    keys
}

fn dedup_preserving_order(exports: Vec<ScannedExport>) -> Vec<ScannedExport> {
    let mut seen = Vec::new();
    for export in exports {
        if !seen.contains(&export) {
            seen.push(export);
        }
    }
    seen
}
