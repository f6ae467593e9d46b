// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Unknown keys get a "did you mean" suggestion (Jaro-Winkler via `strsim`)
//! and, when the offending TOML file is known, a labelled source span.

#![allow(unused_assignments)] // miette's Diagnostic derive trips this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a suggestion (`wokers` -> `workers`).
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, rendered Elm-style by miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key or section that no model struct declares.
    #[error("unknown key `{key}` in {}", describe_section(.section))]
    #[diagnostic(
        code(empath::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Dotted section path, empty at the top level.
        section: String,
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(empath::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key.
        key: String,
        found: String,
        expected: String,
        #[label("this value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key with no default was left out.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(empath::config::missing_key),
        help("set `{key}` in empath.toml or through an EMPATH_* variable")
    )]
    MissingKey { key: String },

    /// A value that parsed but is out of range.
    #[error("validation error: {message}")]
    #[diagnostic(code(empath::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(empath::config::other))]
    Other(String),
}

fn describe_section(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Converts every error inside `err` into a [`ConfigError`].
///
/// `toml_sources` pairs a display path with file content; they are used to
/// attach source spans. With a single source, errors whose origin figment
/// did not record (inline strings) are located in that source.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let section: Vec<String> = error.path.iter().map(ToString::to_string).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let located = locate(&error, toml_sources)
                        .and_then(|(path, content)| span_for(path, content, &section, field));
                    let (span, src) = located.unzip();
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: section.join("."),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    // For a type error the path ends with the key itself.
                    let located = section.split_last().and_then(|(key, parent)| {
                        locate(&error, toml_sources)
                            .and_then(|(path, content)| span_for(path, content, parent, key))
                    });
                    let (span, src) = located.unzip();
                    ConfigError::InvalidType {
                        key: section.join("."),
                        found: actual.to_string(),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: if section.is_empty() {
                        field.to_string()
                    } else {
                        format!("{}.{field}", section.join("."))
                    },
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Picks the source file an error came from.
fn locate<'a>(
    error: &figment::error::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let found = match origin {
        Some(origin) => toml_sources.iter().find(|(p, _)| *p == origin),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };
    found.map(|(p, c)| (p.as_str(), c.as_str()))
}

fn span_for(
    path: &str,
    content: &str,
    section: &[String],
    key: &str,
) -> Option<(SourceSpan, NamedSource<String>)> {
    let offset = find_key_offset(content, section, key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(path, content.to_string()),
    ))
}

/// Byte offset of `field` inside the `[section]` table of `content`.
///
/// The search stops at the next table header, so a same-named key in a
/// later section is never matched. With an empty `section` the field is
/// looked up among top-level keys, or as a table header (`[field]`).
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let mut in_section = section.is_empty();
    let wanted = section.join(".");
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.trim_start_matches('[').trim_end_matches(']').trim();
            if section.is_empty() && name == field {
                let name_at = line.find(name).unwrap_or(indent);
                return Some(offset + name_at);
            }
            if in_section && !section.is_empty() {
                return None;
            }
            in_section = !section.is_empty() && name == wanted;
        } else if in_section {
            let is_key = trimmed
                .strip_prefix(field)
                .and_then(|rest| rest.trim_start().strip_prefix('='))
                .is_some();
            if is_key {
                return Some(offset + indent);
            }
        }

        offset += line.len();
    }

    None
}

/// The valid key closest to `unknown`, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Writes every error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
