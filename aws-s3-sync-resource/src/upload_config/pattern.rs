/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Glob patterns for object keys.
//!
//! Matching follows shell-style (minimatch) rules rather than plain [`glob`] rules:
//!
//! - `*` and `?` never cross a `/`, `**` matches any number of path segments
//! - wildcards never match a leading `.` in a segment unless the dot is written literally
//! - `{a,b}` expands to one alternative per comma separated item (nested groups allowed)
//! - a leading `!` negates the pattern, a leading `#` makes the whole pattern a comment
//!   that matches nothing
//! - `**` only recurses when it is a whole path segment, elsewhere it is a plain `*`
//! - `[^...]` is a negated class, the same as `[!...]`
//! - `\` escapes the next character
//!
//! Keys that are not valid globs are matched literally.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A compiled pattern from the upload configuration.
#[derive(Debug, Clone)]
pub(crate) struct KeyPattern {
    negated: bool,
    /// Empty for comments
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone)]
enum Alternative {
    Glob(Pattern),
    Literal(String),
}

impl Alternative {
    fn compile(pattern: String) -> Self {
        match Pattern::new(&normalize(&pattern)) {
            Ok(glob) => Alternative::Glob(glob),
            Err(err) => {
                tracing::warn!("`{pattern}` is not a valid glob pattern ({err}), matching it literally");
                Alternative::Literal(pattern)
            }
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Alternative::Glob(glob) => glob.matches_with(key, MATCH_OPTIONS),
            Alternative::Literal(literal) => literal == key,
        }
    }
}

impl KeyPattern {
    pub(crate) fn new(pattern: &str) -> Self {
        if pattern.starts_with('#') {
            return KeyPattern {
                negated: false,
                alternatives: Vec::new(),
            };
        }

        let body = pattern.trim_start_matches('!');
        let negated = (pattern.len() - body.len()) % 2 == 1;
        let alternatives = expand_braces(body)
            .into_iter()
            .map(Alternative::compile)
            .collect();

        KeyPattern {
            negated,
            alternatives,
        }
    }

    pub(crate) fn matches(&self, key: &str) -> bool {
        if self.alternatives.is_empty() {
            return false;
        }
        let matched = self.alternatives.iter().any(|alt| alt.matches(key));
        matched != self.negated
    }
}

/// Rewrite minimatch syntax the `glob` crate reads differently.
fn normalize(pattern: &str) -> String {
    pattern
        .split('/')
        .map(normalize_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_segment(segment: &str) -> String {
    if segment == "**" {
        return segment.to_owned();
    }

    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&Pattern::escape(escaped.encode_utf8(&mut [0; 4]))),
                None => out.push('\\'),
            },
            '*' => {
                while chars.next_if_eq(&'*').is_some() {}
                out.push('*');
            }
            '[' => {
                out.push('[');
                if chars.next_if(|&c| c == '^' || c == '!').is_some() {
                    out.push('!');
                }
                // a `]` right after the opening bracket is part of the class
                if chars.next_if_eq(&']').is_some() {
                    out.push(']');
                }
                for c in chars.by_ref() {
                    out.push(c);
                    if c == ']' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Expand the first brace group and recurse into each result.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(group) = find_brace_group(pattern) else {
        return vec![pattern.to_owned()];
    };

    let prefix = &pattern[..group.open];
    let suffix = &pattern[group.close + 1..];

    let mut bounds = Vec::with_capacity(group.commas.len() + 2);
    bounds.push(group.open);
    bounds.extend_from_slice(&group.commas);
    bounds.push(group.close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let item = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{prefix}{item}{suffix}"))
        })
        .collect()
}

#[derive(Debug, PartialEq)]
struct BraceGroup {
    open: usize,
    close: usize,
    /// positions of the top level commas inside the group
    commas: Vec<usize>,
}

/// Find the first `{...}` group that contains a top level comma.
///
/// Groups without a comma are literal text. `[...]` character classes are skipped.
fn find_brace_group(pattern: &str) -> Option<BraceGroup> {
    let bytes = pattern.as_bytes();
    let mut start = 0;
    while let Some(offset) = next_unbracketed(bytes, start, b'{') {
        let open = offset;
        let mut depth = 0usize;
        let mut commas = Vec::new();
        let mut i = open + 1;
        let mut close = None;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'[' => i = skip_class(bytes, i),
                b'{' => depth += 1,
                b'}' if depth == 0 => {
                    close = Some(i);
                    break;
                }
                b'}' => depth -= 1,
                b',' if depth == 0 => commas.push(i),
                _ => {}
            }
            i += 1;
        }

        match close {
            Some(close) if !commas.is_empty() => {
                return Some(BraceGroup {
                    open,
                    close,
                    commas,
                })
            }
            _ => start = open + 1,
        }
    }
    None
}

fn next_unbracketed(bytes: &[u8], mut i: usize, needle: u8) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => i = skip_class(bytes, i),
            b if b == needle => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `]` closing the class opened at `open`, or `open` itself when unclosed.
fn skip_class(bytes: &[u8], open: usize) -> usize {
    // a `]` right after `[` (or `[!`) is part of the class
    let mut i = open + 1;
    if matches!(bytes.get(i), Some(b'!' | b'^')) {
        i += 1;
    }
    if bytes.get(i) == Some(&b']') {
        i += 1;
    }
    while i < bytes.len() {
        if bytes[i] == b']' {
            return i;
        }
        i += 1;
    }
    open
}
