//! Math delimiter grammar shared by every rendering surface.

use serde::Serialize;
use smol_str::SmolStr;

/// A left/right pair and whether the enclosed math is typeset as a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delimiter {
    pub left: SmolStr,
    pub right: SmolStr,
    pub display: bool,
}

impl Delimiter {
    pub fn new(left: &str, right: &str, display: bool) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            display,
        }
    }
}

/// Delimiters in match priority order plus the elements whose text is never
/// scanned for math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathConfig {
    pub delimiters: Vec<Delimiter>,
    pub ignored_tags: Vec<SmolStr>,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            delimiters: vec![
                Delimiter::new("$$", "$$", true),
                Delimiter::new(r"\[", r"\]", true),
                Delimiter::new("$", "$", false),
                Delimiter::new(r"\(", r"\)", false),
            ],
            ignored_tags: ["script", "noscript", "style", "textarea", "pre", "code"]
                .into_iter()
                .map(SmolStr::new_static)
                .collect(),
        }
    }
}

impl MathConfig {
    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignored_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Math {
        /// Expression between the delimiters
        tex: &'a str,
        /// Expression including its delimiters, used when rendering fails
        raw: &'a str,
        display: bool,
    },
}

/// Split `text` into literal runs and delimited math.
///
/// Scans left to right. At each position the first delimiter in list order
/// whose left side matches wins. The right side is searched for outside of
/// braces, skipping backslash-escaped characters. If it is never found the
/// remainder is returned as literal text.
pub fn split_at_delimiters<'a>(text: &'a str, delimiters: &[Delimiter]) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut rest = text;

    loop {
        let Some((start, delimiter)) = find_left(rest, delimiters) else {
            break;
        };
        let Some(end) = find_end_of_math(rest, start + delimiter.left.len(), &delimiter.right) else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }
        let close = end + delimiter.right.len();
        segments.push(Segment::Math {
            tex: &rest[start + delimiter.left.len()..end],
            raw: &rest[start..close],
            display: delimiter.display,
        });
        rest = &rest[close..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

/// True when `text` contains at least one complete math span.
pub fn contains_math(text: &str, delimiters: &[Delimiter]) -> bool {
    split_at_delimiters(text, delimiters)
        .iter()
        .any(|s| matches!(s, Segment::Math { .. }))
}

fn find_left<'d>(text: &str, delimiters: &'d [Delimiter]) -> Option<(usize, &'d Delimiter)> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|i| {
        delimiters
            .iter()
            .find(|d| !d.left.is_empty() && bytes[i..].starts_with(d.left.as_bytes()))
            .map(|d| (i, d))
    })
}

fn find_end_of_math(text: &str, from: usize, right: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let right = right.as_bytes();
    let mut depth: i32 = 0;
    let mut i = from;
    while i < bytes.len() {
        if depth <= 0 && bytes[i..].starts_with(right) {
            return Some(i);
        }
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}
