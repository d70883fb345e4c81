//! Heading extraction with section span computation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use vibes_common_config::TocMarkers;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)").expect("heading pattern is a valid regex"));

/// A document heading and the line span of its section (1-indexed, inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub title: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Parse a single line as a heading, returning `(level, trimmed title)`.
pub fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let title = caps.get(2)?.as_str().trim();
    Some((level, title))
}

struct RawHeading<'a> {
    level: u8,
    title: &'a str,
    line: usize,
    is_marker: bool,
}

/// Extracts headings, leaving out table-of-contents markers.
#[derive(Debug, Clone, Default)]
pub struct HeadingExtractor {
    markers: TocMarkers,
}

impl HeadingExtractor {
    pub fn new(markers: TocMarkers) -> Self {
        Self { markers }
    }

    /// Extract the ordered headings of `text` with their section spans.
    ///
    /// A section ends at the last non-blank line before the next heading of
    /// equal or shallower level. Marker headings are not returned but still
    /// close the sections above them.
    pub fn extract(&self, text: &str) -> Vec<Heading> {
        let lines: Vec<&str> = text.split('\n').collect();

        let raw: Vec<RawHeading<'_>> = lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let (level, title) = parse_heading(line)?;
                Some(RawHeading {
                    level,
                    title,
                    line: idx + 1,
                    is_marker: self.markers.is_marker(title),
                })
            })
            .collect();

        raw.iter()
            .enumerate()
            .filter(|(_, h)| !h.is_marker)
            .map(|(i, h)| {
                let boundary = raw[i + 1..]
                    .iter()
                    .find(|next| next.level <= h.level)
                    .map(|next| next.line - 1)
                    .unwrap_or(lines.len());

                let end_line = (h.line..=boundary)
                    .rev()
                    .find(|&n| !lines[n - 1].trim().is_empty())
                    .unwrap_or(h.line);

                Heading {
                    level: h.level,
                    title: h.title.to_string(),
                    start_line: h.line,
                    end_line,
                }
            })
            .collect()
    }
}
