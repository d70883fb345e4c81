//! Table-of-contents rendering and splicing.

use crate::heading::{parse_heading, Heading};
use regex::Regex;
use std::sync::LazyLock;
use vibes_common_config::TocMarkers;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("anchor filter is a valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

/// GitHub-style anchor for a heading title.
pub fn generate_anchor(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lower, "");
    WHITESPACE_RE.replace_all(&stripped, "-").into_owned()
}

/// Render one TOC line per heading.
pub fn render(headings: &[Heading]) -> Vec<String> {
    headings
        .iter()
        .map(|h| {
            let indent = "  ".repeat(usize::from(h.level.saturating_sub(1)));
            format!(
                "{indent}- [{title}](#{anchor}) (L{start}-L{end})",
                title = h.title,
                anchor = generate_anchor(&h.title),
                start = h.start_line,
                end = h.end_line,
            )
        })
        .collect()
}

/// Places rendered TOC lines under the marker section of a document.
#[derive(Debug, Clone, Default)]
pub struct TocSynthesizer {
    markers: TocMarkers,
}

impl TocSynthesizer {
    pub fn new(markers: TocMarkers) -> Self {
        Self { markers }
    }

    /// True if `line` is a level-2 heading whose title is a TOC marker.
    pub fn is_marker_line(&self, line: &str) -> bool {
        matches!(parse_heading(line), Some((2, title)) if self.markers.is_marker(title))
    }

    /// Insert `toc` right after the marker line, dropping whatever sat between
    /// the marker and the next `#` line.
    ///
    /// Returns `None` when the document has no marker.
    pub fn splice_into(&self, text: &str, toc: &[String]) -> Option<String> {
        let mut out: Vec<&str> = Vec::new();
        let mut found = false;
        let mut in_toc = false;

        for line in text.split('\n') {
            if self.is_marker_line(line) {
                out.push(line);
                out.extend(toc.iter().map(String::as_str));
                found = true;
                in_toc = true;
            } else if in_toc {
                if line.starts_with('#') {
                    in_toc = false;
                    out.push(line);
                }
            } else {
                out.push(line);
            }
        }

        found.then(|| out.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::HeadingExtractor;
    use test_case::test_case;

    #[test_case("Hello, World!", "hello-world" ; "punctuation stripped")]
    #[test_case("Setup", "setup" ; "single word")]
    #[test_case("API  v2 - Usage", "api-v2---usage" ; "hyphens kept")]
    #[test_case("snake_case name", "snake_case-name" ; "underscore is a word char")]
    #[test_case("設計 方針", "設計-方針" ; "unicode words kept")]
    fn test_generate_anchor(title: &str, expected: &str) {
        assert_eq!(generate_anchor(title), expected);
    }

    #[test]
    fn test_render_indents_by_level() {
        let headings = vec![
            Heading { level: 1, title: "Intro".into(), start_line: 3, end_line: 4 },
            Heading { level: 3, title: "Deep Dive".into(), start_line: 7, end_line: 9 },
        ];
        assert_eq!(render(&headings), vec![
            "- [Intro](#intro) (L3-L4)".to_string(),
            "    - [Deep Dive](#deep-dive) (L7-L9)".to_string(),
        ]);
    }

    #[test]
    fn test_marker_line_detection() {
        let synth = TocSynthesizer::default();
        assert!(synth.is_marker_line("## TOC"));
        assert!(synth.is_marker_line("## 目次"));
        assert!(!synth.is_marker_line("# TOC"));
        assert!(!synth.is_marker_line("### TOC"));
        assert!(!synth.is_marker_line("## Table"));
    }

    #[test]
    fn test_splice_without_marker() {
        let synth = TocSynthesizer::default();
        assert_eq!(synth.splice_into("# A\nbody", &["- x".to_string()]), None);
    }

    #[test]
    fn test_splice_replaces_old_body() {
        let synth = TocSynthesizer::default();
        let text = "# Doc\n## TOC\n- [Old](#old)\n\n## Section\ntext";
        let spliced = synth.splice_into(text, &["- [New](#new)".to_string()]).unwrap();
        assert_eq!(spliced, "# Doc\n## TOC\n- [New](#new)\n## Section\ntext");
    }

    #[test]
    fn test_end_to_end_document() {
        let text = "## TOC\n\n# Intro\n## Setup\n# Next";
        let headings = HeadingExtractor::default().extract(text);
        let spliced = TocSynthesizer::default().splice_into(text, &render(&headings)).unwrap();

        assert_eq!(
            spliced,
            "## TOC\n- [Intro](#intro) (L3-L4)\n  - [Setup](#setup) (L4-L4)\n- [Next](#next) (L5-L5)\n# Intro\n## Setup\n# Next"
        );
    }
}
