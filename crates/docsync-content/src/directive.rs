//! Directive discovery and body stripping
//!
//! A directive opens with `<!-- #kind args -->` and closes with
//! `<!-- /kind -->`. Everything between the two markers is the directive
//! body, which is rendered output and not part of the document's identity.
//! Markers inside fenced code blocks are plain text.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Matches either an opening or a closing directive marker
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<!--\s*(?:#(?P<open>[A-Za-z][\w-]*)(?P<args>.*?)|/(?P<close>[A-Za-z][\w-]*)\s*)-->",
    )
    .unwrap()
});

/// Matches a code fence line (``` or ~~~, optionally indented up to 3 spaces)
static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(```+|~~~+)").unwrap());

/// A directive located in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive kind, e.g. `query` for `<!-- #query ... -->`
    pub kind: String,
    /// Arguments after the kind in the opening marker, trimmed
    pub args: String,
    /// Byte range of the whole directive, markers included
    pub span: Range<usize>,
    /// Byte range of the body between the markers
    pub body: Range<usize>,
    /// Nesting depth; 0 for top-level directives
    pub depth: usize,
}

struct Open {
    kind: String,
    args: String,
    start: usize,
    end: usize,
}

/// Find all directives in `source`, ordered by start position.
///
/// # Errors
///
/// Fails if a closing marker has no opening marker, closes a different
/// kind than the innermost open directive, or an opening marker is never
/// closed.
pub fn find_directives(source: &str) -> Result<Vec<Directive>> {
    let fenced = fenced_ranges(source);
    let in_fence = |pos: usize| fenced.iter().any(|r| r.contains(&pos));

    let mut stack: Vec<Open> = Vec::new();
    let mut directives = Vec::new();

    for cap in MARKER_PATTERN.captures_iter(source) {
        let Some(marker) = cap.get(0) else {
            continue;
        };
        if in_fence(marker.start()) {
            continue;
        }

        if let Some(kind) = cap.name("open") {
            stack.push(Open {
                kind: kind.as_str().to_string(),
                args: cap
                    .name("args")
                    .map(|a| a.as_str().trim().to_string())
                    .unwrap_or_default(),
                start: marker.start(),
                end: marker.end(),
            });
        } else if let Some(kind) = cap.name("close") {
            let kind = kind.as_str();
            let Some(open) = stack.pop() else {
                return Err(Error::UnbalancedDirective {
                    kind: kind.to_string(),
                    position: marker.start(),
                });
            };
            if open.kind != kind {
                return Err(Error::MismatchedDirective {
                    expected: open.kind,
                    found: kind.to_string(),
                    position: marker.start(),
                });
            }
            directives.push(Directive {
                kind: open.kind,
                args: open.args,
                span: open.start..marker.end(),
                body: open.end..marker.start(),
                depth: stack.len(),
            });
        }
    }

    if let Some(open) = stack.pop() {
        return Err(Error::UnclosedDirective {
            kind: open.kind,
            position: open.start,
        });
    }

    directives.sort_by_key(|d| d.span.start);
    Ok(directives)
}

/// Remove the bodies of all top-level directives, keeping their markers.
///
/// Nested directives disappear along with the body that contains them.
pub fn strip_directive_bodies(source: &str) -> Result<String> {
    let directives = find_directives(source)?;

    let mut result = String::with_capacity(source.len());
    let mut cursor = 0;
    for directive in directives.iter().filter(|d| d.depth == 0) {
        result.push_str(&source[cursor..directive.body.start]);
        cursor = directive.body.end;
    }
    result.push_str(&source[cursor..]);
    Ok(result)
}

/// Byte ranges covered by fenced code blocks.
///
/// An unterminated fence runs to the end of the document.
fn fenced_ranges(source: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<(usize, char, usize)> = None;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        if let Some(cap) = FENCE_PATTERN.captures(line)
            && let Some(fence) = cap.get(1)
        {
            let fence = fence.as_str();
            let ch = fence.chars().next().unwrap_or('`');
            match open {
                None => open = Some((offset, ch, fence.len())),
                Some((start, open_ch, open_len)) if ch == open_ch && fence.len() >= open_len => {
                    ranges.push(start..offset + line.len());
                    open = None;
                }
                Some(_) => {}
            }
        }
        offset += line.len();
    }

    if let Some((start, _, _)) = open {
        ranges.push(start..source.len());
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_single_directive() {
        let source = "# Page\n<!-- #query page where tag = \"todo\" -->\n* [[a]]\n<!-- /query -->\nend\n";
        let directives = find_directives(source).unwrap();
        assert_eq!(directives.len(), 1);
        let d = &directives[0];
        assert_eq!(d.kind, "query");
        assert_eq!(d.args, "page where tag = \"todo\"");
        assert_eq!(&source[d.body.clone()], "\n* [[a]]\n");
        assert_eq!(d.depth, 0);
    }

    #[test]
    fn args_may_contain_angle_brackets() {
        let source = "<!-- #query task where priority > 2 -->x<!-- /query -->";
        let directives = find_directives(source).unwrap();
        assert_eq!(directives[0].args, "task where priority > 2");
    }

    #[test]
    fn strips_body_but_keeps_markers() {
        let source = "before\n<!-- #use [[template]] -->\nrendered\n<!-- /use -->\nafter";
        assert_eq!(
            strip_directive_bodies(source).unwrap(),
            "before\n<!-- #use [[template]] --><!-- /use -->\nafter"
        );
    }

    #[test]
    fn nested_directives_are_stripped_with_their_parent() {
        let source =
            "<!-- #include [[a]] -->\n<!-- #query page -->\nx\n<!-- /query -->\n<!-- /include -->";
        let directives = find_directives(source).unwrap();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].kind, "include");
        assert_eq!(directives[0].depth, 0);
        assert_eq!(directives[1].kind, "query");
        assert_eq!(directives[1].depth, 1);

        assert_eq!(
            strip_directive_bodies(source).unwrap(),
            "<!-- #include [[a]] --><!-- /include -->"
        );
    }

    #[test]
    fn plain_comments_are_not_directives() {
        let source = "<!-- just a note -->\ntext";
        assert!(find_directives(source).unwrap().is_empty());
        assert_eq!(strip_directive_bodies(source).unwrap(), source);
    }

    #[test]
    fn markers_inside_code_fences_are_ignored() {
        let source = "```markdown\n<!-- #query page -->\n```\ntext\n";
        assert!(find_directives(source).unwrap().is_empty());
    }

    #[test]
    fn unterminated_fence_hides_rest_of_document() {
        let source = "~~~\n<!-- /query -->\n";
        assert!(find_directives(source).unwrap().is_empty());
    }

    #[test]
    fn stray_close_is_unbalanced() {
        let err = find_directives("text <!-- /query -->").unwrap_err();
        assert!(matches!(err, Error::UnbalancedDirective { ref kind, position: 5 } if kind == "query"));
    }

    #[test]
    fn unclosed_open_is_reported() {
        let err = find_directives("<!-- #query page -->\nbody").unwrap_err();
        assert!(matches!(err, Error::UnclosedDirective { ref kind, position: 0 } if kind == "query"));
    }

    #[test]
    fn mismatched_close_is_reported() {
        let err = find_directives("<!-- #query page -->x<!-- /use -->").unwrap_err();
        assert!(matches!(
            err,
            Error::MismatchedDirective { ref expected, ref found, .. }
                if expected == "query" && found == "use"
        ));
    }
}
