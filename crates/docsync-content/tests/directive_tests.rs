//! Property and integration tests for directive stripping

use docsync_content::{ContentComparator, find_directives, strip_directive_bodies};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const PAGE: &str = r#"# Weekly review

Open tasks:

<!-- #query task where done = false render [[template/task]] -->
* [ ] Write report
* [ ] Call Sam
<!-- /query -->

Pages tagged #meeting:

<!-- #query page where tags = "meeting" -->
| name | modified |
|------|----------|
| standup | 2024-01-02 |
<!-- /query -->

```md
<!-- #query this is an example, not a directive -->
```
"#;

#[test]
fn realistic_page_has_two_directives() {
    let directives = find_directives(PAGE).unwrap();
    assert_eq!(directives.len(), 2);
    assert!(directives.iter().all(|d| d.kind == "query"));
}

#[test]
fn realistic_page_strips_to_markers() {
    let stripped = strip_directive_bodies(PAGE).unwrap();
    assert!(!stripped.contains("Write report"));
    assert!(!stripped.contains("standup"));
    assert!(stripped.contains("<!-- #query page where tags = \"meeting\" --><!-- /query -->"));
    assert!(stripped.contains("this is an example, not a directive"));
}

#[test]
fn rerendered_page_is_equivalent() {
    let rerendered = PAGE.replace("* [ ] Call Sam\n", "");
    let cmp = ContentComparator::default();
    assert!(cmp.equivalent("review.md", PAGE.as_bytes(), rerendered.as_bytes()));
}

#[test]
fn edited_prose_is_not_equivalent() {
    let edited = PAGE.replace("Open tasks:", "Open tasks (urgent):");
    let cmp = ContentComparator::default();
    assert!(!cmp.equivalent("review.md", PAGE.as_bytes(), edited.as_bytes()));
}

proptest! {
    #[test]
    fn text_without_comments_is_unchanged(s in "[^<]*") {
        prop_assert_eq!(strip_directive_bodies(&s).unwrap(), s);
    }

    #[test]
    fn stripping_is_idempotent(prefix in "[a-z \n]{0,40}", body in "[a-z \n*]{0,40}", suffix in "[a-z \n]{0,40}") {
        let doc = format!("{prefix}<!-- #query page -->{body}<!-- /query -->{suffix}");
        let once = strip_directive_bodies(&doc).unwrap();
        let twice = strip_directive_bodies(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn body_content_never_affects_equivalence(body_a in "[a-z \n*|]{0,60}", body_b in "[a-z \n*|]{0,60}") {
        let a = format!("# T\n<!-- #query task -->{body_a}<!-- /query -->\n");
        let b = format!("# T\n<!-- #query task -->{body_b}<!-- /query -->\n");
        let cmp = ContentComparator::default();
        prop_assert!(cmp.equivalent("t.md", a.as_bytes(), b.as_bytes()));
    }
}
