use std::sync::LazyLock;

use regex::Regex;

use crate::parser::query::{DocumentQuery, Selector, TextScope};
use crate::parser::text::extract_pattern;

static LEGACY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(?\d{2}\.\d{2}\.\d{4,}-\d\)?").unwrap());

// The old-format number sits in the paragraph right after the title line.
static LEGACY_PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| {
    Selector::descendants("p")
        .containing(TextScope::Full, "PROCESSO")
        .then_following_sibling("p")
        .at(1)
        .own_text()
});

pub fn extract<Q: DocumentQuery>(root: &Q) -> String {
    let text = root.query_one(&LEGACY_PARAGRAPH);
    extract_pattern(&LEGACY_RE, &text)
        .trim_matches(|c| c == '(' || c == ')')
        .to_string()
}
