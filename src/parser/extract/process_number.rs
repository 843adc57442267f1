use std::sync::LazyLock;

use regex::Regex;

use crate::parser::query::{DocumentQuery, Selector, TextScope};
use crate::parser::text::extract_pattern;

pub static PROCESS_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{7}-\d{2}\.\d{4}\.\d\.\d{2}\.\d{4}").unwrap());

static PROCESS_PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::descendants("p")
        .containing_ignore_case(TextScope::Full, "PROCESSO")
        .own_text()
});

/// Unified process number, e.g. `0015648-78.1999.4.05.0000`.
pub fn extract<Q: DocumentQuery>(root: &Q) -> String {
    let text = root.query_joined(&PROCESS_PARAGRAPHS);
    extract_pattern(&PROCESS_NUMBER_RE, &text)
}
