use std::sync::LazyLock;

use regex::Regex;

use crate::parser::query::{DocumentQuery, Selector, TextScope};
use crate::parser::text::extract_pattern;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

static AUTUADO_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::descendants("div").containing_ignore_case(TextScope::Own, "AUTUADO")
});

/// Filing date as printed on the page (`dd/mm/yyyy`).
pub fn extract<Q: DocumentQuery>(root: &Q) -> String {
    let text = root.query_one(&AUTUADO_BLOCK);
    extract_pattern(&DATE_RE, &text)
}
