use std::sync::LazyLock;

use crate::parser::query::{DocumentQuery, Selector, TextScope};
use crate::parser::text::normalize_space;
use crate::record::Movement;

/// Every movement is laid out as its own table headed by an "Em dd/mm/yyyy" link.
pub const DATE_PREFIX: &str = "Em ";

static MOVEMENT_TABLES: LazyLock<Selector> =
    LazyLock::new(|| Selector::descendants("table").containing(TextScope::Full, DATE_PREFIX));
static DATE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::descendants("a").descendant_text());
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::descendants("tr")
        .at(2)
        .then_child("td")
        .at(2)
        .descendant_text()
});

pub fn extract<Q: DocumentQuery>(root: &Q) -> Vec<Movement> {
    root.select(&MOVEMENT_TABLES)
        .iter()
        .filter_map(|table| {
            let date = normalize_space(&table.query_one(&DATE_LINK))
                .replace(DATE_PREFIX, "")
                .trim()
                .to_string();
            let text = normalize_space(&table.query_joined(&DESCRIPTION));

            if date.is_empty() || text.is_empty() {
                return None;
            }
            Some(Movement { date, text })
        })
        .collect()
}
