use std::sync::LazyLock;

use crate::parser::query::{DocumentQuery, Selector, TextScope};
use crate::parser::text::clean_text;

static RAPPORTEUR_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::descendants("td")
        .containing_ignore_case(TextScope::Own, "RELATOR")
        .then_following_sibling("td")
        .at(1)
        .then_child("b")
        .own_text()
});

pub fn extract<Q: DocumentQuery>(root: &Q) -> String {
    clean_text(&root.query_one(&RAPPORTEUR_NAME))
}
