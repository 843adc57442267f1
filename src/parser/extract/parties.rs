use std::sync::LazyLock;

use crate::parser::query::{DocumentQuery, Selector};
use crate::parser::text::{clean_text, normalize_space};
use crate::record::Party;

pub const RAPPORTEUR_ROLE: &str = "RELATOR";

/// The parties table is the third table on the result page.
static PARTIES_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::descendants("table").nth(3));
static ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::descendants("tr"));
static ROLE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::children("td").at(1).descendant_text());
static NAME_CELL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::children("td")
        .at(2)
        .then_descendant("b")
        .own_text()
});

/// Parties in document order. The rapporteur row is left out; it has its own field.
pub fn extract<Q: DocumentQuery>(root: &Q) -> Vec<Party> {
    let mut parties = Vec::new();

    let Some(table) = root.select(&PARTIES_TABLE).into_iter().next() else {
        return parties;
    };

    for row in table.select(&ROWS) {
        let role = normalize_space(&row.query_one(&ROLE_CELL));
        let name = normalize_space(&row.query_one(&NAME_CELL));

        if role.to_uppercase().contains(RAPPORTEUR_ROLE) {
            continue;
        }

        let role = clean_text(&role);
        let name = clean_text(&name);
        if role.is_empty() || name.is_empty() {
            continue;
        }

        parties.push(Party { role, name });
    }

    parties
}
