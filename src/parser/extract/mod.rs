pub mod filing_date;
pub mod legacy_number;
pub mod movements;
pub mod parties;
pub mod process_number;
pub mod rapporteur;

use super::query::DocumentQuery;
use crate::record::CaseRecord;

/// Run every field extractor over one document. Extractors are independent;
/// a missing landmark only empties its own field.
pub fn extract_all<Q: DocumentQuery>(root: &Q) -> CaseRecord {
    CaseRecord {
        process_number: process_number::extract(root),
        legacy_number: legacy_number::extract(root),
        filing_date: filing_date::extract(root),
        rapporteur: rapporteur::extract(root),
        parties: parties::extract(root),
        movements: movements::extract(root),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::html::HtmlDocument;
    use crate::record::{Movement, Party};

    fn fixture(name: &str) -> HtmlDocument {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        HtmlDocument::parse(&html)
    }

    #[test]
    fn full_page_record() {
        let doc = fixture("processo");
        let record = extract_all(&doc.root());
        assert_eq!(
            record,
            CaseRecord {
                process_number: "0015648-78.1999.4.05.0000".into(),
                legacy_number: "12.34.5678-9".into(),
                filing_date: "10/05/1999".into(),
                rapporteur: "JOÃO SILVA".into(),
                parties: vec![Party {
                    role: "AUTOR".into(),
                    name: "MARIA SOUZA".into(),
                }],
                movements: vec![Movement {
                    date: "01/01/2000".into(),
                    text: "Distribuído".into(),
                }],
            }
        );
    }

    #[test]
    fn partial_page_without_rapporteur() {
        let doc = fixture("parcial");
        let root = doc.root();
        assert_eq!(rapporteur::extract(&root), "");
        assert_eq!(process_number::extract(&root), "0800123-45.2020.4.05.8300");
        assert_eq!(legacy_number::extract(&root), "20.05.12345-6");
        assert_eq!(filing_date::extract(&root), "03/02/2020");

        let p = parties::extract(&root);
        let pairs: Vec<(&str, &str)> = p.iter().map(|x| (x.role.as_str(), x.name.as_str())).collect();
        assert_eq!(pairs, vec![("APELANTE", "UNIÃO FEDERAL"), ("APELADO", "JOSÉ DA SILVA")]);

        let m = movements::extract(&root);
        assert_eq!(m.len(), 2, "got: {:?}", m);
        assert_eq!(m[0].date, "05/02/2020 14:31");
        assert_eq!(m[0].text, "Conclusos ao Relator para despacho");
        assert_eq!(m[1].date, "10/03/2020");
        assert_eq!(m[1].text, "Juntada de Petição");
    }

    #[test]
    fn empty_page_yields_defaults() {
        let doc = HtmlDocument::parse("<html><body><p>nada</p></body></html>");
        assert_eq!(extract_all(&doc.root()), CaseRecord::default());
    }

    #[test]
    fn garbage_input_yields_defaults() {
        let doc = HtmlDocument::parse("<<<>>> </td></tr> PROCESSO \u{0}");
        let record = extract_all(&doc.root());
        assert!(record.parties.is_empty());
        assert!(record.movements.is_empty());
        assert_eq!(record.process_number, "");
    }

    #[test]
    fn rapporteur_rows_never_become_parties() {
        let html = r#"<html><body>
            <table><tr><td>x</td></tr></table>
            <table><tr><td>y</td></tr></table>
            <table>
              <tr><td>Relator</td><td><b>A</b></td></tr>
              <tr><td>RELATORA CONVOCADA</td><td><b>B</b></td></tr>
              <tr><td>relator p/ acórdão</td><td><b>C</b></td></tr>
              <tr><td>RÉU</td><td><b>D</b></td></tr>
            </table>
        </body></html>"#;
        let doc = HtmlDocument::parse(html);
        let p = parties::extract(&doc.root());
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].role, "RÉU");
        assert!(p.iter().all(|x| !x.role.to_uppercase().contains("RELATOR")));
    }

    #[test]
    fn fewer_than_three_tables_means_no_parties() {
        let html = "<html><body><table><tr><td>AUTOR</td><td><b>X</b></td></tr></table></body></html>";
        let doc = HtmlDocument::parse(html);
        assert!(parties::extract(&doc.root()).is_empty());
    }

    #[test]
    fn legacy_number_without_parentheses() {
        let html = "<html><body><p>PROCESSO 1</p><p>Origem 12.34.567890-1 (PE)</p></body></html>";
        let doc = HtmlDocument::parse(html);
        assert_eq!(legacy_number::extract(&doc.root()), "12.34.567890-1");
    }

    #[test]
    fn process_number_from_lowercase_label() {
        let html = "<html><body><p>processo</p><p>Processo: 0001234-56.2001.4.05.8100</p></body></html>";
        let doc = HtmlDocument::parse(html);
        assert_eq!(process_number::extract(&doc.root()), "0001234-56.2001.4.05.8100");
    }

    #[test]
    fn movement_without_description_is_skipped() {
        let html = r#"<html><body>
            <table><tr><td><a>Em 02/02/2002</a></td></tr><tr><td></td><td>   </td></tr></table>
        </body></html>"#;
        let doc = HtmlDocument::parse(html);
        assert!(movements::extract(&doc.root()).is_empty());
    }
}
