pub mod extract;
pub mod html;
pub mod query;
pub mod text;

use tracing::{debug, warn};

use crate::record::CaseRecord;
use html::HtmlDocument;
use query::DocumentQuery;

/// Literal that only appears on pages that actually carry case data.
pub const LIVENESS_MARKER: &str = "PROCESSO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Pending,
    Live,
    Dead,
    Done,
}

/// Drives one fetched document from `Pending` to either `Dead` or `Done`.
/// A document yields at most one record; there is no retry.
pub struct RecordAssembler<'a> {
    text: &'a str,
    state: DocumentState,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(text: &'a str) -> Self {
        RecordAssembler {
            text,
            state: DocumentState::Pending,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn validate(&mut self) -> DocumentState {
        if self.state == DocumentState::Pending {
            self.state = if self.text.contains(LIVENESS_MARKER) {
                DocumentState::Live
            } else {
                DocumentState::Dead
            };
        }
        self.state
    }

    pub fn assemble<Q: DocumentQuery>(&mut self, root: &Q) -> Option<CaseRecord> {
        if self.validate() != DocumentState::Live {
            return None;
        }
        let record = extract::extract_all(root);
        self.state = DocumentState::Done;
        Some(record)
    }
}

/// Liveness check, parse, extract. `source` only labels diagnostics.
pub fn process_document(source: &str, html: &str) -> Option<CaseRecord> {
    let mut assembler = RecordAssembler::new(html);
    if assembler.validate() == DocumentState::Dead {
        warn!(source, "TRF5 returned no case data");
        return None;
    }

    let document = HtmlDocument::parse(html);
    let record = assembler.assemble(&document.root())?;
    debug_assert_eq!(assembler.state(), DocumentState::Done);
    debug!(
        source,
        numero = %record.process_number,
        envolvidos = record.parties.len(),
        movimentacoes = record.movements.len(),
        "Extracted case record"
    );
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_document_yields_nothing() {
        let html = std::fs::read_to_string("tests/fixtures/sem_dados.html").unwrap();
        let mut assembler = RecordAssembler::new(&html);
        assert_eq!(assembler.validate(), DocumentState::Dead);

        let doc = HtmlDocument::parse(&html);
        assert!(assembler.assemble(&doc.root()).is_none());
        assert_eq!(assembler.state(), DocumentState::Dead);
        assert!(process_document("sem_dados", &html).is_none());
    }

    #[test]
    fn marker_is_case_sensitive() {
        let mut assembler = RecordAssembler::new("<p>Processo não encontrado</p>");
        assert_eq!(assembler.validate(), DocumentState::Dead);
    }

    #[test]
    fn live_document_assembles_once() {
        let html = std::fs::read_to_string("tests/fixtures/processo.html").unwrap();
        let doc = HtmlDocument::parse(&html);
        let mut assembler = RecordAssembler::new(&html);
        assert_eq!(assembler.state(), DocumentState::Pending);
        assert_eq!(assembler.validate(), DocumentState::Live);

        let record = assembler.assemble(&doc.root()).unwrap();
        assert_eq!(record.process_number, "0015648-78.1999.4.05.0000");
        assert_eq!(assembler.state(), DocumentState::Done);
        assert!(assembler.assemble(&doc.root()).is_none());
    }

    #[test]
    fn partial_document_still_produces_record() {
        let html = std::fs::read_to_string("tests/fixtures/parcial.html").unwrap();
        let record = process_document("parcial", &html).unwrap();
        assert_eq!(record.rapporteur, "");
        assert_eq!(record.filing_date, "03/02/2020");
        assert_eq!(record.parties.len(), 2);
    }
}
