use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const FILING_DATE_FORMAT: &str = "%d/%m/%Y";

/// One legal proceeding as extracted from a TRF5 result page.
///
/// Every field defaults to empty rather than absent. Field names on the wire
/// follow the court's Portuguese vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseRecord {
    #[serde(rename = "numero_processo")]
    pub process_number: String,
    #[serde(rename = "numero_legado")]
    pub legacy_number: String,
    #[serde(rename = "data_autuacao")]
    pub filing_date: String,
    #[serde(rename = "relator")]
    pub rapporteur: String,
    #[serde(rename = "envolvidos")]
    pub parties: Vec<Party>,
    #[serde(rename = "movimentacoes")]
    pub movements: Vec<Movement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "papel")]
    pub role: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// A procedural event. `date` is kept as the page's free-text label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "texto")]
    pub text: String,
}

impl CaseRecord {
    /// The filing date as a calendar date, if it is a valid `dd/mm/yyyy`.
    pub fn filing_date_iso(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.filing_date, FILING_DATE_FORMAT).ok()
    }
}
