pub mod codes;
pub mod html;
pub mod number;
pub mod tables;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::settings::Settings;
use crate::corpus::{self, DocumentError, DocumentRef};
use codes::CodeExtractor;
use html::Page;
use number::{NumberParser, NumeralParser};
use tables::{FlattenedTable, Heuristic, TableKind};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Everything recovered from one language page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentResult {
    pub name: String,
    pub numeral_tables: Vec<FlattenedTable>,
    pub codes: Vec<String>,
    /// Located tables that did not pass as numeral tables.
    pub other_tables: usize,
}

/// Per-table view used by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub index: usize,
    pub cells: usize,
    pub numbers: usize,
    pub largest: Option<u128>,
    pub kind: TableKind,
    pub code: Option<String>,
}

/// Locate → flatten → partition → extract codes.
pub struct Pipeline<P = NumeralParser> {
    table_class: String,
    heuristic: Heuristic<P>,
    codes: CodeExtractor,
}

impl Pipeline<NumeralParser> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Pipeline::new(
            &settings.table_class,
            Heuristic::new(NumeralParser, settings.threshold),
            CodeExtractor::new(settings.catalog_regex()?),
        ))
    }
}

impl<P: NumberParser> Pipeline<P> {
    pub fn new(table_class: &str, heuristic: Heuristic<P>, codes: CodeExtractor) -> Self {
        Pipeline {
            table_class: table_class.to_string(),
            heuristic,
            codes,
        }
    }

    pub fn process(&self, name: &str, raw: &str) -> DocumentResult {
        let page = Page::parse(raw);
        let located = page.tables_with_class(&self.table_class);
        let total = located.len();

        let split = tables::partition(located, &self.heuristic);
        let codes = self.codes.extract(&split.other);
        debug_assert_eq!(split.table_count(), total);

        debug!(
            document = name,
            tables = total,
            numeral = split.numeral.len(),
            codes = codes.len(),
            "processed"
        );

        DocumentResult {
            name: name.to_string(),
            other_tables: split.other.len(),
            numeral_tables: split.numeral,
            codes,
        }
    }

    pub fn process_document(&self, doc: &DocumentRef) -> Result<DocumentResult, DocumentError> {
        let raw = corpus::read(doc)?;
        Ok(self.process(&doc.name, &raw))
    }

    pub fn inspect(&self, raw: &str) -> Vec<TableReport> {
        let page = Page::parse(raw);
        let located = page.tables_with_class(&self.table_class);
        located
            .iter()
            .enumerate()
            .map(|(index, table)| {
                let cells = tables::flatten(table);
                let kind = self.heuristic.classify(&cells);
                let code = match kind {
                    TableKind::Numeral => None,
                    TableKind::Other => self.codes.code_for(table),
                };
                TableReport {
                    index,
                    cells: cells.len(),
                    numbers: self.heuristic.count_numbers(&cells),
                    largest: self.heuristic.numbers(&cells).max(),
                    kind,
                    code,
                }
            })
            .collect()
    }
}

/// Process a batch of documents, results in input order. One unreadable
/// document does not stop the others.
#[cfg(feature = "rayon")]
pub fn process_batch<P>(
    pipeline: &Pipeline<P>,
    docs: &[DocumentRef],
) -> Vec<Result<DocumentResult, DocumentError>>
where
    P: NumberParser + Sync,
{
    docs.par_iter()
        .map(|doc| pipeline.process_document(doc))
        .collect()
}

#[cfg(not(feature = "rayon"))]
pub fn process_batch<P>(
    pipeline: &Pipeline<P>,
    docs: &[DocumentRef],
) -> Vec<Result<DocumentResult, DocumentError>>
where
    P: NumberParser,
{
    docs.iter()
        .map(|doc| pipeline.process_document(doc))
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::from_settings(&Settings::default()).unwrap()
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/corpus/{}", name)).unwrap()
    }

    #[test]
    fn numeral_table_and_legacy_code() {
        let doc = r#"<html><body>
            <table class="MsoTableGrid">
              <tr><td>1</td><td>2</td><td>3</td><td>4</td></tr>
              <tr><td>5</td><td>6</td><td>7</td><td>8</td></tr>
              <tr><td>9</td><td>10</td><td>20</td><td>100</td></tr>
              <tr><td>Notes</td><td></td><td>see below</td><td> </td></tr>
            </table>
            <table class="MsoTableGrid">
              <tr><td>Language</td><td>Pomo</td></tr>
              <tr><td>Ethnologue</td>
                  <td><a href="http://www.ethnologue.com/show_language.asp?code=pot">pot</a></td></tr>
            </table>
            </body></html>"#;

        let result = pipeline().process("Pomo", doc);
        assert_eq!(result.name, "Pomo");
        assert_eq!(result.numeral_tables.len(), 1);
        assert_eq!(result.numeral_tables[0].len(), 14);
        assert_eq!(result.numeral_tables[0][13], "see below");
        assert_eq!(result.codes, vec!["pot"]);
        assert_eq!(result.other_tables, 1);
    }

    #[test]
    fn no_target_tables() {
        let result = pipeline().process("Blank", "<html><body><p>1 2 3</p></body></html>");
        assert!(result.numeral_tables.is_empty());
        assert!(result.codes.is_empty());
        assert_eq!(result.other_tables, 0);
    }

    #[test]
    fn ainu_fixture() {
        let result = pipeline().process("Ainu", &fixture("Ainu.htm"));
        assert_eq!(result.numeral_tables.len(), 1);
        assert_eq!(result.codes, vec!["ain"]);
        assert_eq!(result.other_tables, 2);
        let numbers = &result.numeral_tables[0];
        assert_eq!(numbers[0], "1.");
        assert!(numbers.iter().all(|cell| !cell.trim().is_empty()));
        assert!(numbers.contains(&"sine".to_string()));
    }

    #[test]
    fn bathari_fixture_current_links() {
        let result = pipeline().process("Bathari", &fixture("Bathari.html"));
        assert_eq!(result.numeral_tables.len(), 2);
        assert_eq!(result.codes, vec!["bhm", "bth"]);
    }

    #[test]
    fn threshold_follows_settings() {
        let strict = Settings { threshold: 100, ..Settings::default() };
        let result = Pipeline::from_settings(&strict)
            .unwrap()
            .process("Ainu", &fixture("Ainu.htm"));
        assert!(result.numeral_tables.is_empty());
        assert_eq!(result.other_tables, 3);
    }

    #[test]
    fn inspect_reports_every_table() {
        let reports = pipeline().inspect(&fixture("Ainu.htm"));
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].kind, TableKind::Other);
        assert_eq!(reports[0].code.as_deref(), Some("ain"));
        assert_eq!(reports[1].kind, TableKind::Numeral);
        assert_eq!(reports[1].numbers, 12);
        assert_eq!(reports[1].largest, Some(100));
        assert_eq!(reports[2].largest, None);
        assert_eq!(reports[2].kind, TableKind::Other);
        assert_eq!(reports[2].code, None);
    }

    #[test]
    fn batch_isolates_unreadable_documents() {
        let settings = Settings::default();
        let docs = corpus::discover(Path::new("tests/fixtures/corpus"), &settings.skip).unwrap();
        let results = process_batch(&pipeline(), &docs);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().name, "Ainu");
        assert_eq!(results[1].as_ref().unwrap().name, "Bathari");
        assert!(matches!(results[2], Err(DocumentError::Decode { .. })));
        let empty = results[3].as_ref().unwrap();
        assert!(empty.numeral_tables.is_empty() && empty.codes.is_empty());
    }

    #[test]
    fn serializes_result() {
        let result = DocumentResult {
            name: "Ainu".to_string(),
            numeral_tables: vec![vec!["1".to_string(), "sine".to_string()]],
            codes: vec!["ain".to_string()],
            other_tables: 2,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "Ainu");
        assert_eq!(json["numeral_tables"][0][1], "sine");
        assert_eq!(json["codes"][0], "ain");
        assert_eq!(json["other_tables"], 2);
    }
}
