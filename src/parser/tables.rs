use tracing::debug;

use super::html::HtmlTable;
use super::number::{NumberParser, Token};

/// Numeric cells a table needs before it counts as a numeral table.
pub const DEFAULT_THRESHOLD: usize = 10;

/// Non-empty trimmed cell texts, row-major.
pub type FlattenedTable = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Numeral,
    Other,
}

/// Drop row/column structure and empty cells.
pub fn flatten<T: HtmlTable + ?Sized>(table: &T) -> FlattenedTable {
    table
        .cell_texts()
        .into_iter()
        .flatten()
        .filter_map(|cell| {
            let cell = cell.trim();
            (!cell.is_empty()).then(|| cell.to_string())
        })
        .collect()
}

/// Counts numeric cells. There is no structural marker for numeral tables
/// across the corpus, so tables full of dates or page numbers will pass too.
pub struct Heuristic<P> {
    parser: P,
    threshold: usize,
}

impl<P: NumberParser> Heuristic<P> {
    pub fn new(parser: P, threshold: usize) -> Self {
        Heuristic { parser, threshold }
    }

    pub fn count_numbers(&self, cells: &[String]) -> usize {
        cells
            .iter()
            .filter(|cell| self.parser.try_parse(cell).is_number())
            .count()
    }

    /// Values of the numeric cells, in cell order.
    pub fn numbers<'a>(&'a self, cells: &'a [String]) -> impl Iterator<Item = u128> + 'a {
        cells.iter().filter_map(|cell| match self.parser.try_parse(cell) {
            Token::Number(n) => Some(n),
            Token::NotANumber => None,
        })
    }

    pub fn classify(&self, cells: &[String]) -> TableKind {
        if self.count_numbers(cells) >= self.threshold {
            TableKind::Numeral
        } else {
            TableKind::Other
        }
    }
}

/// Tables split by kind, each side in source order. Other tables stay raw
/// because the code extractor needs their links.
pub struct Partition<T> {
    pub numeral: Vec<FlattenedTable>,
    pub other: Vec<T>,
}

impl<T> Partition<T> {
    pub fn table_count(&self) -> usize {
        self.numeral.len() + self.other.len()
    }
}

pub fn partition<T, P>(tables: Vec<T>, heuristic: &Heuristic<P>) -> Partition<T>
where
    T: HtmlTable,
    P: NumberParser,
{
    let mut numeral = Vec::new();
    let mut other = Vec::new();

    for (idx, table) in tables.into_iter().enumerate() {
        let cells = flatten(&table);
        match heuristic.classify(&cells) {
            TableKind::Numeral => {
                debug!(table = idx, cells = cells.len(), "numeral table");
                numeral.push(cells);
            }
            TableKind::Other => {
                debug!(table = idx, cells = cells.len(), "other table");
                other.push(table);
            }
        }
    }

    Partition { numeral, other }
}
