use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// What the pipeline needs from a located table. Implementations never
/// mutate the underlying tree.
pub trait HtmlTable {
    /// Untrimmed text of every data cell, grouped by row, in document order.
    fn cell_texts(&self) -> Vec<Vec<String>>;

    /// Target of the first hyperlink whose href matches `pattern`.
    fn first_link(&self, pattern: &Regex) -> Option<String>;
}

/// A parsed HTML document.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(raw: &str) -> Self {
        Page {
            html: Html::parse_document(raw),
        }
    }

    /// All `<table>` elements carrying `class` among their classes, in
    /// document order.
    pub fn tables_with_class(&self, class: &str) -> Vec<ElementRef<'_>> {
        self.html
            .select(&TABLE)
            .filter(|table| table.value().classes().any(|c| c == class))
            .collect()
    }
}

impl HtmlTable for ElementRef<'_> {
    fn cell_texts(&self) -> Vec<Vec<String>> {
        self.select(&ROW)
            .map(|row| {
                row.select(&CELL)
                    .map(|cell| cell.text().collect::<String>())
                    .collect()
            })
            .collect()
    }

    fn first_link(&self, pattern: &Regex) -> Option<String> {
        self.select(&LINK)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| pattern.is_match(href))
            .map(str::to_string)
    }
}

/// In-memory table for tests that don't need a parsed document.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct StaticTable {
    pub rows: Vec<Vec<String>>,
    pub links: Vec<String>,
}

#[cfg(test)]
impl StaticTable {
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        StaticTable {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            links: Vec::new(),
        }
    }

    pub fn with_links(links: &[&str]) -> Self {
        StaticTable {
            rows: Vec::new(),
            links: links.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[cfg(test)]
impl HtmlTable for StaticTable {
    fn cell_texts(&self) -> Vec<Vec<String>> {
        self.rows.clone()
    }

    fn first_link(&self, pattern: &Regex) -> Option<String> {
        self.links.iter().find(|l| pattern.is_match(l)).cloned()
    }
}
