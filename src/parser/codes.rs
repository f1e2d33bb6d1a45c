use regex::Regex;
use tracing::warn;

use super::html::HtmlTable;

/// Marker used by the catalog's older `show_language.asp?code=xyz` links.
pub const LEGACY_MARKER: &str = "code=";
/// Marker used by the catalog's current `/language/xyz` links.
pub const CURRENT_MARKER: &str = "language/";

/// Pull the catalog code out of a link target. The legacy marker wins when
/// both are present; an empty remainder is no code.
pub fn code_from_href(href: &str) -> Option<&str> {
    let (_, code) = href
        .split_once(LEGACY_MARKER)
        .or_else(|| href.split_once(CURRENT_MARKER))?;
    (!code.is_empty()).then_some(code)
}

/// Recovers language-catalog codes from links in non-numeral tables.
pub struct CodeExtractor {
    domain: Regex,
}

impl CodeExtractor {
    pub fn new(domain: Regex) -> Self {
        CodeExtractor { domain }
    }

    /// At most one code per table, from the first link into the catalog.
    pub fn extract<T: HtmlTable>(&self, tables: &[T]) -> Vec<String> {
        tables
            .iter()
            .filter_map(|table| self.code_for(table))
            .collect()
    }

    pub fn code_for<T: HtmlTable + ?Sized>(&self, table: &T) -> Option<String> {
        let href = table.first_link(&self.domain)?;
        let code = code_from_href(&href).map(str::to_string);
        if code.is_none() {
            warn!(%href, "catalog link without a language code");
        }
        code
    }
}
