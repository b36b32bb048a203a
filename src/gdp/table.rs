//! Locating the GDP table in an HTML document and scanning its rows
//!
//! The table is chosen by header shape first: the first `tbody` whose header
//! cells mention every configured keyword. When nothing matches, the
//! `tbody` at a fixed document-order index is used instead.
//!
//! A row becomes a [`RawRecord`] only if:
//! 1. it has at least one `td`
//! 2. its first `td` holds a link, whose text is the country name
//! 3. its third `td` is not the unreported placeholder
//!
//! A blank or missing third `td` still yields a record, with empty GDP text
//! that normalization rejects.

use super::records::{GdpCell, RawRecord};
use crate::config::EtlConfig;
use crate::error::EtlError;

use eyre::{Result, eyre};
use scraper::{ElementRef, Html, Selector};

/// How to find the source table in a document
#[derive(Debug, Clone, PartialEq)]
pub struct TableLocator {
    header_keywords: Vec<String>,
    index: usize,
}

impl TableLocator {
    pub fn new(header_keywords: Vec<String>, index: usize) -> Self {
        Self {
            header_keywords,
            index,
        }
    }

    /// Positional lookup only
    pub fn by_index(index: usize) -> Self {
        Self::new(Vec::new(), index)
    }

    pub fn from_config(config: &EtlConfig) -> Self {
        Self::new(config.header_keywords.clone(), config.table_index)
    }

    fn headers_match(&self, headers: &[String]) -> bool {
        !self.header_keywords.is_empty()
            && self.header_keywords.iter().all(|keyword| {
                let keyword = keyword.to_lowercase();
                headers.iter().any(|h| h.to_lowercase().contains(&keyword))
            })
    }

    fn locate<'a>(&self, document: &'a Html, selectors: &Selectors) -> Result<ElementRef<'a>> {
        let bodies: Vec<ElementRef<'a>> = document.select(&selectors.tbody).collect();
        log::debug!("Found {} table bodies", bodies.len());

        if let Some((position, body)) = bodies
            .iter()
            .enumerate()
            .find(|(_, body)| self.headers_match(&header_texts(**body, selectors)))
        {
            log::debug!("Table body #{} matches headers {:?}", position, self.header_keywords);
            return Ok(*body);
        }

        match bodies.get(self.index) {
            Some(body) => {
                log::debug!("No header match, using table body #{}", self.index);
                Ok(*body)
            }
            None => Err(EtlError::Structure(format!(
                "no table matches headers {:?} and only {} table bodies exist (wanted index {})",
                self.header_keywords,
                bodies.len(),
                self.index
            ))
            .into()),
        }
    }
}

impl Default for TableLocator {
    fn default() -> Self {
        Self::from_config(&EtlConfig::default())
    }
}

struct Selectors {
    tbody: Selector,
    thead: Selector,
    tr: Selector,
    th: Selector,
    td: Selector,
    a: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            tbody: selector("tbody")?,
            thead: selector("thead")?,
            tr: selector("tr")?,
            th: selector("th")?,
            td: selector("td")?,
            a: selector("a")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| eyre!("Invalid selector {:?}: {}", css, e))
}

/// Header cell texts of a table body, including a sibling `thead`
fn header_texts(body: ElementRef<'_>, selectors: &Selectors) -> Vec<String> {
    let mut headers: Vec<String> = body.select(&selectors.th).map(element_text).collect();

    if let Some(table) = body.parent().and_then(ElementRef::wrap) {
        for head in table.select(&selectors.thead) {
            headers.extend(head.select(&selectors.th).map(element_text));
        }
    }

    headers
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First non-blank text node, mirroring how the value sits at the start of a cell
fn leading_text(element: ElementRef<'_>) -> Option<&str> {
    element.text().map(str::trim).find(|t| !t.is_empty())
}

fn scan_row(row: ElementRef<'_>, selectors: &Selectors) -> Option<RawRecord> {
    let cells: Vec<ElementRef<'_>> = row.select(&selectors.td).collect();
    let first = cells.first()?;

    let country = first
        .select(&selectors.a)
        .map(element_text)
        .find(|name| !name.is_empty())?;

    let gdp = GdpCell::parse(cells.get(2).and_then(|cell| leading_text(*cell))).reported();
    match gdp {
        Some(gdp_raw) => Some(RawRecord { country, gdp_raw }),
        None => {
            log::debug!("Skipping {}: GDP not reported", country);
            None
        }
    }
}

/// Parse an HTML document and return the admitted rows of its GDP table
///
/// # Errors
/// Returns [`EtlError::Structure`] if no table can be located.
pub fn parse_document(html: &str, locator: &TableLocator) -> Result<Vec<RawRecord>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);
    let table = locator.locate(&document, &selectors)?;

    let records: Vec<RawRecord> = table
        .select(&selectors.tr)
        .filter_map(|row| scan_row(row, &selectors))
        .collect();

    Ok(records)
}
