use crate::errors::{CustomResult, Error};

/// One `<table>` block of the source document, reduced to a grid of text cells.
/// Tag soup, attributes and entities are already stripped/decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// The source pages mark each table kind with a fixed cell in the header
    /// area (banner row or column row), so matching is restricted to the
    /// first two rows. Data cells never participate.
    pub fn header_contains(&self, needle: &str) -> bool {
        self.rows
            .iter()
            .take(2)
            .any(|row| row.iter().any(|cell| cell.contains(needle)))
    }

    /// Look up the value cell of a label/value row (event info table layout).
    pub fn value_for_label(&self, label: &str, section: &'static str) -> CustomResult<&str> {
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(label))
            .and_then(|row| row.get(1))
            .map(String::as_str)
            .ok_or_else(|| Error::MissingLabel {
                label: label.to_string(),
                section,
            })
    }
}

/// A table with its header row resolved to named columns. The header row is
/// the row containing `needle`; rows above it (team/driver banners) are kept
/// separately, rows below it are data.
#[derive(Debug, Clone)]
pub struct KeyedTable {
    pub banner: Vec<Vec<String>>,
    columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl KeyedTable {
    pub fn from_table(table: &Table, needle: &str, section: &'static str) -> CustomResult<KeyedTable> {
        let header_idx = table
            .rows
            .iter()
            .position(|row| row.iter().any(|cell| cell.contains(needle)))
            .ok_or_else(|| Error::MissingColumn {
                column: needle.to_string(),
                section,
            })?;

        Ok(KeyedTable {
            banner: table.rows[..header_idx].to_vec(),
            columns: table.rows[header_idx].clone(),
            rows: table.rows[header_idx + 1..].to_vec(),
        })
    }

    /// Resolve a column by exact header text. Resolved once per table, so a
    /// layout shift fails here instead of misreading unrelated columns.
    pub fn column(&self, name: &str, section: &'static str) -> CustomResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                section,
            })
    }

    /// Resolve a column whose header contains `needle` (case-insensitive).
    pub fn column_containing(&self, needle: &str, section: &'static str) -> CustomResult<usize> {
        let needle = needle.to_ascii_lowercase();
        self.columns
            .iter()
            .position(|c| c.to_ascii_lowercase().contains(&needle))
            .ok_or_else(|| Error::MissingColumn {
                column: needle.clone(),
                section,
            })
    }
}

/// Cell accessor tolerant of ragged rows (trailing cells missing in source).
pub fn value(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// All tables whose header area contains `needle`.
pub fn find_tables(html: &str, needle: &str) -> Vec<Table> {
    extract_tables(html)
        .into_iter()
        .filter(|t| t.header_contains(needle))
        .collect()
}

/// Exactly one table must match; anything else means the document structure
/// changed and ingestion must not continue.
pub fn find_exactly_one(html: &str, needle: &str, section: &'static str) -> CustomResult<Table> {
    let mut tables = find_tables(html, needle);
    if tables.len() != 1 {
        return Err(Error::UnexpectedStructure {
            section,
            expected: 1,
            found: tables.len(),
        });
    }
    Ok(tables.remove(0))
}

/// Scan the raw document for `<table>` blocks and reduce each to text cells.
pub fn extract_tables(html: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut from = 0;

    while let Some((start, end)) = next_tag_block(html, "table", from) {
        let block = &html[start..end];
        let mut rows = Vec::new();
        let mut row_from = 0;

        while let Some((r_start, r_end)) = next_tag_block(block, "tr", row_from) {
            let row_block = &block[r_start..r_end];
            let mut cells = Vec::new();
            let mut cell_from = 0;

            while let Some((c_start, c_end, tag)) = next_cell(row_block, cell_from) {
                let inner = inner_after_open_tag(&row_block[c_start..c_end], tag);
                cells.push(normalize_ws(&decode_entities(&strip_tags(inner))));
                cell_from = c_end;
            }

            rows.push(cells);
            row_from = r_end;
        }

        tables.push(Table { rows });
        from = end;
    }

    tables
}

/// Find the next `<tag ...>...</tag>` block at or after `from`.
/// Returns (start of open tag, end just past the close tag).
fn next_tag_block(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let lower = s.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut search = from;
    loop {
        let start = lower.get(search..)?.find(&open)? + search;
        // reject prefix matches like <thead> when looking for <th>
        match s.as_bytes().get(start + open.len()) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/') => {
                let end = lower[start..].find(&close)? + start + close.len();
                return Some((start, end));
            }
            _ => search = start + open.len(),
        }
    }
}

/// The next `<td>` or `<th>` block, whichever occurs first.
fn next_cell(s: &str, from: usize) -> Option<(usize, usize, &'static str)> {
    let td = next_tag_block(s, "td", from);
    let th = next_tag_block(s, "th", from);

    match (td, th) {
        (Some(td), Some(th)) => {
            if td.0 < th.0 {
                Some((td.0, td.1, "td"))
            } else {
                Some((th.0, th.1, "th"))
            }
        }
        (Some(td), None) => Some((td.0, td.1, "td")),
        (None, Some(th)) => Some((th.0, th.1, "th")),
        (None, None) => None,
    }
}

/// Content between the end of the open tag and the close tag.
fn inner_after_open_tag<'a>(block: &'a str, tag: &str) -> &'a str {
    let close_len = tag.len() + 3; // </tag>
    match block.find('>') {
        Some(open_end) if open_end + 1 + close_len <= block.len() => {
            &block[open_end + 1..block.len() - close_len]
        }
        _ => "",
    }
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// The source emits only a handful of entities.
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <html><body>
        <table class="info">
            <tr><th>Server Name</th><td>VEC &amp; friends</td></tr>
            <tr><td>Date</td><td>27.03.21</td></tr>
            <tr><td>Track</td><td>Spa</td></tr>
        </table>
        <table>
            <tr><th colspan="3">Car 11</th></tr>
            <tr><th>Driver</th><th>Startlap</th><th>Ending lap</th></tr>
            <tr><td> max verstappen </td><td>L1</td><td>L40</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn extracts_all_tables_with_cells() {
        let tables = extract_tables(DOC);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[0], vec!["Server Name", "VEC & friends"]);
        assert_eq!(tables[1].rows[2][1], "L1");
    }

    #[test]
    fn find_tables_matches_header_area_only() {
        assert_eq!(find_tables(DOC, "Server Name").len(), 1);
        assert_eq!(find_tables(DOC, "Startlap").len(), 1);
        // "Track" only appears in a data row of the info table
        assert_eq!(find_tables(DOC, "Track").len(), 0);
    }

    #[test]
    fn find_exactly_one_rejects_zero_and_many() {
        assert!(matches!(
            find_exactly_one(DOC, "No Such Table", "event info"),
            Err(Error::UnexpectedStructure { found: 0, .. })
        ));
        assert!(matches!(
            find_exactly_one(DOC, "Car 11", "event info"),
            Ok(_)
        ));
    }

    #[test]
    fn value_for_label_reads_info_rows() {
        let table = find_exactly_one(DOC, "Server Name", "event info").unwrap();
        assert_eq!(table.value_for_label("Date", "event info").unwrap(), "27.03.21");
        assert_eq!(table.value_for_label("Track", "event info").unwrap(), "Spa");
        assert!(matches!(
            table.value_for_label("Weather", "event info"),
            Err(Error::MissingLabel { .. })
        ));
    }

    #[test]
    fn keyed_table_skips_banner_and_resolves_columns() {
        let table = find_exactly_one(DOC, "Startlap", "stint info").unwrap();
        let keyed = KeyedTable::from_table(&table, "Startlap", "stint info").unwrap();

        assert_eq!(keyed.banner, vec![vec!["Car 11".to_string()]]);
        assert_eq!(keyed.rows.len(), 1);

        let driver = keyed.column("Driver", "stint info").unwrap();
        assert_eq!(value(&keyed.rows[0], driver), "max verstappen");
        assert!(matches!(
            keyed.column("Pitstops", "stint info"),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn column_containing_is_case_insensitive() {
        let table = find_exactly_one(DOC, "Startlap", "stint info").unwrap();
        let keyed = KeyedTable::from_table(&table, "Startlap", "stint info").unwrap();
        assert_eq!(keyed.column_containing("ending", "stint info").unwrap(), 2);
    }

    #[test]
    fn th_lookup_does_not_match_thead() {
        let doc = "<table><thead><tr><th>Lap</th></tr></thead></table>";
        let tables = extract_tables(doc);
        assert_eq!(tables[0].rows, vec![vec!["Lap".to_string()]]);
    }
}
