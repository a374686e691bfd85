//! # Record Loader
//!
//! Loads delimited raw node/edge files, paired with header files declaring
//! column order, into typed records according to the field schema.
//!
//! - A schema field whose declared column is missing from the header is a
//!   fatal error; the run aborts before any canonicalization starts.
//! - An unparsable literature-info cell is recovered locally: the owning
//!   record id is logged into a [`ParseErrorLog`] and the cell loads as an
//!   empty mapping.

use crate::primitives::{LITERATURE_MAPPING_PREFIX, RAW_LIST_DELIMITER};
use crate::schema::{FieldKind, FieldSpec, Schema};
use crate::types::{CanonError, JsonMap, PropertyValue, RawEdge, RawNode};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// PARSE ERROR LOG
// =============================================================================

/// One recovered parse failure, tagged with the record that owned the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub record_id: String,
    pub detail: String,
}

/// Side log of recovered parse failures.
///
/// Loading never fails on a malformed mapping cell; the failure is recorded
/// here and the pipeline writes the log to a TSV side file at the end of the
/// run so problem records can be repaired upstream.
#[derive(Debug, Default)]
pub struct ParseErrorLog {
    entries: Vec<ParseFailure>,
}

impl ParseErrorLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one recovered failure.
    pub fn record(&mut self, record_id: &str, detail: String) {
        tracing::warn!(record_id, "failed to parse literature info: {detail}");
        self.entries.push(ParseFailure {
            record_id: record_id.to_string(),
            detail,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[ParseFailure] {
        &self.entries
    }

    /// Write the log as a two-column TSV (record id, detail).
    pub fn write_tsv(&self, path: &Path) -> Result<(), CanonError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(|e| CanonError::Io(e.to_string()))?;
        for entry in &self.entries {
            writer
                .write_record([entry.record_id.as_str(), entry.detail.as_str()])
                .map_err(|e| CanonError::Io(e.to_string()))?;
        }
        writer.flush().map_err(|e| CanonError::Io(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// HEADER PARSING
// =============================================================================

/// Read a header file: one tab-delimited row of column names.
///
/// Column names may carry a `:`-suffixed type annotation (`id:ID`,
/// `publications:string[]`); everything from the first `:` on is stripped.
pub fn read_header(path: &Path) -> Result<Vec<String>, CanonError> {
    let mut reader = data_reader(path)?;
    let first = reader.records().next().ok_or_else(|| CanonError::MalformedRow {
        file: display(path),
        line: 1,
        reason: "header file is empty".to_string(),
    })?;
    let record = first.map_err(|e| CanonError::MalformedRow {
        file: display(path),
        line: 1,
        reason: e.to_string(),
    })?;
    Ok(record
        .iter()
        .map(|column| column.split(':').next().unwrap_or("").to_string())
        .collect())
}

/// Resolve each raw schema field to its column index in the header.
/// A declared field with no matching column is fatal.
fn resolve_columns<'a>(
    headers: &[String],
    fields: impl Iterator<Item = &'a FieldSpec>,
    header_path: &Path,
) -> Result<Vec<(&'a FieldSpec, usize)>, CanonError> {
    let mut columns = Vec::new();
    for spec in fields {
        let index = headers
            .iter()
            .position(|h| h == spec.name)
            .ok_or_else(|| CanonError::MissingColumn {
                column: spec.name.to_string(),
                file: display(header_path),
            })?;
        columns.push((spec, index));
    }
    Ok(columns)
}

// =============================================================================
// RECORD LOADING
// =============================================================================

/// Load the raw node file into ordered records.
pub fn load_nodes(
    schema: &Schema,
    header_path: &Path,
    data_path: &Path,
    errors: &mut ParseErrorLog,
) -> Result<Vec<RawNode>, CanonError> {
    let headers = read_header(header_path)?;
    let columns = resolve_columns(&headers, schema.node_raw(), header_path)?;

    let mut nodes = Vec::new();
    let mut reader = data_reader(data_path)?;
    for (index, record) in reader.records().enumerate() {
        let line = index as u64 + 1;
        let record = record.map_err(|e| malformed(data_path, line, e.to_string()))?;
        let mut fields = row_fields(&record, &columns, data_path, line, errors)?;

        let id = take_text(&mut fields, "id")
            .ok_or_else(|| malformed(data_path, line, "node row is missing an id".to_string()))?;
        nodes.push(RawNode {
            id,
            name: take_text(&mut fields, "name"),
            category: take_text(&mut fields, "category"),
            iri: take_text(&mut fields, "iri"),
            description: take_text(&mut fields, "description"),
            publications: take_list(&mut fields, "publications"),
        });
    }
    tracing::info!("loaded {} raw nodes from {}", nodes.len(), data_path.display());
    Ok(nodes)
}

/// Load the raw edge file into ordered records.
pub fn load_edges(
    schema: &Schema,
    header_path: &Path,
    data_path: &Path,
    errors: &mut ParseErrorLog,
) -> Result<Vec<RawEdge>, CanonError> {
    let headers = read_header(header_path)?;
    let columns = resolve_columns(&headers, schema.edge_raw(), header_path)?;

    let mut edges = Vec::new();
    let mut reader = data_reader(data_path)?;
    for (index, record) in reader.records().enumerate() {
        let line = index as u64 + 1;
        let record = record.map_err(|e| malformed(data_path, line, e.to_string()))?;
        let mut fields = row_fields(&record, &columns, data_path, line, errors)?;

        let id = take_text(&mut fields, "id")
            .ok_or_else(|| malformed(data_path, line, "edge row is missing an id".to_string()))?;
        let subject = take_text(&mut fields, "subject")
            .ok_or_else(|| malformed(data_path, line, "edge row is missing a subject".to_string()))?;
        let object = take_text(&mut fields, "object")
            .ok_or_else(|| malformed(data_path, line, "edge row is missing an object".to_string()))?;
        let predicate = take_text(&mut fields, "predicate")
            .ok_or_else(|| malformed(data_path, line, "edge row is missing a predicate".to_string()))?;
        edges.push(RawEdge {
            id,
            subject,
            object,
            predicate,
            provided_by: take_list(&mut fields, "provided_by"),
            publications: take_list(&mut fields, "publications"),
            publications_info: take_mapping(&mut fields, "publications_info"),
        });
    }
    tracing::info!("loaded {} raw edges from {}", edges.len(), data_path.display());
    Ok(edges)
}

/// Parse every schema-declared cell of one row into a tagged value map.
fn row_fields(
    record: &csv::StringRecord,
    columns: &[(&FieldSpec, usize)],
    file: &Path,
    line: u64,
    errors: &mut ParseErrorLog,
) -> Result<BTreeMap<&'static str, PropertyValue>, CanonError> {
    // The owning record id gives parse failures a stable reference point.
    let record_id = columns
        .iter()
        .find(|(spec, _)| spec.name == "id")
        .and_then(|(_, index)| record.get(*index))
        .unwrap_or("")
        .to_string();

    let mut fields = BTreeMap::new();
    for (spec, index) in columns {
        let cell = record.get(*index).ok_or_else(|| {
            malformed(
                file,
                line,
                format!("row ends before column {} for field '{}'", index + 1, spec.name),
            )
        })?;
        fields.insert(spec.name, parse_cell(spec.kind, cell, &record_id, errors));
    }
    Ok(fields)
}

/// Parse one cell according to the semantic type its schema field declares.
fn parse_cell(
    kind: FieldKind,
    cell: &str,
    record_id: &str,
    errors: &mut ParseErrorLog,
) -> PropertyValue {
    match kind {
        FieldKind::Text => PropertyValue::Text(cell.to_string()),
        FieldKind::TextList => PropertyValue::TextList(
            cell.split(RAW_LIST_DELIMITER)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        FieldKind::Mapping => PropertyValue::Mapping(parse_literature_info(cell, record_id, errors)),
    }
}

/// Defensive parse of a literature-info cell.
///
/// Only cells shaped like a literature-keyed object are parsed at all; any
/// other content carries no mapping. A cell that looks parseable but is not
/// loads as an empty mapping and is recorded in the side log.
fn parse_literature_info(cell: &str, record_id: &str, errors: &mut ParseErrorLog) -> JsonMap {
    let trimmed = cell.trim();
    if !trimmed.starts_with(LITERATURE_MAPPING_PREFIX) {
        return JsonMap::new();
    }
    match serde_json::from_str::<JsonMap>(trimmed) {
        Ok(map) => map,
        Err(e) => {
            errors.record(record_id, e.to_string());
            JsonMap::new()
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn data_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, CanonError> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CanonError::Io(e.to_string()))
}

fn take_text(fields: &mut BTreeMap<&'static str, PropertyValue>, name: &str) -> Option<String> {
    fields.remove(name).and_then(PropertyValue::into_text)
}

fn take_list(fields: &mut BTreeMap<&'static str, PropertyValue>, name: &str) -> Vec<String> {
    fields.remove(name).map(PropertyValue::into_list).unwrap_or_default()
}

fn take_mapping(fields: &mut BTreeMap<&'static str, PropertyValue>, name: &str) -> JsonMap {
    fields.remove(name).map(PropertyValue::into_mapping).unwrap_or_default()
}

fn malformed(file: &Path, line: u64, reason: String) -> CanonError {
    CanonError::MalformedRow {
        file: display(file),
        line,
        reason,
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_pair(dir: &TempDir, stem: &str, header: &str, data: &str) -> (PathBuf, PathBuf) {
        let header_path = dir.path().join(format!("{stem}_header.tsv"));
        let data_path = dir.path().join(format!("{stem}.tsv"));
        fs::write(&header_path, header).expect("write header");
        fs::write(&data_path, data).expect("write data");
        (header_path, data_path)
    }

    #[test]
    fn loads_nodes_with_typed_fields() {
        let dir = TempDir::new().expect("tempdir");
        let (header, data) = write_pair(
            &dir,
            "nodes",
            "id\tname\tcategory\tiri\tdescription\tpublications\n",
            "CHEBI:1\tAspirin\tbiolink:Drug\thttp://example.org/1\tA common drug.\tPMID:1; PMID:2;\n",
        );
        let mut errors = ParseErrorLog::new();
        let nodes =
            load_nodes(&Schema::biolink(), &header, &data, &mut errors).expect("load nodes");

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "CHEBI:1");
        assert_eq!(nodes[0].name.as_deref(), Some("Aspirin"));
        assert_eq!(nodes[0].publications, vec!["PMID:1", "PMID:2"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn header_type_annotations_are_stripped() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("header.tsv");
        fs::write(&path, "id:ID\tname\tpublications:string[]\n").expect("write");
        let headers = read_header(&path).expect("read header");
        assert_eq!(headers, vec!["id", "name", "publications"]);
    }

    #[test]
    fn missing_declared_column_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let (header, data) = write_pair(
            &dir,
            "nodes",
            // "category" is declared by the schema but absent here.
            "id\tname\tiri\tdescription\tpublications\n",
            "CHEBI:1\tAspirin\t\t\t\n",
        );
        let mut errors = ParseErrorLog::new();
        let result = load_nodes(&Schema::biolink(), &header, &data, &mut errors);
        assert!(matches!(
            result,
            Err(CanonError::MissingColumn { column, .. }) if column == "category"
        ));
    }

    #[test]
    fn empty_fields_stay_absent() {
        let dir = TempDir::new().expect("tempdir");
        let (header, data) = write_pair(
            &dir,
            "nodes",
            "id\tname\tcategory\tiri\tdescription\tpublications\n",
            "CHEBI:1\t\tbiolink:Drug\t\t\t\n",
        );
        let mut errors = ParseErrorLog::new();
        let nodes =
            load_nodes(&Schema::biolink(), &header, &data, &mut errors).expect("load nodes");
        assert_eq!(nodes[0].name, None);
        assert_eq!(nodes[0].iri, None);
        assert_eq!(nodes[0].description, None);
        assert!(nodes[0].publications.is_empty());
    }

    #[test]
    fn node_without_id_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let (header, data) = write_pair(
            &dir,
            "nodes",
            "id\tname\tcategory\tiri\tdescription\tpublications\n",
            "\tNameless\tbiolink:Drug\t\t\t\n",
        );
        let mut errors = ParseErrorLog::new();
        let result = load_nodes(&Schema::biolink(), &header, &data, &mut errors);
        assert!(matches!(result, Err(CanonError::MalformedRow { line: 1, .. })));
    }

    #[test]
    fn loads_edges_with_literature_info() {
        let dir = TempDir::new().expect("tempdir");
        let (header, data) = write_pair(
            &dir,
            "edges",
            "id\tsubject\tobject\tpredicate\tprovided_by\tpublications\tpublications_info\n",
            "e1\tCHEBI:1\tMONDO:2\tbiolink:treats\tinfores:semmeddb\tPMID:1\t{\"PMID:1\": {\"sentence\": \"x\"}}\n",
        );
        let mut errors = ParseErrorLog::new();
        let edges =
            load_edges(&Schema::biolink(), &header, &data, &mut errors).expect("load edges");

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].predicate, "biolink:treats");
        assert!(edges[0].publications_info.contains_key("PMID:1"));
        assert!(errors.is_empty());
    }

    #[test]
    fn malformed_literature_info_is_recovered_and_logged() {
        let dir = TempDir::new().expect("tempdir");
        let (header, data) = write_pair(
            &dir,
            "edges",
            "id\tsubject\tobject\tpredicate\tprovided_by\tpublications\tpublications_info\n",
            "e1\tCHEBI:1\tMONDO:2\tbiolink:treats\t\t\t{\"PMID:1\": {unclosed\n",
        );
        let mut errors = ParseErrorLog::new();
        let edges =
            load_edges(&Schema::biolink(), &header, &data, &mut errors).expect("load edges");

        assert!(edges[0].publications_info.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.entries()[0].record_id, "e1");
    }

    #[test]
    fn non_literature_text_is_silently_empty() {
        let mut errors = ParseErrorLog::new();
        let map = parse_literature_info("some free text", "e9", &mut errors);
        assert!(map.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn parse_error_log_round_trips_to_tsv() {
        let dir = TempDir::new().expect("tempdir");
        let mut errors = ParseErrorLog::new();
        errors.record("e1", "expected value".to_string());
        let path = dir.path().join("problems.tsv");
        errors.write_tsv(&path).expect("write tsv");

        let content = fs::read_to_string(&path).expect("read back");
        assert!(content.starts_with("e1\t"));
    }
}
