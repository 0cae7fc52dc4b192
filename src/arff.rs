//! ARFF (Attribute-Relation File Format) parsing.
//!
//! Reads the `@relation` / `@attribute` header and the comma-separated
//! `@data` section into an [`ArrowDataset`]. Columns whose values all parse
//! as numbers become `Float64`; nominal, string and date attributes, and any
//! column holding non-numeric text, become `Utf8`. `?` and empty fields are
//! missing values (Arrow nulls).
//!
//! # Example
//!
//! ```
//! use arffsplit::arff::{ArffDocument, AttributeKind};
//!
//! let text = "\
//! @relation kdd
//! @attribute duration numeric
//! @attribute protocol_type {tcp,udp,icmp}
//! @data
//! 0,tcp
//! 2,?
//! ";
//! let doc = ArffDocument::parse(text).unwrap();
//! assert_eq!(doc.relation(), Some("kdd"));
//! assert_eq!(doc.attributes()[0].kind, AttributeKind::Numeric);
//! assert_eq!(doc.dataset().null_counts(), vec![0, 1]);
//! ```

use std::{fmt, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray},
    datatypes::{Field, Schema},
};
use tracing::{debug, warn};

use crate::{
    dataset::ArrowDataset,
    error::{Error, Result},
};

/// Marker for a missing value in the data section.
pub const MISSING_MARKER: &str = "?";

/// Declared type of an ARFF attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// `numeric`, `real` or `integer`.
    Numeric,
    /// `{a, b, c}` with the declared categories in order.
    Nominal(Vec<String>),
    /// `string`.
    String,
    /// `date` with an optional format pattern.
    Date(Option<String>),
    /// Anything else (e.g. `relational`), kept verbatim.
    Other(String),
}

impl AttributeKind {
    /// Parses the type part of an `@attribute` declaration.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if let Some(body) = spec.strip_prefix('{') {
            let body = body.trim_end().strip_suffix('}').unwrap_or(body);
            let categories = body
                .split(',')
                .map(|c| unquote(c.trim()).to_string())
                .filter(|c| !c.is_empty())
                .collect();
            return Self::Nominal(categories);
        }

        let lower = spec.to_ascii_lowercase();
        match lower.as_str() {
            "numeric" | "real" | "integer" => Self::Numeric,
            "string" => Self::String,
            _ if lower.starts_with("date") => {
                let format = unquote(spec["date".len()..].trim());
                Self::Date((!format.is_empty()).then(|| format.to_string()))
            }
            _ => Self::Other(spec.to_string()),
        }
    }

    /// Returns true if values of this kind are always kept as text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Nominal(_) | Self::String | Self::Date(_))
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Nominal(categories) => write!(f, "{{{}}}", categories.join(",")),
            Self::String => write!(f, "string"),
            Self::Date(Some(format)) => write!(f, "date \"{}\"", format),
            Self::Date(None) => write!(f, "date"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// A declared `@attribute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name with surrounding quotes removed.
    pub name: String,
    /// Declared type.
    pub kind: AttributeKind,
}

/// A parsed ARFF file: header metadata plus the data as a table.
#[derive(Debug, Clone)]
pub struct ArffDocument {
    relation: Option<String>,
    attributes: Vec<Attribute>,
    names_from_header: bool,
    dataset: ArrowDataset,
}

impl ArffDocument {
    /// Parses ARFF text.
    ///
    /// Data lines are every line after `@data`; when no `@data` marker is
    /// present, any line that does not start with `@` is treated as data.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] for a malformed `@attribute` line or ragged rows
    /// - [`Error::EmptyDataset`] if there are no data rows
    pub fn parse(text: &str) -> Result<Self> {
        let mut relation = None;
        let mut attributes = Vec::new();
        let mut data = String::new();
        let mut data_lines: Vec<usize> = Vec::new();
        let mut in_data = false;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('%') {
                continue;
            }

            if trimmed.starts_with('@') {
                if in_data {
                    continue;
                }
                let (keyword, rest) = split_keyword(trimmed);
                match keyword.to_ascii_lowercase().as_str() {
                    "@relation" => relation = Some(unquote(rest.trim()).to_string()),
                    "@attribute" => attributes.push(parse_attribute(rest, line_no)?),
                    "@data" => in_data = true,
                    other => debug!(line = line_no, keyword = other, "ignoring ARFF directive"),
                }
                continue;
            }

            in_data = true;
            data.push_str(trimmed);
            data.push('\n');
            data_lines.push(line_no);
        }

        let rows = read_rows(&data, &data_lines)?;
        let width = rows.first().map(Vec::len).ok_or(Error::EmptyDataset)?;

        let names_from_header = attributes.len() == width;
        if !names_from_header && !attributes.is_empty() {
            warn!(
                declared = attributes.len(),
                found = width,
                "attribute count does not match data columns, using generated names"
            );
        }

        let mut fields = Vec::with_capacity(width);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(width);
        for col in 0..width {
            let (name, declared) = if names_from_header {
                let attr = &attributes[col];
                (attr.name.clone(), Some(&attr.kind))
            } else {
                (format!("column_{}", col + 1), None)
            };

            let values: Vec<Option<&str>> = rows.iter().map(|row| row[col].as_deref()).collect();
            let array = build_column(&name, declared, &values);
            fields.push(Field::new(name, array.data_type().clone(), true));
            columns.push(array);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        debug!(
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "parsed ARFF data section"
        );

        Ok(Self {
            relation,
            attributes,
            names_from_header,
            dataset: ArrowDataset::from_batch(batch)?,
        })
    }

    /// The `@relation` name, if declared.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// Declared attributes, in header order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// True when the column names come from the `@attribute` declarations
    /// rather than generated `column_N` names.
    pub fn names_from_header(&self) -> bool {
        self.names_from_header
    }

    /// Declared kind for a column, when names come from the header.
    pub fn declared_kind(&self, column: &str) -> Option<&AttributeKind> {
        if !self.names_from_header {
            return None;
        }
        self.attributes
            .iter()
            .find(|a| a.name == column)
            .map(|a| &a.kind)
    }

    /// The parsed table.
    pub fn dataset(&self) -> &ArrowDataset {
        &self.dataset
    }

    /// Consumes the document, returning the table.
    pub fn into_dataset(self) -> ArrowDataset {
        self.dataset
    }
}

/// Splits `@keyword rest` at the first whitespace.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    }
}

fn parse_attribute(rest: &str, line_no: usize) -> Result<Attribute> {
    let rest = rest.trim();

    let (name, kind_spec) = match rest.chars().next() {
        Some(q @ ('\'' | '"')) => {
            let body = &rest[1..];
            let end = body.find(q).ok_or_else(|| {
                Error::parse(format!("line {}: unterminated attribute name", line_no))
            })?;
            (&body[..end], &body[end + 1..])
        }
        Some(_) => split_keyword(rest),
        None => ("", ""),
    };

    if name.is_empty() {
        return Err(Error::parse(format!(
            "line {}: @attribute without a name",
            line_no
        )));
    }

    Ok(Attribute {
        name: name.to_string(),
        kind: AttributeKind::parse(kind_spec),
    })
}

/// Tokenises the data section. `line_map[i]` is the source line of the
/// i-th buffered line.
fn read_rows(data: &str, line_map: &[usize]) -> Result<Vec<Vec<Option<String>>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let source_line = |record: &csv::StringRecord| {
        record
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .and_then(|l| line_map.get(l.saturating_sub(1)).copied())
            .unwrap_or(0)
    };

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::parse(format!("data section: {}", e)))?;

        if let Some(expected) = rows.first().map(Vec::len) {
            if record.len() != expected {
                return Err(Error::parse(format!(
                    "line {}: expected {} fields, found {}",
                    source_line(&record),
                    expected,
                    record.len()
                )));
            }
        }

        rows.push(record.iter().map(normalize_cell).collect());
    }

    Ok(rows)
}

fn normalize_cell(raw: &str) -> Option<String> {
    let value = unquote(raw.trim());
    if value.is_empty() || value == MISSING_MARKER {
        None
    } else {
        Some(value.to_string())
    }
}

fn build_column(name: &str, declared: Option<&AttributeKind>, values: &[Option<&str>]) -> ArrayRef {
    let textual = declared.is_some_and(AttributeKind::is_textual);

    if !textual {
        let parsed: Option<Vec<Option<f64>>> = values
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse::<f64>().ok().map(Some),
                None => Some(None),
            })
            .collect();

        if let Some(numbers) = parsed {
            return Arc::new(Float64Array::from(numbers));
        }

        if declared == Some(&AttributeKind::Numeric) {
            warn!(column = name, "numeric attribute has non-numeric values, keeping as text");
        }
    }

    Arc::new(StringArray::from(values.to_vec()))
}

/// Removes one pair of matching single or double quotes.
fn unquote(s: &str) -> &str {
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
