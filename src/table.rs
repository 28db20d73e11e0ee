//! Parsing of the fixed-width tables printed by `kaggle datasets list`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Columns kept when a search is not verbose.
pub const CANONICAL_COLUMNS: [&str; 4] = ["ref", "title", "size", "downloadCount"];

/// Rows of a search listing, keyed by the headers the tool printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One dataset listing with the canonical columns pulled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "ref")]
    pub reference: String,
    pub title: String,
    pub size: String,
    pub download_count: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SearchTable {
    /// Parses raw tool output.
    ///
    /// Columns are separated by runs of two or more spaces. The header is the
    /// line right above the dashed divider; anything printed before it (for
    /// example an "outdated API version" warning) is ignored.
    pub fn parse(output: &str) -> Result<Self> {
        let lines: Vec<Vec<String>> = output
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(split_fields)
            .collect();

        if lines.len() < 2 {
            return Err(Error::NoData);
        }

        let header_idx = lines
            .iter()
            .position(|fields| is_divider(fields))
            .filter(|&idx| idx > 0)
            .map(|idx| idx - 1)
            .unwrap_or(0);

        let columns = lines[header_idx].clone();
        let width = columns.len();

        let rows: Vec<Vec<String>> = lines
            .into_iter()
            .skip(header_idx + 2)
            .map(|mut row| {
                if row.len() > width {
                    log::warn!(
                        "search row has {} fields but {} columns; dropping extras: {:?}",
                        row.len(),
                        width,
                        &row[width..]
                    );
                }
                row.resize(width, String::new());
                row
            })
            .collect();

        if rows.is_empty() {
            return Err(Error::NoData);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Keeps only `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| Error::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    pub fn canonical(&self) -> Result<Self> {
        self.select(&CANONICAL_COLUMNS)
    }

    /// Typed view of every row. Columns missing from the table come back empty.
    pub fn results(&self) -> Vec<SearchResult> {
        (0..self.rows.len())
            .map(|i| {
                let take = |name: &str| self.get(i, name).unwrap_or_default().to_string();
                let extra = self
                    .columns
                    .iter()
                    .zip(&self.rows[i])
                    .filter(|(c, _)| !CANONICAL_COLUMNS.contains(&c.as_str()))
                    .map(|(c, v)| (c.clone(), v.clone()))
                    .collect();
                SearchResult {
                    reference: take("ref"),
                    title: take("title"),
                    size: take("size"),
                    download_count: take("downloadCount"),
                    extra,
                }
            })
            .collect()
    }

    /// Rows as an array of JSON objects keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let obj = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), serde_json::Value::String(v.clone())))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}

impl fmt::Display for SearchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (w, v) in widths.iter_mut().zip(row) {
                *w = (*w).max(v.chars().count());
            }
        }

        let write_row = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let line = cells
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{:<w$}", c, w = w))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(f, "{}", line.trim_end())
        };

        write_row(f, &self.columns)?;
        let divider: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        write_row(f, &divider)?;
        for row in &self.rows {
            write_row(f, row)?;
        }
        Ok(())
    }
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut spaces = 0usize;

    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            spaces += 1;
            continue;
        }
        if spaces >= 2 || (spaces > 0 && current.is_empty()) {
            push_field(&mut fields, &mut current);
        } else if spaces == 1 {
            current.push(' ');
        }
        spaces = 0;
        current.push(ch);
    }
    push_field(&mut fields, &mut current);
    fields
}

fn push_field(fields: &mut Vec<String>, current: &mut String) {
    let field = current.trim();
    if !field.is_empty() {
        fields.push(field.to_string());
    }
    current.clear();
}

fn is_divider(fields: &[String]) -> bool {
    !fields.is_empty() && fields.iter().all(|f| f.chars().all(|c| c == '-'))
}
