//! Reconciles an [`IndexSnapshot`] into the two index tables.
//!
//! Three independently shaped structures meet here: the document list, the
//! per-document tf rows and the global idf/tfidf maps. Rows are the key set
//! of `tfidf`, in its key order; terms only present in `tf` or `idf` never
//! show up.

use std::fmt;

use crate::error::ContractViolation;
use crate::model::IndexSnapshot;

/// A titled text table; every row has `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: Vec<String>) -> Self {
        Self { title: title.into(), headers, rows: Vec::new() }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    for (i, (cell, w)) in cells.iter().zip(widths.iter().copied()).enumerate() {
        if i == 0 {
            // terms left-aligned, numbers right-aligned
            write!(f, "{cell:<w$}")?;
        } else {
            write!(f, " | {cell:>w$}")?;
        }
    }
    writeln!(f)
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        writeln!(f, "{}", self.title)?;
        write_row(f, &self.headers, &widths)?;
        let rule: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
        writeln!(f, "{}", "-".repeat(rule))?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTables {
    /// Term frequencies per document plus the idf column.
    pub tf_idf: Table,
    /// TF-IDF score per document.
    pub tfidf: Table,
}

impl fmt::Display for IndexTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tf_idf)?;
        writeln!(f)?;
        write!(f, "{}", self.tfidf)
    }
}

pub fn format_score(value: f64) -> String {
    format!("{value:.4}")
}

fn doc_headers(count: usize) -> impl Iterator<Item = String> {
    (0..count).map(|doc| format!("Doc {doc}"))
}

/// Builds both tables. Pure in the snapshot.
///
/// A term missing from a document's tf row counts as zero. A missing tf row,
/// idf value or tfidf score is a [`ContractViolation`].
pub fn build_tables(snapshot: &IndexSnapshot) -> Result<IndexTables, ContractViolation> {
    let docs = snapshot.document_count();

    let mut tf_headers = vec!["Term".to_string()];
    tf_headers.extend(doc_headers(docs));
    tf_headers.push("IDF".to_string());
    let mut tf_idf = Table::new("Term Frequency (TF) and IDF", tf_headers);

    let mut tfidf_headers = vec!["Term".to_string()];
    tfidf_headers.extend(doc_headers(docs));
    let mut tfidf = Table::new("TF-IDF Values", tfidf_headers);

    let mut tf_rows = Vec::with_capacity(docs);
    for doc in 0..docs {
        tf_rows.push(snapshot.tf.row(doc).ok_or(ContractViolation::MissingTfRow { doc })?);
    }

    for (term, scores) in &snapshot.tfidf {
        let mut tf_row = Vec::with_capacity(docs + 2);
        tf_row.push(term.clone());
        for row in &tf_rows {
            tf_row.push(format_score(row.get(term).copied().unwrap_or(0.0)));
        }
        let idf = snapshot
            .idf
            .get(term)
            .ok_or_else(|| ContractViolation::MissingIdf { term: term.clone() })?;
        tf_row.push(format_score(*idf));
        tf_idf.rows.push(tf_row);

        if scores.len() > docs {
            return Err(ContractViolation::ExtraTfidf { term: term.clone(), expected: docs, found: scores.len() });
        }
        let mut score_row = Vec::with_capacity(docs + 1);
        score_row.push(term.clone());
        for doc in 0..docs {
            let score = scores
                .get(doc)
                .ok_or_else(|| ContractViolation::MissingTfidf { term: term.clone(), doc })?;
            score_row.push(format_score(*score));
        }
        tfidf.rows.push(score_row);
    }

    Ok(IndexTables { tf_idf, tfidf })
}
