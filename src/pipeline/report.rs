//! Top-word frequency report.
//!
//! Rows come from the layout's normalised frequencies so the table ranks
//! words exactly as the cloud sized them; raw counts are looked up from the
//! same [`WordCounts`] the layout used.

use crate::error::WordCloudError;
use crate::pipeline::tokenize::WordCounts;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt::Write as _;

/// Column headers of the exported CSV.
pub const CSV_HEADERS: [&str; 3] = ["Word", "Raw Count", "Normalized Frequency (%)"];

/// One row of the frequency report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub raw_count: u32,
    /// Normalised frequency × 100, rounded to two decimals.
    pub normalized_pct: f64,
}

/// CSV row shape with the human-facing column names.
#[derive(Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Word")]
    word: String,
    #[serde(rename = "Raw Count")]
    raw_count: u32,
    #[serde(rename = "Normalized Frequency (%)")]
    normalized_pct: f64,
}

/// The top words of a run, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyReport {
    pub rows: Vec<WordFrequency>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Build the report from the layout frequencies: rows are stably sorted by
/// raw count (descending), then cut to `top_n`. A word missing from `counts`
/// gets a raw count of 0.
pub fn build_report(
    frequencies: &[(String, f64)],
    counts: &WordCounts,
    top_n: usize,
) -> FrequencyReport {
    let mut rows: Vec<WordFrequency> = frequencies
        .iter()
        .map(|(word, freq)| WordFrequency {
            word: word.clone(),
            raw_count: counts.get(word).unwrap_or(0),
            normalized_pct: round2(freq * 100.0),
        })
        .collect();
    rows.sort_by_key(|r| Reverse(r.raw_count));
    rows.truncate(top_n);
    FrequencyReport { rows }
}

impl FrequencyReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordFrequency> {
        self.rows.iter()
    }

    /// Largest raw count in the report, 0 if empty.
    pub fn max_count(&self) -> u32 {
        self.rows.iter().map(|r| r.raw_count).max().unwrap_or(0)
    }

    /// Serialise as UTF-8 CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, WordCloudError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.rows.is_empty() {
            writer.write_record(CSV_HEADERS)?;
        }
        for row in &self.rows {
            writer.serialize(CsvRow {
                word: row.word.clone(),
                raw_count: row.raw_count,
                normalized_pct: row.normalized_pct,
            })?;
        }
        writer
            .into_inner()
            .map_err(|e| WordCloudError::CsvExport(e.to_string()))
    }

    /// Parse CSV produced by [`FrequencyReport::to_csv`].
    pub fn from_csv(bytes: &[u8]) -> Result<Self, WordCloudError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers()?.clone();
        if headers.iter().ne(CSV_HEADERS) {
            return Err(WordCloudError::CsvExport(format!(
                "unexpected CSV header: {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }
        let rows = reader
            .deserialize::<CsvRow>()
            .map(|r| {
                r.map(|row| WordFrequency {
                    word: row.word,
                    raw_count: row.raw_count,
                    normalized_pct: row.normalized_pct,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Plain-text table for terminal output.
    pub fn to_table(&self) -> String {
        let word_w = self
            .rows
            .iter()
            .map(|r| r.word.chars().count())
            .chain(std::iter::once(CSV_HEADERS[0].len()))
            .max()
            .unwrap_or(4);
        let count_w = CSV_HEADERS[1].len();
        let pct_w = CSV_HEADERS[2].len();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<word_w$}  {:>count_w$}  {:>pct_w$}",
            CSV_HEADERS[0], CSV_HEADERS[1], CSV_HEADERS[2]
        );
        let _ = writeln!(out, "{}  {}  {}", "-".repeat(word_w), "-".repeat(count_w), "-".repeat(pct_w));
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<word_w$}  {:>count_w$}  {:>pct_w$.2}",
                row.word, row.raw_count, row.normalized_pct
            );
        }
        out
    }
}
