//! Tolerant extractor turning Oracle AWR (html) or Statspack-style (txt)
//! diagnostic reports into a fixed record set: at most 10 top-SQL entries
//! plus one aggregate summary. Reports from different generators disagree on
//! table layouts, header names and section markers; extraction never errors
//! on a missing or malformed field, every absence resolves to a documented
//! default. The only failure a caller sees is the initial file read.

use std::fs;
use std::path::Path;

use log::debug;
use scraper::Html;
use thiserror::Error;

mod awr;
mod awr_txt;
mod columns;
pub mod report;
pub mod sqltext;

pub use report::{ParsedReport, ReportFormat, StatementRecord, SummaryMetrics};

#[derive(Debug, Error)]
pub enum ReportError {
	#[error("couldn't read report file {path}: {source}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
}

/// Parses raw report content. Infallible: the worst possible input yields an
/// empty entry list and an all-zero summary, which is valid output.
///
/// The SQL-text scan runs once over the flattened document, then the
/// format-appropriate top-SQL and summary extractors run; they share nothing
/// but the ID-to-text map.
pub fn parse_report(file_name: &str, content: &str) -> ParsedReport {
	match ReportFormat::detect(file_name) {
		ReportFormat::Html => {
			let doc = Html::parse_document(content);
			let flat = awr::flatten_text(&doc);
			let texts = sqltext::sql_texts(&flat);
			let top_sql = awr::top_sql(&doc, &texts);
			let summary = awr::summary(&doc, &flat);
			debug!("{}: html path, {} entries", file_name, top_sql.len());
			ParsedReport { top_sql, summary }
		}
		ReportFormat::Text => {
			let lines: Vec<&str> = content.lines().collect();
			let texts = sqltext::sql_texts(content);
			let top_sql = awr_txt::top_sql_txt(&lines, &texts);
			let summary = awr_txt::summary_txt(&lines);
			debug!("{}: text path, {} entries", file_name, top_sql.len());
			ParsedReport { top_sql, summary }
		}
	}
}

/// Reads and parses one report file. The read is the sole fallible step.
pub fn parse_report_file<P: AsRef<Path>>(path: P) -> Result<ParsedReport, ReportError> {
	let path = path.as_ref();
	let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
		path: path.display().to_string(),
		source,
	})?;
	let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
	Ok(parse_report(file_name, &content))
}
