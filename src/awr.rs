//! HTML extraction path. AWR generators disagree on table captions and
//! column order, so tables are recognized by header substrings and fields
//! are resolved through the synonym lists in `columns`.

use std::collections::HashMap;
use std::str::FromStr;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::awr_txt::fill_times_from_text;
use crate::columns::{self, parse_count, parse_pct};
use crate::report::{StatementRecord, SummaryMetrics};
use crate::sqltext::text_or_placeholder;

static SECONDS_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([0-9,]+\.?[0-9]*)\s*s").unwrap());
static NUMERIC_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9,]+\.?[0-9]*)").unwrap());
static INTEGER_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9,]+)").unwrap());

/// Flattens the document to the text a line scanner can work on, the
/// concatenation of all text nodes under `<body>` (whole tree when there is
/// no body element).
pub fn flatten_text(doc: &Html) -> String {
	let body_selector = Selector::parse("body").unwrap();
	match doc.select(&body_selector).next() {
		Some(body) => body.text().collect::<String>(),
		None => doc.root_element().text().collect::<String>(),
	}
}

fn header_texts(table: ElementRef) -> Vec<String> {
	let header_selector = Selector::parse("th").unwrap();
	table
		.select(&header_selector)
		.map(|h| h.text().collect::<String>().trim().to_lowercase())
		.collect()
}

fn is_top_sql_table(headers: &[String]) -> bool {
	headers.iter().any(|h| h.contains("sql id") || h.contains("sql_id"))
		|| headers.iter().any(|h| h.contains("activity") || h.contains("% activity"))
}

fn record_from_row(
	headers: &[String],
	cells: &[String],
	texts: &HashMap<String, String>,
) -> Option<StatementRecord> {
	// A row with no resolvable SQL ID is skipped, not defaulted.
	let sql_id = columns::resolve(headers, cells, columns::SQL_ID)?.to_string();

	let activity_pct = columns::resolve(headers, cells, columns::ACTIVITY)
		.map(parse_pct)
		.unwrap_or(0.0);

	Some(StatementRecord {
		plan_hash: columns::resolve(headers, cells, columns::PLAN_HASH)
			.unwrap_or("0")
			.to_string(),
		executions: columns::resolve(headers, cells, columns::EXECUTIONS)
			.map(parse_count)
			.unwrap_or(0),
		activity_pct,
		event: columns::resolve(headers, cells, columns::EVENT)
			.unwrap_or("CPU + Wait for CPU")
			.to_string(),
		event_pct: columns::resolve(headers, cells, columns::EVENT_PCT)
			.map(parse_pct)
			.unwrap_or(activity_pct),
		row_source: columns::resolve(headers, cells, columns::ROW_SOURCE)
			.unwrap_or("Unknown")
			.to_string(),
		row_source_pct: columns::resolve(headers, cells, columns::ROW_SOURCE_PCT)
			.map(parse_pct)
			.unwrap_or(activity_pct),
		sql_text: text_or_placeholder(texts, &sql_id),
		sql_id,
	})
}

/// Walks every table whose header row looks like a top-SQL listing and
/// collects the first 10 valid rows across them, in document order.
pub fn top_sql(doc: &Html, texts: &HashMap<String, String>) -> Vec<StatementRecord> {
	let table_selector = Selector::parse("table").unwrap();
	let row_selector = Selector::parse("tbody tr").unwrap();
	let column_selector = Selector::parse("td").unwrap();

	let mut top: Vec<StatementRecord> = Vec::new();
	for table in doc.select(&table_selector) {
		let headers = header_texts(table);
		if !is_top_sql_table(&headers) {
			continue;
		}
		debug!("qualifying top-SQL table with headers {:?}", headers);

		for row in table.select(&row_selector) {
			let cells: Vec<String> = row
				.select(&column_selector)
				.map(|td| td.text().collect::<String>().trim().to_string())
				.collect();
			if cells.len() >= 4 {
				if let Some(record) = record_from_row(&headers, &cells, texts) {
					top.push(record);
				}
			}
		}
	}
	top.truncate(10);
	top
}

fn first_seconds_value(cells: &[String]) -> Option<f64> {
	for cell in cells {
		let captures = SECONDS_VALUE.captures(cell).or_else(|| NUMERIC_VALUE.captures(cell));
		if let Some(c) = captures {
			let value = f64::from_str(&c[1].replace(',', "")).unwrap_or(0.0);
			if value > 0.0 {
				return Some(value);
			}
		}
	}
	None
}

fn first_integer_value(cells: &[String]) -> Option<u64> {
	for cell in cells {
		if let Some(c) = INTEGER_VALUE.captures(cell) {
			let value = u64::from_str(&c[1].replace(',', "")).unwrap_or(0);
			if value > 0 {
				return Some(value);
			}
		}
	}
	None
}

fn wait_event_rows(doc: &Html) -> u64 {
	let table_selector = Selector::parse("table").unwrap();
	let row_selector = Selector::parse("tbody tr").unwrap();

	let mut count = 0;
	for table in doc.select(&table_selector) {
		let headers = header_texts(table);
		let matches = headers
			.iter()
			.any(|h| (h.contains("wait") && h.contains("event")) || h.contains("top 5 timed events"));
		if matches {
			count = count.max(table.select(&row_selector).count());
		}
	}
	count as u64
}

/// Tiered summary extraction: time-model tables first, then session counts
/// from Instance Efficiency / Load Profile, then whole-text patterns for
/// whatever is still zero. Each tier only fills fields still at their
/// default.
pub fn summary(doc: &Html, text: &str) -> SummaryMetrics {
	let table_selector = Selector::parse("table").unwrap();
	let row_selector = Selector::parse("tr").unwrap();
	let cell_selector = Selector::parse("td, th").unwrap();

	let mut summary = SummaryMetrics::default();

	for table in doc.select(&table_selector) {
		let table_text = table.text().collect::<String>();

		if table_text.contains("Time Model Statistics")
			|| table_text.contains("DB time")
			|| table_text.contains("DB Time")
		{
			for row in table.select(&row_selector) {
				let cells: Vec<String> = row
					.select(&cell_selector)
					.map(|c| c.text().collect::<String>().trim().to_string())
					.collect();

				if summary.db_time == 0.0
					&& cells.iter().any(|c| c.to_lowercase().contains("db time"))
				{
					if let Some(value) = first_seconds_value(&cells) {
						summary.db_time = value;
					}
				}
				if summary.cpu_time == 0.0 && cells.iter().any(|c| {
					let c = c.to_lowercase();
					c.contains("cpu time") || c.contains("cpu used")
				}) {
					if let Some(value) = first_seconds_value(&cells) {
						summary.cpu_time = value;
					}
				}
			}
		}

		if table_text.contains("Instance Efficiency") || table_text.contains("Load Profile") {
			for row in table.select(&row_selector) {
				let cells: Vec<String> = row
					.select(&cell_selector)
					.map(|c| c.text().collect::<String>().trim().to_string())
					.collect();

				if summary.total_sessions == 0 && cells.iter().any(|c| {
					let c = c.to_lowercase();
					c.contains("sessions") || c.contains("user calls")
				}) {
					if let Some(value) = first_integer_value(&cells) {
						summary.total_sessions = value;
					}
				}
			}
		}
	}

	if summary.db_time == 0.0 || summary.cpu_time == 0.0 {
		fill_times_from_text(&mut summary, text);
	}

	summary.wait_events = wait_event_rows(doc);
	debug!(
		"summary: db_time={} cpu_time={} sessions={} wait_events={}",
		summary.db_time, summary.cpu_time, summary.total_sessions, summary.wait_events
	);
	summary
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn seconds_suffix_is_preferred_over_bare_numbers() {
		let cells = vec!["DB Time".to_string(), "1,234.5 s".to_string()];
		assert_eq!(first_seconds_value(&cells), Some(1234.5));
	}

	#[test]
	fn label_cells_without_digits_are_passed_over() {
		let cells = vec!["CPU time".to_string(), "".to_string(), "567.8".to_string()];
		assert_eq!(first_seconds_value(&cells), Some(567.8));
	}

	#[test]
	fn zero_values_do_not_count_as_found() {
		let cells = vec!["0".to_string(), "0.0".to_string()];
		assert_eq!(first_seconds_value(&cells), None);
		assert_eq!(first_integer_value(&cells), None);
	}

	#[test]
	fn wait_event_table_row_count_takes_the_maximum() {
		let html = r#"<html><body>
			<table><tr><th>Wait Event</th><th>Waits</th></tr>
				<tr><td>db file sequential read</td><td>100</td></tr>
				<tr><td>log file sync</td><td>50</td></tr>
			</table>
			<table><tr><th>Top 5 Timed Events</th></tr>
				<tr><td>CPU time</td></tr>
			</table>
		</body></html>"#;
		let doc = Html::parse_document(html);
		// Header rows land in tbody too when the source has no thead; the
		// count mirrors what the markup exposes, not a cleaned-up row model.
		assert_eq!(wait_event_rows(&doc), 3);
	}
}
