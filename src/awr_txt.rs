//! Plain-text extraction path for Statspack-style reports. No table
//! structure exists, so the top-SQL section is tracked with a section flag
//! and summary scalars come from ordered textual patterns.

use std::collections::HashMap;
use std::str::FromStr;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::columns::{parse_count, parse_pct};
use crate::report::{StatementRecord, SummaryMetrics};
use crate::sqltext::text_or_placeholder;

static SQL_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[a-z0-9]{13}\s+").unwrap());
static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z\s]+:").unwrap());
static WAIT_EVENT_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)wait event").unwrap());

static DB_TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
	vec![
		Regex::new(r"(?i)DB Time[:\s]+([0-9,.]+)\s*s").unwrap(),
		Regex::new(r"(?i)Database Time[:\s]+([0-9,.]+)\s*s").unwrap(),
		Regex::new(r"(?i)Total Database Time[:\s]+([0-9,.]+)\s*s").unwrap(),
	]
});

static CPU_TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
	vec![
		Regex::new(r"(?i)CPU Time[:\s]+([0-9,.]+)\s*s").unwrap(),
		Regex::new(r"(?i)CPU used by this session[:\s]+([0-9,.]+)\s*s").unwrap(),
	]
});

static SESSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
	vec![
		Regex::new(r"(?i)Sessions[:\s]+([0-9,]+)").unwrap(),
		Regex::new(r"(?i)User calls[:\s]+([0-9,]+)").unwrap(),
		Regex::new(r"(?i)Logical reads[:\s]+([0-9,]+)").unwrap(),
	]
});

/// Fills `db_time`/`cpu_time` from the whole document text, first matching
/// pattern in priority order wins. Fields already set are left alone; this
/// doubles as the last fallback tier of the HTML path.
pub(crate) fn fill_times_from_text(summary: &mut SummaryMetrics, text: &str) {
	if summary.db_time == 0.0 {
		for pattern in DB_TIME_PATTERNS.iter() {
			if let Some(caps) = pattern.captures(text) {
				summary.db_time = f64::from_str(&caps[1].replace(',', "")).unwrap_or(0.0);
				break;
			}
		}
	}
	if summary.cpu_time == 0.0 {
		for pattern in CPU_TIME_PATTERNS.iter() {
			if let Some(caps) = pattern.captures(text) {
				summary.cpu_time = f64::from_str(&caps[1].replace(',', "")).unwrap_or(0.0);
				break;
			}
		}
	}
}

/// Scans for the top-SQL section ("Top SQL" / "SQL ordered by ...") and
/// tokenizes the statement lines inside it. The fixed column layout carries
/// no event or row-source data, those keep their defaults and the
/// percentages fall back to the activity share.
pub fn top_sql_txt(lines: &[&str], texts: &HashMap<String, String>) -> Vec<StatementRecord> {
	let mut top: Vec<StatementRecord> = Vec::new();
	let mut in_top_sql = false;

	for raw in lines {
		let line = raw.trim();
		let lowercase = line.to_lowercase();

		if lowercase.contains("top sql") || lowercase.contains("sql ordered by") {
			in_top_sql = true;
			continue;
		}
		if in_top_sql && SECTION_HEADER.is_match(line) && !lowercase.contains("sql") {
			in_top_sql = false;
		}

		if in_top_sql && SQL_LINE.is_match(line) {
			let fields: Vec<&str> = line.split_whitespace().collect();
			if fields.len() >= 4 {
				let activity_pct = parse_pct(fields[3]);
				top.push(StatementRecord {
					sql_id: fields[0].to_string(),
					plan_hash: fields[1].to_string(),
					executions: parse_count(fields[2]),
					activity_pct,
					event: "CPU + Wait for CPU".to_string(),
					event_pct: activity_pct,
					row_source: "Unknown".to_string(),
					row_source_pct: activity_pct,
					sql_text: text_or_placeholder(texts, fields[0]),
				});
			}
		}
	}
	debug!("text report: {} top-SQL lines matched", top.len());
	top.truncate(10);
	top
}

/// Summary from the joined document text: the same time patterns as the
/// HTML fallback tier, session count from the first matching workload
/// statistic, and the wait-event mention count capped at 50.
pub fn summary_txt(lines: &[&str]) -> SummaryMetrics {
	let mut summary = SummaryMetrics::default();
	let text = lines.join(" ");

	fill_times_from_text(&mut summary, &text);

	for pattern in SESSION_PATTERNS.iter() {
		if let Some(caps) = pattern.captures(&text) {
			summary.total_sessions = u64::from_str(&caps[1].replace(',', "")).unwrap_or(0);
			break;
		}
	}

	summary.wait_events = WAIT_EVENT_MENTION.find_iter(&text).count().min(50) as u64;
	summary
}
