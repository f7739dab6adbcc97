use serde::{Deserialize, Serialize};

/// Extraction path chosen from the uploaded file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
	Html,
	Text,
}

impl ReportFormat {
	/// `.html`/`.htm` means an AWR-style HTML report, anything else is treated
	/// as a Statspack-style text report. Unknown suffixes are not rejected here,
	/// extension validation belongs to the caller.
	pub fn detect(file_name: &str) -> ReportFormat {
		let fname = file_name.to_lowercase();
		if fname.ends_with(".html") || fname.ends_with(".htm") {
			ReportFormat::Html
		} else {
			ReportFormat::Text
		}
	}
}

/// One row of the top-SQL listing. Every field has a documented default so a
/// report with sparse or renamed columns still yields a complete record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatementRecord {
	pub sql_id: String,
	pub plan_hash: String,
	pub executions: u64,
	pub activity_pct: f64,
	pub event: String,
	pub event_pct: f64,
	pub row_source: String,
	pub row_source_pct: f64,
	pub sql_text: String,
}

impl Default for StatementRecord {
	fn default() -> StatementRecord {
		StatementRecord {
			sql_id: String::new(),
			plan_hash: "0".to_string(),
			executions: 0,
			activity_pct: 0.0,
			event: "CPU + Wait for CPU".to_string(),
			event_pct: 0.0,
			row_source: "Unknown".to_string(),
			row_source_pct: 0.0,
			sql_text: String::new(),
		}
	}
}

/// Aggregate workload scalars for the snapshot period. Fields that cannot be
/// located stay at zero, they are never filled with synthetic values.
#[derive(Default, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
	pub total_sessions: u64,
	pub cpu_time: f64,
	pub db_time: f64,
	pub wait_events: u64,
}

/// The single value returned to callers: at most 10 top-SQL entries in
/// document order of discovery, plus one summary.
#[derive(Default, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParsedReport {
	pub top_sql: Vec<StatementRecord>,
	pub summary: SummaryMetrics,
}
