//! Header-name synonyms for the top-SQL table. AWR generators disagree on
//! column captions, so each field carries an ordered list of candidates and
//! the first header match wins.

use std::str::FromStr;

pub const SQL_ID: &[&str] = &["sql id", "sql_id", "sqlid"];
pub const PLAN_HASH: &[&str] = &["plan hash", "plan_hash", "planhash"];
pub const EXECUTIONS: &[&str] = &["executions", "exec", "execs"];
pub const ACTIVITY: &[&str] = &["activity", "% activity", "act%", "%act"];
pub const EVENT: &[&str] = &["top event", "event", "wait event", "top wait event"];
pub const EVENT_PCT: &[&str] = &["% event", "event%"];
pub const ROW_SOURCE: &[&str] = &["row source", "rowsource", "operation"];
pub const ROW_SOURCE_PCT: &[&str] = &["% row source", "row source%"];

/// Resolves one field against a header row. `headers` must already be
/// lowercased; a synonym matches the first header containing it as a
/// substring. A match pointing at an empty cell keeps trying the remaining
/// synonyms.
pub fn resolve<'a>(headers: &[String], cells: &'a [String], synonyms: &[&str]) -> Option<&'a str> {
	for synonym in synonyms {
		if let Some(idx) = headers.iter().position(|h| h.contains(synonym)) {
			if let Some(cell) = cells.get(idx) {
				if !cell.is_empty() {
					return Some(cell);
				}
			}
		}
	}
	None
}

/// "1,234" -> 1234; anything unparsable -> 0.
pub fn parse_count(value: &str) -> u64 {
	u64::from_str(&value.trim().replace(',', "")).unwrap_or(0)
}

/// "3.10%" -> 3.10; anything unparsable -> 0.0.
pub fn parse_pct(value: &str) -> f64 {
	f64::from_str(&value.trim().replace('%', "").replace(',', "")).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn headers(h: &[&str]) -> Vec<String> {
		h.iter().map(|s| s.to_lowercase()).collect()
	}

	fn cells(c: &[&str]) -> Vec<String> {
		c.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn first_matching_synonym_wins() {
		let h = headers(&["SQL Id", "Plan Hash Value", "Executions"]);
		let c = cells(&["fh1c4w9qda6jr", "3666371265", "4"]);
		assert_eq!(resolve(&h, &c, SQL_ID), Some("fh1c4w9qda6jr"));
		assert_eq!(resolve(&h, &c, PLAN_HASH), Some("3666371265"));
	}

	#[test]
	fn empty_cell_falls_through_to_later_synonyms() {
		let h = headers(&["% Activity", "Activity Total"]);
		let c = cells(&["", "12.5"]);
		// "% activity" points at the empty first column, so the match is
		// discarded and the next synonym gets a chance.
		assert_eq!(resolve(&h, &c, &["% activity", "activity total"]), Some("12.5"));
		assert_eq!(resolve(&h, &c, &["% activity"]), None);
	}

	#[test]
	fn unknown_header_resolves_to_none() {
		let h = headers(&["Elapsed Time (s)"]);
		let c = cells(&["12.5"]);
		assert_eq!(resolve(&h, &c, SQL_ID), None);
	}

	#[test]
	fn numeric_helpers_never_fail() {
		assert_eq!(parse_count("1,234"), 1234);
		assert_eq!(parse_count("N/A"), 0);
		assert_eq!(parse_count(""), 0);
		assert_eq!(parse_pct("3.10%"), 3.10);
		assert_eq!(parse_pct("garbage"), 0.0);
		assert_eq!(parse_pct(""), 0.0);
	}
}
