//! Associates free-form SQL bodies found in the flattened report text with
//! the 13-character SQL IDs listed elsewhere in the document.
//!
//! The scan is a small state machine driven line by line. Two triggers are
//! evaluated independently on every line: a SQL ID at the start of a line
//! adopts that ID as the current owner, and a statement keyword anywhere in
//! the line starts (or restarts) text capture. Because the triggers are
//! independent and line-order dependent, a statement line that precedes its
//! ID line in the document attaches to the *previous* ID. That attribution
//! quirk is kept on purpose, report generators put the ID first in every
//! layout seen so far; `SqlTextScan::strict` discards such unterminated
//! buffers instead of flushing them.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_ID_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z0-9]{13})\s").unwrap());
static SEPARATOR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+$").unwrap());
static VERSION_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+").unwrap());

const STATEMENT_KEYWORDS: &[&str] = &["select", "insert", "update", "delete", "with"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Idle,
	Capturing,
}

pub struct SqlTextScan {
	state: State,
	current_id: Option<String>,
	buffer: Vec<String>,
	texts: HashMap<String, String>,
	strict: bool,
}

impl SqlTextScan {
	pub fn new() -> SqlTextScan {
		SqlTextScan {
			state: State::Idle,
			current_id: None,
			buffer: Vec::new(),
			texts: HashMap::new(),
			strict: false,
		}
	}

	/// Stricter attribution: a buffer that was not closed by a blank or
	/// separator line is dropped when the next SQL ID shows up, instead of
	/// being credited to the previous ID.
	pub fn strict() -> SqlTextScan {
		SqlTextScan { strict: true, ..SqlTextScan::new() }
	}

	fn flush(&mut self) {
		if let Some(id) = &self.current_id {
			if !self.buffer.is_empty() {
				self.texts.insert(id.clone(), self.buffer.join(" ").trim().to_string());
			}
		}
		self.buffer.clear();
	}

	/// Feeds one line to the scanner. Later flushes under the same ID
	/// overwrite earlier ones.
	pub fn step(&mut self, raw_line: &str) {
		let line = raw_line.trim();
		let lowercase = line.to_lowercase();

		if let Some(caps) = SQL_ID_LINE.captures(line) {
			if self.strict && self.state == State::Capturing {
				self.buffer.clear();
			}
			self.flush();
			self.current_id = Some(caps[1].to_string());
			self.state = State::Idle;
		}

		if STATEMENT_KEYWORDS.iter().any(|kw| lowercase.contains(kw)) {
			self.state = State::Capturing;
			self.buffer = vec![line.to_string()];
		} else if self.state == State::Capturing && self.current_id.is_some() {
			if !line.is_empty()
				&& !SEPARATOR_LINE.is_match(line)
				&& !VERSION_TOKEN.is_match(line)
				&& !lowercase.contains("plan hash")
			{
				self.buffer.push(line.to_string());
			} else if line.is_empty() || SEPARATOR_LINE.is_match(line) {
				self.state = State::Idle;
				self.flush();
			}
		}
	}

	pub fn finish(mut self) -> HashMap<String, String> {
		self.flush();
		self.texts
	}
}

/// Runs the scan over a whole flattened document.
pub fn sql_texts(text: &str) -> HashMap<String, String> {
	let mut scan = SqlTextScan::new();
	for line in text.lines() {
		scan.step(line);
	}
	scan.finish()
}

/// Looks up the captured body for `sql_id`, synthesizing the fixed
/// placeholder when no body was found anywhere in the document.
pub fn text_or_placeholder(texts: &HashMap<String, String>, sql_id: &str) -> String {
	texts
		.get(sql_id)
		.cloned()
		.unwrap_or_else(|| format!("SQL ID: {} - Text extracted from AWR", sql_id))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn id_line_then_statement_then_blank_captures_the_body() {
		let texts = sql_texts("fh1c4w9qda6jr    4   3.10\nSELECT owner FROM dba_objects\nWHERE rownum < 10\n\n");
		assert_eq!(
			texts.get("fh1c4w9qda6jr").map(String::as_str),
			Some("SELECT owner FROM dba_objects WHERE rownum < 10")
		);
	}

	#[test]
	fn end_of_input_flushes_the_open_buffer() {
		let texts = sql_texts("fh1c4w9qda6jr 1 1.0\nselect 1 from dual");
		assert_eq!(texts.get("fh1c4w9qda6jr").map(String::as_str), Some("select 1 from dual"));
	}

	#[test]
	fn separator_lines_end_the_capture() {
		let texts = sql_texts("fh1c4w9qda6jr 1 1.0\nselect col_a\n----------\nfrom ignored_tail\n");
		// "from ignored_tail" restarts nothing (no keyword) and the buffer was
		// already flushed at the separator.
		assert_eq!(texts.get("fh1c4w9qda6jr").map(String::as_str), Some("select col_a"));
	}

	#[test]
	fn version_tokens_and_plan_hash_lines_are_skipped_mid_capture() {
		let texts = sql_texts("fh1c4w9qda6jr 1 1.0\nselect col_a\n3.10\nPlan hash value: 12345\nfrom tab_b\n\n");
		assert_eq!(texts.get("fh1c4w9qda6jr").map(String::as_str), Some("select col_a from tab_b"));
	}

	#[test]
	fn statement_line_without_any_known_id_is_dropped() {
		let texts = sql_texts("select orphan from nowhere\n\n");
		assert!(texts.is_empty());
	}

	#[test]
	fn statement_before_its_id_line_attaches_to_the_previous_id() {
		// Inherited attribution quirk, see the module docs.
		let input = "aaaaaaaaaaaaa 1 1.0\nselect belongs_to_b from t\nbbbbbbbbbbbbb 2 2.0\n\n";
		let texts = sql_texts(input);
		assert_eq!(texts.get("aaaaaaaaaaaaa").map(String::as_str), Some("select belongs_to_b from t"));
		assert!(!texts.contains_key("bbbbbbbbbbbbb"));
	}

	#[test]
	fn strict_mode_discards_unterminated_buffers_on_a_new_id() {
		let input = "aaaaaaaaaaaaa 1 1.0\nselect belongs_to_b from t\nbbbbbbbbbbbbb 2 2.0\n\n";
		let mut scan = SqlTextScan::strict();
		for line in input.lines() {
			scan.step(line);
		}
		let texts = scan.finish();
		assert!(texts.is_empty());
	}

	#[test]
	fn later_body_for_the_same_id_overwrites_the_earlier_one() {
		let input = "aaaaaaaaaaaaa 1 1.0\nselect first from t\n\naaaaaaaaaaaaa 1 1.0\nselect second from t\n\n";
		let texts = sql_texts(input);
		assert_eq!(texts.get("aaaaaaaaaaaaa").map(String::as_str), Some("select second from t"));
	}

	#[test]
	fn placeholder_is_synthesized_for_unmapped_ids() {
		let texts = HashMap::new();
		assert_eq!(
			text_or_placeholder(&texts, "fh1c4w9qda6jr"),
			"SQL ID: fh1c4w9qda6jr - Text extracted from AWR"
		);
	}
}
