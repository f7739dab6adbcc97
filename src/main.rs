use std::error::Error;
use std::fs;
use std::io::{self, Write};

use clap::Parser;
use colored::*;

use awr_scope::{parse_report_file, ParsedReport};

///Parses an AWR (html) or STATSPACK-style (txt) report into JSON with the top
///resource-consuming SQL statements and an aggregate workload summary.
///Unreadable fields never abort a run, they resolve to documented defaults.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct Args {
	///Parse a single html or text report
	#[clap(short, long, default_value = "NO")]
	file: String,

	///Parse a whole directory of .html/.htm/.txt reports
	#[clap(short, long, default_value = "NO")]
	directory: String,

	///Write output to a file instead of stdout
	#[clap(short, long, default_value = "NO")]
	outfile: String,
}

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();
	let args = Args::parse();
	println!("{}{}", "AWR-SCOPE v".bright_yellow(), env!("CARGO_PKG_VERSION").bright_yellow());

	let mut output = String::new();
	if args.file != "NO" {
		let parsed = parse_report_file(&args.file)?;
		if parsed.top_sql.is_empty() {
			eprintln!("{}: no top-SQL entries extracted from {}", "Warning".bright_magenta(), &args.file);
		}
		output = serde_json::to_string_pretty(&parsed)?;
	} else if args.directory != "NO" {
		let mut reports: Vec<ParsedReport> = Vec::new();
		for file in fs::read_dir(&args.directory)? {
			let fname = file?.path().display().to_string();
			if fname.ends_with(".txt") || fname.ends_with(".html") || fname.ends_with(".htm") {
				reports.push(parse_report_file(&fname)?);
				print!("\rNumber of reports parsed: {}", reports.len());
				io::stdout().flush()?;
			}
		}
		println!();
		output = serde_json::to_string_pretty(&reports)?;
	}

	if output.is_empty() {
		eprintln!("{}", "Nothing to do, pass --file or --directory".bright_cyan());
		return Ok(());
	}

	if args.outfile != "NO" {
		fs::write(&args.outfile, output.as_bytes())?;
	} else {
		println!("{}", output);
	}
	Ok(())
}
