//! Address-list input: a file path when given, standard input otherwise.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::errors::{IoResultExt, Result};

/// Read candidate addresses, one per line, from `path` or from stdin.
///
/// Line order is preserved (it defines first-seen order downstream) and a
/// trailing `\r` is stripped so CRLF input behaves like LF input. No other
/// normalization happens here.
pub fn read_addresses(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => {
            let display = path.display().to_string();
            let file = File::open(path).with_path(&display, "open")?;
            collect_lines(BufReader::new(file), &display)
        }
        None => collect_lines(io::stdin().lock(), "<stdin>"),
    }
}

fn collect_lines<R: BufRead>(reader: R, source: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let mut line = line.with_path(source, "read")?;
        if line.ends_with('\r') {
            line.pop();
        }
        lines.push(line);
    }
    Ok(lines)
}
