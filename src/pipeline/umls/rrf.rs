//! Pipe-delimited RRF reader.
//!
//! UMLS ships each table either plain (`MRSTY.RRF`), gzip-compressed
//! (`MRSTY.RRF.gz`) or split into parts (`MRCONSO.RRF.aa.gz`, `.ab.gz`, …).
//! `table_parts` finds whichever layout is present; `for_each_record` walks
//! every line of every part in order.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use super::LoadError;
use crate::config::LOAD_PROGRESS_EVERY;

/// All files that make up `table` inside `dir`, in read order.
pub fn table_parts(dir: &Path, table: &str) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory(dir.to_path_buf()));
    }

    let mut parts: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| is_table_part(name, table))
        })
        .collect();
    parts.sort();
    Ok(parts)
}

/// Like `table_parts`, but the table must exist.
pub fn required_table(dir: &Path, table: &str) -> Result<Vec<PathBuf>, LoadError> {
    let parts = table_parts(dir, table)?;
    if parts.is_empty() {
        return Err(LoadError::MissingFile(dir.join(table)));
    }
    Ok(parts)
}

/// `MRCONSO.RRF`, `MRCONSO.RRF.gz`, `MRCONSO.RRF.aa`, `MRCONSO.RRF.aa.gz`.
/// The Semantic Network uses bare names (`SRDEF`), matched the same way.
fn is_table_part(file_name: &str, table: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(table) else {
        return false;
    };
    let rest = rest.strip_suffix(".gz").unwrap_or(rest);
    match rest.strip_prefix('.') {
        None => rest.is_empty(),
        Some(suffix) => suffix.len() == 2 && suffix.chars().all(|c| c.is_ascii_lowercase()),
    }
}

fn open_part(path: &Path) -> Result<Box<dyn BufRead>, LoadError> {
    let file = std::fs::File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Call `f` with the fields of every non-empty line in `parts`.
///
/// Lines are decoded lossily; records with fewer than `min_fields` fields
/// are rejected with the file and 1-based line number.
pub fn for_each_record<F>(parts: &[PathBuf], min_fields: usize, mut f: F) -> Result<usize, LoadError>
where
    F: FnMut(&[&str]) -> Result<(), LoadError>,
{
    let mut total = 0usize;
    let mut buf = Vec::new();

    for path in parts {
        let mut reader = open_part(path)?;
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() < min_fields {
                return Err(LoadError::Malformed {
                    file: path.clone(),
                    line: line_no,
                    reason: format!("expected at least {min_fields} fields, found {}", fields.len()),
                });
            }
            f(&fields)?;

            total += 1;
            if total % LOAD_PROGRESS_EVERY == 0 {
                tracing::info!(file = %path.display(), records = total, "Reading");
            }
        }
    }

    Ok(total)
}
