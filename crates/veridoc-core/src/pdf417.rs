//! PDF417 payload extraction and line-oriented field classification.
//!
//! The DNI back encodes identity fields as a semi-structured text blob.
//! Classification is best-effort: no check digit, no field-count
//! enforcement, unknown lines are ignored.

use std::path::Path;

use thiserror::Error;

use crate::provider::{BarcodeProvider, ProviderError, SymbolKind};
use crate::types::BarcodeRecord;

#[derive(Error, Debug)]
pub enum BarcodeError {
    #[error("no PDF417 barcode found")]
    NoBarcodeFound,
    #[error("PDF417 payload is not valid UTF-8: {0}")]
    PayloadDecode(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Scan the document back and parse the first PDF417 symbol found.
///
/// Multiple PDF417 symbols: first in provider order wins, no best-match
/// policy.
pub fn extract_record(
    provider: &mut dyn BarcodeProvider,
    path: &Path,
) -> Result<BarcodeRecord, BarcodeError> {
    let symbols = provider.scan(path)?;
    let symbol = symbols
        .into_iter()
        .find(|s| s.kind == SymbolKind::Pdf417)
        .ok_or(BarcodeError::NoBarcodeFound)?;
    let payload = String::from_utf8(symbol.payload)?;
    Ok(parse_payload(&payload))
}

/// Classify payload lines into identity fields.
///
/// Three passes over the same lines: document number, then name candidates,
/// then dates. Later candidates in each pass are ignored. The gender field
/// is never recovered from line classification and stays empty.
pub fn parse_payload(payload: &str) -> BarcodeRecord {
    let lines: Vec<&str> = payload.split('\n').collect();
    let mut record = BarcodeRecord { raw_payload: payload.to_string(), ..Default::default() };

    // Document number: first all-digit line of at least 7 characters.
    for line in &lines {
        let line = line.trim();
        if line.len() >= 7 && is_numeric(line) {
            record.document_number = line.to_string();
            break;
        }
    }

    // Names: non-numeric, non-date lines longer than 2 characters, in order.
    let mut names = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| {
            !line.is_empty() && !is_numeric(line) && !is_date_line(line) && line.len() > 2
        });
    if let Some(first) = names.next() {
        record.first_name = first.to_string();
    }
    if let Some(last) = names.next() {
        record.last_name = last.to_string();
    }

    // Dates are matched on the raw line: the shape check is start-anchored,
    // so leading whitespace disqualifies but trailing text does not.
    for line in &lines {
        if is_date_line(line) {
            if record.birth_date.is_empty() {
                record.birth_date = line.to_string();
            } else if record.expiration_date.is_empty() {
                record.expiration_date = line.to_string();
            }
        }
    }

    record
}

/// Advisory field checks mirroring the upstream document rules: 7-8 digit
/// document number, names of at least 2 characters, gender M/F/N when
/// present. Violations are reported to the caller, never fatal.
pub fn validate(record: &BarcodeRecord) -> Vec<String> {
    let mut problems = Vec::new();

    let number = &record.document_number;
    if !(7..=8).contains(&number.len()) || !is_numeric(number) {
        problems.push(format!("document number {number:?} is not 7-8 digits"));
    }
    if record.first_name.len() < 2 || record.last_name.len() < 2 {
        problems.push("first or last name shorter than 2 characters".to_string());
    }
    if !record.gender.is_empty() && !matches!(record.gender.as_str(), "M" | "F" | "N") {
        problems.push(format!("gender {:?} is not one of M/F/N", record.gender));
    }

    problems
}

fn is_numeric(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// Shape check for `DD/MM/YYYY`, `DD-MM-YYYY`, or `YYYY-MM-DD` at the start
/// of the line. Trailing text is allowed.
fn is_date_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    matches_shape(bytes, [2, 2, 4], b'/')
        || matches_shape(bytes, [2, 2, 4], b'-')
        || matches_shape(bytes, [4, 2, 2], b'-')
}

fn matches_shape(bytes: &[u8], groups: [usize; 3], separator: u8) -> bool {
    let mut pos = 0;
    for (i, len) in groups.into_iter().enumerate() {
        if i > 0 {
            if bytes.get(pos) != Some(&separator) {
                return false;
            }
            pos += 1;
        }
        for _ in 0..len {
            match bytes.get(pos) {
                Some(b) if b.is_ascii_digit() => pos += 1,
                _ => return false,
            }
        }
    }
    true
}
