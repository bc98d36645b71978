//! Parsers for gpg key listings.
//!
//! Both parsers are total: records they cannot make sense of are skipped and the
//! remaining lines are still read.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::{Key, SubKey};

// field positions of a `--with-colons` key record
const SIZE_FIELD: usize = 2;
const ID_FIELD: usize = 4;
const CREATED_FIELD: usize = 5;
const UID_FIELD: usize = 9;

lazy_static! {
    // first run of digits in the algorithm token, so `ed25519` reads as 25519
    static ref FIRST_DIGITS: Regex = Regex::new(r"([0-9]+)").unwrap();
}

/// Parse `pub`/`sec` records out of a `--with-colons` listing.
///
/// Only records whose type is in `record_types` are kept, one `Key` per record.
pub fn parse_colon_keys(listing: &str, record_types: &[&str]) -> Vec<Key> {
    listing
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if !record_types.contains(&fields[0]) {
                return None;
            }
            let key = parse_colon_record(&fields);
            if key.is_none() {
                debug!("Skip malformed key record: {}", line);
            }
            key
        })
        .collect()
}

fn parse_colon_record(fields: &[&str]) -> Option<Key> {
    if fields.len() <= UID_FIELD {
        return None;
    }
    let size = fields[SIZE_FIELD].parse().ok()?;
    let id = fields[ID_FIELD];
    if id.is_empty() {
        return None;
    }
    Some(Key {
        created: fields[CREATED_FIELD].to_string(),
        size,
        id: id.to_string(),
        uid: fields[UID_FIELD].to_string(),
    })
}

/// Parse `sub` lines out of a human-readable listing such as
///
/// ```text
/// pub   rsa2048/0123456789ABCDEF 2024-01-01 [SC]
/// uid                 [ultimate] Foo <foo@example.org>
/// sub   rsa2048/FEDCBA9876543210 2024-01-01 [E]
/// ```
///
/// Scanning stops at the first blank line, so only the first key block is read.
pub fn parse_subkeys(listing: &str) -> Vec<SubKey> {
    let mut subkeys = Vec::new();
    for line in listing.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            break;
        }
        if tokens[0] != "sub" {
            continue;
        }
        match parse_sub_tokens(&tokens) {
            Some(subkey) => subkeys.push(subkey),
            None => debug!("Skip malformed subkey line: {}", line),
        }
    }
    subkeys
}

fn parse_sub_tokens(tokens: &[&str]) -> Option<SubKey> {
    let (size_alg, id) = tokens.get(1)?.split_once('/')?;
    let created = tokens.get(2)?;
    if id.is_empty() {
        return None;
    }
    let size = FIRST_DIGITS.captures(size_alg)?.get(1)?.as_str().parse().ok()?;
    Some(SubKey { created: created.to_string(), size, id: id.to_string() })
}
