use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};

use crate::errors::{CustomResult, Error};

pub struct Formatting {}

impl Formatting {
    /// # normalize a driver name
    /// This is the canonical driver identity used everywhere a driver is
    /// looked up by name: surrounding whitespace trimmed, every word
    /// title-cased. Two raw strings differing only in case or padding must
    /// collapse to the same driver.
    ///
    /// ## Arguments
    /// * `raw` - the name as it appears in a document cell
    ///
    /// ## Returns
    /// * `String` - the normalized name
    pub fn normalize_name(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut prev_alphabetic = false;

        for c in raw.trim().chars() {
            if c.is_alphabetic() {
                if prev_alphabetic {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                prev_alphabetic = true;
            } else {
                out.push(c);
                prev_alphabetic = false;
            }
        }

        out
    }
}

pub struct RacesHelper {}

impl RacesHelper {
    /// Load a newline-separated list of result page urls; blank lines skipped.
    pub fn load_urls_from_file(path: &str) -> CustomResult<Vec<String>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) => {
                return Err(match error.kind() {
                    ErrorKind::NotFound => Error::FileDoesNotExist {
                        path: path.to_string(),
                    },
                    ErrorKind::PermissionDenied => Error::PermissionDenied {
                        path: path.to_string(),
                    },
                    _ => Error::from(error),
                });
            }
        };

        let mut urls = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                urls.push(line.trim().to_string());
            }
        }

        Ok(urls)
    }
}
