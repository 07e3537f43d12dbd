//! Filename classification into first-character buckets.
//!
//! A bucket is derived only from the first character of a filename once
//! leading whitespace is trimmed. File contents, size and extension never
//! influence the result.
//!
//! # Examples
//!
//! ```
//! use dirsorter::bucket::{Bucket, classify};
//!
//! assert_eq!(classify("Mario.rom", true), Bucket::Letter('m'));
//! assert_eq!(classify("007.rom", true), Bucket::Digits);
//! assert_eq!(classify("007.rom", false), Bucket::Digit('0'));
//! assert_eq!(classify("!README", true), Bucket::Others);
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Directory name used for all digit-leading files when digits are squashed.
pub const DIGITS_DIR: &str = "0-9";

/// Directory name for everything that is neither a letter nor a digit.
pub const OTHERS_DIR: &str = "_others";

/// The destination subdirectory a file is classified into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// Lower-cased letter. Always a single code point: a letter whose
    /// lower-case form is longer (`İ`) keeps only its first character.
    Letter(char),
    /// Every digit-leading file, when digit squashing is enabled.
    Digits,
    /// A single digit bucket, when digit squashing is disabled.
    Digit(char),
    /// Punctuation, symbols, and anything else.
    Others,
}

impl Bucket {
    /// Returns the directory name for this bucket.
    pub fn dir_name(&self) -> String {
        match self {
            Bucket::Letter(letter) => letter.to_string(),
            Bucket::Digits => DIGITS_DIR.to_string(),
            Bucket::Digit(digit) => digit.to_string(),
            Bucket::Others => OTHERS_DIR.to_string(),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

/// Unicode letters (categories Lu, Ll, Lt, Lm, Lo).
static LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}$").expect("letter pattern is valid"));

/// Decimal digits in any script (category Nd).
static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Nd}$").expect("digit pattern is valid"));

fn is_letter(c: char) -> bool {
    LETTER.is_match(c.encode_utf8(&mut [0; 4]))
}

fn is_digit(c: char) -> bool {
    DIGIT.is_match(c.encode_utf8(&mut [0; 4]))
}

/// Classifies a filename into its bucket.
///
/// Leading whitespace is ignored. A name that is empty or whitespace-only
/// lands in [`Bucket::Others`]. Letter-like numerals such as `Ⅷ` and
/// fractions such as `½` are neither letters nor digits.
pub fn classify(filename: &str, squash_digits: bool) -> Bucket {
    let Some(first) = filename.trim_start().chars().next() else {
        return Bucket::Others;
    };

    if is_letter(first) {
        Bucket::Letter(first.to_lowercase().next().unwrap_or(first))
    } else if is_digit(first) {
        if squash_digits {
            Bucket::Digits
        } else {
            Bucket::Digit(first)
        }
    } else {
        Bucket::Others
    }
}

/// Returns true if `name` looks like a directory this tool creates.
///
/// Matches regardless of the squash setting so that buckets made by an
/// earlier run with different options are still recognised.
pub fn is_bucket_name(name: &str) -> bool {
    if name == DIGITS_DIR || name == OTHERS_DIR {
        return true;
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_digit(c) => true,
        (Some(c), None) if is_letter(c) => c.to_lowercase().next() == Some(c),
        _ => false,
    }
}
