//! Format validators applied by the service layer before any mutating call
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ISBN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][0-9-]{11,15}[0-9]$").expect("static regex"));
static PATRON_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("static regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ]+(?:[ '-][A-Za-zÀ-ÖØ-öø-ÿ]+)*$").expect("static regex"));

/// 13 to 17 characters of digits and hyphens, starting and ending on a digit.
pub fn is_valid_isbn(isbn: &str) -> bool {
    ISBN_RE.is_match(isbn)
}

/// Exactly 10 digits, nothing else.
pub fn is_valid_patron_id(id: &str) -> bool {
    PATRON_ID_RE.is_match(id)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Alphabetic words, optionally joined by single spaces, apostrophes or
/// hyphens. Digits and other punctuation are rejected.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Publication years run from 0 up to the current calendar year inclusive.
pub fn is_valid_year(year: i32) -> bool {
    (0..=Utc::now().year()).contains(&year)
}
