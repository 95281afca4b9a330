//! Date parsing and formatting for `FormatDate`
//!
//! Format strings use the custom date/time pattern language directory
//! administrators already write in synchronization rules (`yyyy-MM-dd`,
//! `dd MMM yyyy HH:mm`, quoted literals, and a handful of single-letter
//! standard patterns). Patterns are tokenized once when the transform is
//! configured. Rendering is done token by token; exact parsing goes through
//! an equivalent chrono format string.
//!
//! All instants are handled in UTC.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use super::text::expect_single;
use super::types::{DateType, TransformError};
use crate::coercion::{file_time_to_datetime, parse_integer};
use crate::value::{Scalar, Value};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Output pattern used when none is configured
pub const DEFAULT_OUTPUT_FORMAT: &str = "MM/dd/yyyy HH:mm:ss";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%A, %d %B %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %d %B %Y",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year(usize),
    Month(usize),
    Day(usize),
    Hour24(usize),
    Hour12(usize),
    Minute(usize),
    Second(usize),
    Fraction { digits: usize, trim: bool },
    AmPm(usize),
    Offset(usize),
    Kind,
}

/// A tokenized date pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    tokens: Vec<Token>,
}

impl DatePattern {
    /// Tokenize a pattern, rejecting malformed ones
    pub fn parse(source: &str) -> Result<Self, String> {
        if source.is_empty() {
            return Err("date format must not be empty".to_string());
        }
        let expanded = expand_standard(source)?;
        let tokens = tokenize(&expanded)?;
        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    /// The pattern as configured
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern can also drive exact parsing
    pub fn check_parseable(&self) -> Result<(), String> {
        self.strftime().map(|_| ())
    }

    /// Render an instant with this pattern
    pub fn render(&self, instant: &DateTime<Utc>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Year(1) => out.push_str(&(instant.year() % 100).to_string()),
                Token::Year(2) => out.push_str(&format!("{:02}", instant.year() % 100)),
                Token::Year(n) => out.push_str(&format!("{:0width$}", instant.year(), width = *n)),
                Token::Month(n) => {
                    let month = instant.month() as usize;
                    match n {
                        1 => out.push_str(&month.to_string()),
                        2 => out.push_str(&format!("{:02}", month)),
                        3 => out.push_str(&MONTH_NAMES[month - 1][..3]),
                        _ => out.push_str(MONTH_NAMES[month - 1]),
                    }
                }
                Token::Day(n) => {
                    let weekday = instant.weekday().num_days_from_sunday() as usize;
                    match n {
                        1 => out.push_str(&instant.day().to_string()),
                        2 => out.push_str(&format!("{:02}", instant.day())),
                        3 => out.push_str(&DAY_NAMES[weekday][..3]),
                        _ => out.push_str(DAY_NAMES[weekday]),
                    }
                }
                Token::Hour24(n) => push_number(&mut out, instant.hour(), *n),
                Token::Hour12(n) => {
                    let hour = match instant.hour() % 12 {
                        0 => 12,
                        h => h,
                    };
                    push_number(&mut out, hour, *n);
                }
                Token::Minute(n) => push_number(&mut out, instant.minute(), *n),
                Token::Second(n) => push_number(&mut out, instant.second(), *n),
                Token::Fraction { digits, trim } => {
                    // Leap seconds report nanos above one second
                    let nanos = format!("{:09}", instant.nanosecond() % 1_000_000_000);
                    let mut fraction = &nanos[..*digits];
                    if *trim {
                        fraction = fraction.trim_end_matches('0');
                        if fraction.is_empty() && out.ends_with('.') {
                            out.pop();
                        }
                    }
                    out.push_str(fraction);
                }
                Token::AmPm(n) => {
                    let pm = instant.hour() >= 12;
                    out.push_str(match (n, pm) {
                        (1, false) => "A",
                        (1, true) => "P",
                        (_, false) => "AM",
                        (_, true) => "PM",
                    });
                }
                Token::Offset(1) => out.push_str("+0"),
                Token::Offset(2) => out.push_str("+00"),
                Token::Offset(_) => out.push_str("+00:00"),
                Token::Kind => out.push('Z'),
            }
        }
        out
    }

    /// Parse text that must match this pattern exactly
    pub fn parse_exact(&self, input: &str) -> Result<DateTime<Utc>, TransformError> {
        let format = self
            .strftime()
            .map_err(|message| TransformError::format(message, input))?;
        let has_offset = self
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Offset(_) | Token::Kind));
        let has_time = self.tokens.iter().any(|t| {
            matches!(
                t,
                Token::Hour24(_) | Token::Hour12(_) | Token::Minute(_) | Token::Second(_)
            )
        });

        let parsed = if has_offset {
            DateTime::parse_from_str(input, &format).map(|dt| dt.with_timezone(&Utc))
        } else if has_time {
            NaiveDateTime::parse_from_str(input, &format).map(|dt| dt.and_utc())
        } else {
            NaiveDate::parse_from_str(input, &format).map(|d| d.and_time(NaiveTime::MIN).and_utc())
        };

        parsed.map_err(|e| {
            TransformError::format(
                format!("does not match date format '{}': {}", self.source, e),
                input,
            )
        })
    }

    fn strftime(&self) -> Result<String, String> {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(&text.replace('%', "%%")),
                Token::Year(1 | 2) => out.push_str("%y"),
                Token::Year(_) => out.push_str("%Y"),
                Token::Month(1 | 2) => out.push_str("%m"),
                Token::Month(3) => out.push_str("%b"),
                Token::Month(_) => out.push_str("%B"),
                Token::Day(1 | 2) => out.push_str("%d"),
                Token::Day(3) => out.push_str("%a"),
                Token::Day(_) => out.push_str("%A"),
                Token::Hour24(_) => out.push_str("%H"),
                Token::Hour12(_) => out.push_str("%I"),
                Token::Minute(_) => out.push_str("%M"),
                Token::Second(_) => out.push_str("%S"),
                Token::Fraction { digits: 3, .. } => out.push_str("%3f"),
                Token::Fraction { digits: 6, .. } => out.push_str("%6f"),
                Token::Fraction { digits, .. } => {
                    return Err(format!(
                        "a {}-digit fraction cannot be used for parsing; use 3 or 6 digits",
                        digits
                    ));
                }
                Token::AmPm(1) => {
                    return Err("single-letter AM/PM designator cannot be used for parsing".to_string());
                }
                Token::AmPm(_) => out.push_str("%p"),
                Token::Offset(3..) => out.push_str("%:z"),
                Token::Offset(_) | Token::Kind => out.push_str("%#z"),
            }
        }
        Ok(out)
    }
}

fn push_number(out: &mut String, value: u32, width: usize) {
    if width >= 2 {
        out.push_str(&format!("{:02}", value));
    } else {
        out.push_str(&value.to_string());
    }
}

/// Replace a single-letter standard pattern by its custom equivalent
fn expand_standard(source: &str) -> Result<String, String> {
    let mut chars = source.chars();
    let (Some(only), None) = (chars.next(), chars.next()) else {
        return Ok(source.to_string());
    };
    let expanded = match only {
        'o' | 'O' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffffK",
        's' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss",
        'u' => "yyyy'-'MM'-'dd HH':'mm':'ss'Z'",
        'd' => "MM/dd/yyyy",
        'D' => "dddd, dd MMMM yyyy",
        't' => "HH:mm",
        'T' => "HH:mm:ss",
        'g' => "MM/dd/yyyy HH:mm",
        'G' => DEFAULT_OUTPUT_FORMAT,
        'f' => "dddd, dd MMMM yyyy HH:mm",
        'F' => "dddd, dd MMMM yyyy HH:mm:ss",
        'M' | 'm' => "MMMM dd",
        'Y' | 'y' => "yyyy MMMM",
        other => return Err(format!("unknown standard date format '{}'", other)),
    };
    Ok(expanded.to_string())
}

fn tokenize(pattern: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&x| x == c)
                    .ok_or_else(|| format!("unterminated quoted literal in '{}'", pattern))?;
                literal.extend(&chars[i + 1..i + 1 + close]);
                i += close + 2;
                continue;
            }
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| format!("trailing backslash in '{}'", pattern))?;
                literal.push(*escaped);
                i += 2;
                continue;
            }
            // Forces a lone letter to be read as a custom specifier
            '%' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let token = match c {
            'y' => Token::Year(run),
            'M' => Token::Month(run),
            'd' => Token::Day(run),
            'H' => Token::Hour24(run),
            'h' => Token::Hour12(run),
            'm' => Token::Minute(run),
            's' => Token::Second(run),
            'f' | 'F' if run > 7 => {
                return Err(format!("at most 7 fraction digits are supported, found {}", run));
            }
            'f' | 'F' => Token::Fraction {
                digits: run,
                trim: c == 'F',
            },
            't' => Token::AmPm(run),
            'z' => Token::Offset(run),
            'K' => Token::Kind,
            _ => {
                literal.push(c);
                i += 1;
                continue;
            }
        };

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(token);
        i += if c == 'K' { 1 } else { run };
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Locale-invariant free-form parse
pub fn parse_best_guess(input: &str) -> Result<DateTime<Utc>, TransformError> {
    let text = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc());
        }
    }

    Err(TransformError::format("not a recognizable date/time", input))
}

/// How `FormatDate` reads its input, with everything it needs to do so
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    BestGuess,
    Exact(DatePattern),
    FileTimeUtc,
}

impl DateInput {
    pub fn date_type(&self) -> DateType {
        match self {
            DateInput::BestGuess => DateType::BestGuess,
            DateInput::Exact(_) => DateType::DateTime,
            DateInput::FileTimeUtc => DateType::FileTimeUtc,
        }
    }

    /// The exact input pattern, if any
    pub fn from_format(&self) -> Option<&DatePattern> {
        match self {
            DateInput::Exact(pattern) => Some(pattern),
            _ => None,
        }
    }

    fn read(&self, text: &str) -> Result<DateTime<Utc>, TransformError> {
        match self {
            DateInput::BestGuess => parse_best_guess(text),
            DateInput::Exact(pattern) => pattern.parse_exact(text),
            DateInput::FileTimeUtc => file_time_to_datetime(parse_integer(text)?),
        }
    }
}

/// Reformat a date value; absent passes through
pub(super) fn format_date(
    value: Value,
    input: &DateInput,
    to_format: &DatePattern,
) -> Result<Value, TransformError> {
    let instant = match &value {
        Value::Absent => return Ok(value),
        Value::Scalar(Scalar::DateTime(dt)) => *dt,
        Value::Scalar(scalar) => input.read(&scalar.text())?,
        other => return Err(expect_single(other)),
    };
    Ok(Value::string(to_format.render(&instant)))
}
