use std::sync::LazyLock;

use regex::Regex;

static POWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s*(?:\^|\*\*)\s*([0-9]+)$").unwrap());
static SUPERSCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([⁰¹²³⁴⁵⁶⁷⁸⁹]+)$").unwrap());

/// Group separators seen between thousands in the corpus.
const SEPARATORS: &[char] = &[' ', '\u{a0}', '\u{2009}', '\u{202f}', ',', '.', '\''];
const SUPERSCRIPTS: &[char] = &['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Outcome of reading one table cell as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number(u128),
    NotANumber,
}

impl Token {
    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(_))
    }
}

impl From<Option<u128>> for Token {
    fn from(value: Option<u128>) -> Self {
        value.map_or(Token::NotANumber, Token::Number)
    }
}

/// Reads a single cell as a number. "Not a number" is an ordinary answer,
/// not a failure: most cells in a numeral page are prose.
pub trait NumberParser {
    fn try_parse(&self, token: &str) -> Token;
}

/// Default grammar: digit runs, grouped thousands and powers of a base.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumeralParser;

impl NumberParser for NumeralParser {
    fn try_parse(&self, token: &str) -> Token {
        let token = token.trim();
        let token = match token.strip_suffix(['.', ':', ')']) {
            Some(rest) if !rest.is_empty() => rest.trim_end(),
            _ => token,
        };
        if token.is_empty() {
            return Token::NotANumber;
        }

        parse_digits(token)
            .or_else(|| parse_grouped(token))
            .or_else(|| parse_power(token))
            .or_else(|| parse_superscript_power(token))
            .into()
    }
}

fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        // full-width digits
        '\u{ff10}'..='\u{ff19}' => Some(c as u32 - 0xff10),
        _ => None,
    }
}

fn parse_digits(s: &str) -> Option<u128> {
    if s.is_empty() {
        return None;
    }
    s.chars().try_fold(0u128, |acc, c| {
        let d = digit_value(c)?;
        acc.checked_mul(10)?.checked_add(d as u128)
    })
}

/// `1 000`, `10,000`, `1.000.000`: one separator used throughout, every
/// group after the first exactly three digits long.
fn parse_grouped(s: &str) -> Option<u128> {
    let sep = s.chars().find(|c| digit_value(*c).is_none())?;
    if !SEPARATORS.contains(&sep) {
        return None;
    }

    let mut groups = s.split(sep);
    let head = groups.next()?;
    if head.is_empty() || head.chars().count() > 3 {
        return None;
    }

    let mut digits = head.to_string();
    for group in groups {
        if group.chars().count() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    parse_digits(&digits)
}

fn parse_power(s: &str) -> Option<u128> {
    let caps = POWER_RE.captures(s)?;
    let base: u128 = caps[1].parse().ok()?;
    let exp: u32 = caps[2].parse().ok()?;
    base.checked_pow(exp)
}

fn parse_superscript_power(s: &str) -> Option<u128> {
    let caps = SUPERSCRIPT_RE.captures(s)?;
    let base: u128 = caps[1].parse().ok()?;
    let exp = caps[2].chars().try_fold(0u32, |acc, c| {
        let d = SUPERSCRIPTS.iter().position(|s| *s == c)? as u32;
        acc.checked_mul(10)?.checked_add(d)
    })?;
    base.checked_pow(exp)
}
