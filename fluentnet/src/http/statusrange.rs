//! Allowed-status patterns.
//!
//! Grammar: `range (',' range)*` where a range is a single code (`404`),
//! an inclusive span (`400-404`), a wildcard whose `x`, `X` or `*`
//! positions match any digit (`4xx`, `4**`), or a lone `*`.

use crate::base::neterror::NetError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Range {
    Any,
    Exact(u16),
    Between(u16, u16),
    /// One entry per position, `None` matching any digit.
    Wildcard(Vec<Option<u8>>),
}

impl Range {
    fn matches(&self, status: u16) -> bool {
        match self {
            Range::Any => true,
            Range::Exact(code) => *code == status,
            Range::Between(min, max) => (*min..=*max).contains(&status),
            Range::Wildcard(positions) => {
                let digits = status.to_string();
                digits.len() == positions.len()
                    && digits
                        .bytes()
                        .zip(positions)
                        .all(|(d, p)| p.map_or(true, |want| want == d))
            }
        }
    }
}

/// A parsed allowed-status pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRange {
    pattern: String,
    ranges: Vec<Range>,
}

impl StatusRange {
    pub fn parse(pattern: &str) -> Result<Self, NetError> {
        let mut ranges = Vec::new();
        for token in pattern.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let range = parse_token(token).ok_or_else(|| NetError::InvalidStatusRange {
                pattern: pattern.to_string(),
                token: token.to_string(),
            })?;
            ranges.push(range);
        }
        Ok(Self {
            pattern: pattern.to_string(),
            ranges,
        })
    }

    /// A pattern allowing every status.
    pub fn any() -> Self {
        Self {
            pattern: "*".to_string(),
            ranges: vec![Range::Any],
        }
    }

    /// Whether the pattern allows `status`. An empty pattern allows nothing.
    pub fn matches(&self, status: u16) -> bool {
        self.ranges.iter().any(|r| r.matches(status))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

fn parse_token(token: &str) -> Option<Range> {
    if token == "*" {
        return Some(Range::Any);
    }

    if let Some((min, max)) = token.split_once('-') {
        let min = parse_code(min.trim())?;
        let max = parse_code(max.trim())?;
        return Some(Range::Between(min.min(max), min.max(max)));
    }

    if token.bytes().all(|b| b.is_ascii_digit()) {
        return parse_code(token).map(Range::Exact);
    }

    let positions = token
        .bytes()
        .map(|b| match b {
            b'0'..=b'9' => Some(Some(b)),
            b'x' | b'X' | b'*' => Some(None),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Range::Wildcard(positions))
}

fn parse_code(digits: &str) -> Option<u16> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for StatusRange {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusRange::parse(s)
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Whether `status` counts as success: below 400, or allowed by `allowed`.
pub fn is_success(status: u16, allowed: Option<&StatusRange>) -> bool {
    status < 400 || allowed.is_some_and(|r| r.matches(status))
}
