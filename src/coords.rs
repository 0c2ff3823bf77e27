use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Physical (x, y, z) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xyz(pub [f64; 3]);

impl Xyz {
    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }
}

/// Parse a literal coordinate such as `(1, 2.5, -3e2)` or `[1, 2, 3]`.
///
/// Exactly three numeric components are accepted; a trailing comma is allowed.
pub fn parse_xyz(input: &str) -> Result<Xyz> {
    let fail = |reason: &str| Error::InvalidCoordinate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim();
    let inner = match (s.chars().next(), s.chars().last()) {
        (Some('('), Some(')')) | (Some('['), Some(']')) => &s[1..s.len() - 1],
        _ => return Err(fail("expected a parenthesized or bracketed triple")),
    };

    let mut parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    if parts.len() != 3 {
        return Err(fail(&format!("expected 3 components, found {}", parts.len())));
    }

    let mut out = [0.0f64; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        let v: f64 = part
            .replace('_', "")
            .parse()
            .map_err(|_| fail(&format!("not a number: {part:?}")))?;
        if !v.is_finite() {
            return Err(fail("non-finite component"));
        }
        *slot = v;
    }
    Ok(Xyz(out))
}
