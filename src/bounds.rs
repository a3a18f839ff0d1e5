//! Validation of user-entered display bounds.

use std::fmt;
use std::num::IntErrorKind;

use thiserror::Error;

use crate::fit::Bounds;
use crate::screen::ScreenInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Width,
    Height,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Width => f.write_str("Max width"),
            Field::Height => f.write_str("Max height"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("{field} must be a whole number")]
    NotANumber { field: Field },

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: Field, value: String },

    #[error("Screen size is unknown ({ceiling}), bounds cannot be applied")]
    NoScreenSize { ceiling: String },
}

/// A value lowered to the screen size. `requested` is the text as entered,
/// since it may not fit any integer type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clamp {
    pub field: Field,
    pub requested: String,
    pub applied: u32,
}

impl fmt::Display for Clamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} can be at most {} on this screen ({} requested)",
            self.field, self.applied, self.requested
        )
    }
}

/// Accepted bounds plus the clamp warnings to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsUpdate {
    pub bounds: Bounds,
    pub clamped: Vec<Clamp>,
}

/// Parses and checks both fields before accepting either of them.
pub fn validate_bounds(
    width_text: &str,
    height_text: &str,
    ceiling: ScreenInfo,
) -> Result<BoundsUpdate, BoundsError> {
    let width = parse_field(Field::Width, width_text)?;
    let height = parse_field(Field::Height, height_text)?;

    let mut clamped = Vec::new();
    let width = clamp_field(Field::Width, width_text, width, ceiling.width, &mut clamped);
    let height = clamp_field(Field::Height, height_text, height, ceiling.height, &mut clamped);

    let bounds = Bounds::new(width, height).ok_or_else(|| BoundsError::NoScreenSize {
        ceiling: format!("{}x{}", ceiling.width, ceiling.height),
    })?;

    Ok(BoundsUpdate { bounds, clamped })
}

/// Returns the positive value of `text`. Digits past the integer range are
/// larger than any screen, so they saturate instead of failing.
fn parse_field(field: Field, text: &str) -> Result<u64, BoundsError> {
    let text = text.trim();
    let value = match text.parse::<i64>() {
        Ok(value) => value,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => return Ok(u64::MAX),
        Err(err) if *err.kind() == IntErrorKind::NegOverflow => {
            return Err(BoundsError::NotPositive {
                field,
                value: text.to_string(),
            });
        }
        Err(_) => return Err(BoundsError::NotANumber { field }),
    };

    if value <= 0 {
        return Err(BoundsError::NotPositive {
            field,
            value: value.to_string(),
        });
    }
    Ok(value.unsigned_abs())
}

fn clamp_field(field: Field, text: &str, value: u64, ceiling: u32, clamped: &mut Vec<Clamp>) -> u32 {
    match u32::try_from(value) {
        Ok(value) if value <= ceiling => value,
        _ => {
            clamped.push(Clamp {
                field,
                requested: text.trim().to_string(),
                applied: ceiling,
            });
            ceiling
        }
    }
}
