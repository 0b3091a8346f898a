// ABOUTME: Field validation for survey ratings, landscape phrases, and free text
// ABOUTME: Every check returns a 400-class AppError naming the offending field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Input validation shared by all stage submissions.
//!
//! Ratings arrive as raw JSON values so that a string, a float, or a missing
//! field is reported as a validation failure instead of a body rejection.

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use serde_json::{json, Value};
use std::ops::RangeInclusive;

/// Validate a required integer rating within `range`
///
/// # Errors
///
/// Returns an error if the value is absent, null, not an integer, or outside `range`
pub fn rating(field: &str, value: Option<&Value>, range: &RangeInclusive<u8>) -> AppResult<u8> {
    match value {
        None | Some(Value::Null) => {
            Err(AppError::missing_field(field).with_details(json!({ "field": field })))
        }
        Some(value) => parse_rating(field, value, range),
    }
}

/// Validate an optional integer rating within `range`; null and absent both yield `None`
///
/// # Errors
///
/// Returns an error if a value is present but not an integer within `range`
pub fn optional_rating(
    field: &str,
    value: Option<&Value>,
    range: &RangeInclusive<u8>,
) -> AppResult<Option<u8>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_rating(field, value, range).map(Some),
    }
}

fn parse_rating(field: &str, value: &Value, range: &RangeInclusive<u8>) -> AppResult<u8> {
    let out_of_range = || {
        AppError::out_of_range(format!(
            "{field} must be an integer between {} and {}",
            range.start(),
            range.end()
        ))
        .with_details(json!({ "field": field, "received": value }))
    };

    let number = value.as_i64().ok_or_else(out_of_range)?;
    u8::try_from(number)
        .ok()
        .filter(|n| range.contains(n))
        .ok_or_else(out_of_range)
}

/// Require text that is non-empty after trimming; the original text is returned untouched
///
/// # Errors
///
/// Returns an error if the text is absent or blank
pub fn required_text(field: &str, value: Option<&str>) -> AppResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.to_owned()),
        _ => Err(AppError::missing_field(field).with_details(json!({ "field": field }))),
    }
}

/// Normalize an optional override: blank text becomes `None`
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned)
}

/// Validate a situation description: non-blank and at most the configured character count
///
/// # Errors
///
/// Returns an error if the description is blank or too long
pub fn situation(value: Option<&str>) -> AppResult<String> {
    let text = required_text("situationDescription", value)?;
    let length = text.chars().count();
    if length > limits::SITUATION_MAX_CHARS {
        return Err(AppError::out_of_range(format!(
            "situationDescription must be at most {} characters",
            limits::SITUATION_MAX_CHARS
        ))
        .with_details(json!({ "field": "situationDescription", "length": length })));
    }
    Ok(text)
}

/// Validate the post-survey reflection; the length is counted after trimming
/// but the original text is returned untouched
///
/// # Errors
///
/// Returns an error if fewer than the minimum characters remain after trimming
pub fn open_response(value: Option<&str>) -> AppResult<String> {
    let text = value.unwrap_or_default();
    if text.trim().chars().count() < limits::OPEN_RESPONSE_MIN_CHARS {
        return Err(AppError::invalid_input(format!(
            "openResponse must be at least {} characters",
            limits::OPEN_RESPONSE_MIN_CHARS
        ))
        .with_details(json!({ "field": "openResponse" })));
    }
    Ok(text.to_owned())
}

/// Validate a client-supplied interaction tag against `[a-z0-9_]{1,50}`
///
/// # Errors
///
/// Returns an error if the tag is empty, too long, or contains other characters
pub fn interaction_type(tag: &str) -> AppResult<()> {
    let well_formed = !tag.is_empty()
        && tag.len() <= limits::INTERACTION_TYPE_MAX_LEN
        && tag
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');

    if well_formed {
        Ok(())
    } else {
        Err(AppError::invalid_input(
            "interactionType must be 1-50 characters of a-z, 0-9 or underscore",
        )
        .with_details(json!({ "field": "interactionType", "received": tag })))
    }
}
