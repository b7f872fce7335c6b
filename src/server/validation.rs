//! Path and body parameter checks for the public routes.
//!
//! All violations of a request are collected and returned together as a
//! `400 Bad Request` with a JSON error list.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::ops::RangeInclusive;

pub const MOVIE_ID_RANGE: RangeInclusive<i64> = 1..=9_999_999;
pub const COMMENT_ID_RANGE: RangeInclusive<i64> = 1..=9_999_999_999;
pub const NUMBER_RANGE: RangeInclusive<i64> = 1..=1000;
pub const OFFSET_RANGE: RangeInclusive<i64> = 0..=9_999_999;
pub const USER_ID_LENGTH: RangeInclusive<usize> = 28..=35;
pub const COMMENT_TEXT_LENGTH: RangeInclusive<usize> = 1..=1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Params,
    Body,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub value: String,
    pub msg: String,
    pub param: &'static str,
    pub location: Location,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(param: &'static str, value: String, msg: String, location: Location) -> Self {
        Self {
            errors: vec![FieldError {
                value,
                msg,
                param,
                location,
            }],
        }
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Accumulates parameter errors. Checks return a usable default on failure
/// so a handler can run every check before bailing out with [`Validator::finish`].
#[derive(Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn reject(&mut self, param: &'static str, value: &str, msg: String, location: Location) {
        self.errors.push(FieldError {
            value: value.to_string(),
            msg,
            param,
            location,
        });
    }

    /// Integer path parameter within `range`.
    pub fn int_param(&mut self, param: &'static str, value: &str, range: RangeInclusive<i64>) -> i64 {
        match value.parse::<i64>() {
            Ok(n) if range.contains(&n) => n,
            _ => {
                self.reject(
                    param,
                    value,
                    format!(
                        "Must be an integer between {} and {}",
                        range.start(),
                        range.end()
                    ),
                    Location::Params,
                );
                *range.start()
            }
        }
    }

    /// Integer already decoded from a JSON body.
    pub fn int_value(&mut self, param: &'static str, value: i64, range: RangeInclusive<i64>) {
        if !range.contains(&value) {
            self.reject(
                param,
                &value.to_string(),
                format!(
                    "Must be an integer between {} and {}",
                    range.start(),
                    range.end()
                ),
                Location::Body,
            );
        }
    }

    /// Same as [`Self::int_param`] for parameters used as counts.
    pub fn count_param(
        &mut self,
        param: &'static str,
        value: &str,
        range: RangeInclusive<i64>,
    ) -> usize {
        self.int_param(param, value, range) as usize
    }

    /// `"0"` or `"1"`.
    pub fn flag_param(&mut self, param: &'static str, value: &str) -> bool {
        match value {
            "1" => true,
            "0" => false,
            _ => {
                self.reject(param, value, "Must be 0 or 1".to_string(), Location::Params);
                false
            }
        }
    }

    pub fn length(
        &mut self,
        param: &'static str,
        value: &str,
        range: RangeInclusive<usize>,
        location: Location,
    ) {
        if !range.contains(&value.chars().count()) {
            self.reject(
                param,
                value,
                format!(
                    "Length must be between {} and {} characters",
                    range.start(),
                    range.end()
                ),
                location,
            );
        }
    }

    /// Parse a path parameter with its `FromStr` impl.
    pub fn parsed_param<T: std::str::FromStr>(&mut self, param: &'static str, value: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.reject(param, value, e.to_string(), Location::Params);
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}
