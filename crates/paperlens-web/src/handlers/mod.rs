//! HTTP handlers for all web routes.

pub mod system;
pub mod search;
pub mod papers;
pub mod qa;
pub mod future_works;
pub mod pages;

use axum::extract::{FromRequest, FromRequestParts};
use paperlens_common::ApiError;

/// `axum::Json` whose rejections answer with a `{"detail"}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejections answer with a `{"detail"}` body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Reject `value` outside `range` with a 422 naming the field.
pub(crate) fn check_range<T>(field: &str, value: T, range: std::ops::RangeInclusive<T>) -> Result<(), ApiError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}
