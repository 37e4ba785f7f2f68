//! Request handlers, grouped by surface.

pub mod accounts;
pub mod admin;
pub mod products;
pub mod support;

use std::str::FromStr;

use domains::AppError;

use crate::error::{ApiError, ApiResult};

/// Parses an optional query-string value into one of the domain enums,
/// surfacing the enum's own validation message on garbage input.
pub(crate) fn parse_opt<T>(value: Option<&String>) -> ApiResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .map(|raw| raw.parse::<T>())
        .transpose()
        .map_err(ApiError)
}
