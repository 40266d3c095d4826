//! Request extractors whose rejections answer with the standard error body
//! instead of axum's plain-text responses.

use axum::extract::{
    FromRequest, FromRequestParts,
    path::ErrorKind,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};
use tracing::debug;

use super::app_error::AppError;
use crate::domain::errors::OrderError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        debug!("Rejected JSON body: {}", text);

        let detail = after(&text, "target type: ");
        let field = match rejection {
            JsonRejection::JsonDataError(_) => serde_field(detail),
            _ => None,
        };
        OrderError::validation(field.unwrap_or_else(|| "body".into()), detail).into()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let field = match &rejection {
            PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
                ErrorKind::ParseErrorAtKey { key, .. }
                | ErrorKind::InvalidUtf8InPathParam { key } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        };
        let text = rejection.body_text();
        debug!("Rejected path: {}", text);

        OrderError::validation(
            field.unwrap_or_else(|| "path".into()),
            after(&text, "Invalid URL: "),
        )
        .into()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        debug!("Rejected query string: {}", text);

        let detail = after(&text, "query string: ");
        let field = serde_field(detail).unwrap_or_else(|| "query".into());
        OrderError::validation(field, detail).into()
    }
}

fn after<'a>(text: &'a str, marker: &str) -> &'a str {
    text.split_once(marker).map_or(text, |(_, rest)| rest)
}

/// The offending field of a serde error like
/// ``items[0]: missing field `quantity` at line 1 column 30``.
fn serde_field(detail: &str) -> Option<String> {
    let (path, message) = match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(' ') => (Some(path), message),
        _ => (None, detail),
    };
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field);

    match (path, missing) {
        (Some(path), Some(field)) => Some(format!("{path}.{field}")),
        (Some(path), None) => Some(path.to_string()),
        (None, Some(field)) => Some(field.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_nested_field_names_the_item() {
        assert_eq!(
            serde_field("items[0]: missing field `quantity` at line 1 column 30").as_deref(),
            Some("items[0].quantity")
        );
    }

    #[test]
    fn test_missing_top_level_field() {
        assert_eq!(
            serde_field("missing field `status` at line 1 column 2").as_deref(),
            Some("status")
        );
    }

    #[test]
    fn test_invalid_value_names_its_path() {
        assert_eq!(
            serde_field("estimated_completion_time: input contains invalid characters at line 1 column 50")
                .as_deref(),
            Some("estimated_completion_time")
        );
        assert_eq!(serde_field("expected value at line 1 column 1"), None);
    }
}
