use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;
use validator::ValidationErrors;

use crate::models::response::ErrorResponse;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotFound(String),
    Validation(String),
    BadRequest(String),
    DatabaseError(sqlx::Error),
    InternalServerError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Validation(msg) | Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::DatabaseError(_) | Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Generic server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        error!("Migration error: {:?}", err);
        Self::InternalServerError
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        // Flatten into "field: message" pairs using the JSON field names,
        // nested structs as "parent.field".
        let mut messages = Vec::new();
        collect_messages(&errors, None, &mut messages);
        messages.sort();
        Self::Validation(format!("Validation failed: {}", messages.join(", ")))
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

fn collect_messages(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let field = json_field_name(field);
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field,
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(format!("{path}: {msg}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(inner, Some(&format!("{path}[{idx}]")), out);
                }
            }
        }
    }
}

/// `read_time` -> `readTime`, the casing the request bodies use.
fn json_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            name.push(ch);
        }
    }
    name
}
