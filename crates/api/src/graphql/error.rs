//! Service errors as GraphQL field errors.
//!
//! Validation failures keep their message. Store failures are reported to
//! Sentry and replaced by a generic message so no internals leak to clients.

use juniper::{FieldError, IntoFieldError, Object, ScalarValue, Value};

use crate::services::ServiceError;

/// `extensions.code` for rejected input.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// `extensions.code` for store failures.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

fn extensions<S: ScalarValue>(code: &str) -> Value<S> {
    let mut object = Object::with_capacity(1);
    object.add_field("code", Value::scalar(code.to_owned()));
    Value::Object(object)
}

impl<S: ScalarValue> IntoFieldError<S> for ServiceError {
    fn into_field_error(self) -> FieldError<S> {
        match self {
            Self::Validation(e) => FieldError::new(e, extensions(VALIDATION_ERROR)),
            Self::Repository(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(
                    error = %e,
                    sentry_event_id = %event_id,
                    "GraphQL resolver error"
                );
                FieldError::new("Internal server error", extensions(INTERNAL_ERROR))
            }
        }
    }
}
