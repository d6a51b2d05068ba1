//! Validated JSON extractor - Combines deserialization with validation.

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::{AppError, FieldError};

/// Validated JSON extractor that automatically validates requests.
///
/// Rejections become a 400 with one `{field, message}` entry per failed
/// rule; field names are reported in camelCase as the client sent them.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use agriproxy::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct DeleteAccountRequest {
///     #[validate(length(min = 1, message = "Password is required to delete account"))]
///     password: String,
/// }
///
/// async fn delete_account(ValidatedJson(payload): ValidatedJson<DeleteAccountRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation("body", e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validator errors into `{field, message}` pairs, sorted by field.
///
/// Struct-level (`__all__`) errors use their error code as the field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = BTreeMap::<String, Vec<String>>::new();
    collect(errors, "", &mut out);

    out.into_iter()
        .flat_map(|(field, messages)| {
            messages
                .into_iter()
                .map(move |message| FieldError::new(field.clone(), message))
        })
        .collect()
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let name = camel_case(field);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let field = if *field == "__all__" {
                        e.code.to_string()
                    } else {
                        path.clone()
                    };
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    out.entry(field).or_default().push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
