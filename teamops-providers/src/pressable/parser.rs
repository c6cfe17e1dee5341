//! Pressable response parsing.
//!
//! Successful responses use a `{ "message": ..., "data": ... }` envelope.
//! Error responses carry their reason in `message`, `error` or `errors`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use teamops_core::{Collaborator, SftpUser, Site};
use teamops_fetch::codec;

use super::error::PressableError;

/// Extracts a human-readable error message from a response body.
pub fn error_message(body: Option<&Value>) -> Option<String> {
    let body = body?;

    if let Some(text) = body.as_str().filter(|s| !s.is_empty()) {
        return Some(text.to_string());
    }

    for key in ["message", "error", "error_description", "errors"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) if !items.is_empty() => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                return Some(parts.join("; "));
            }
            Some(obj @ Value::Object(map)) if !map.is_empty() => return Some(obj.to_string()),
            _ => {}
        }
    }

    None
}

/// Takes the `data` member of an envelope.
fn take_data(mut body: Value) -> Result<Value, PressableError> {
    match body.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(PressableError::InvalidResponse(
            "response has no data field".to_string(),
        )),
    }
}

/// Decodes the `data` member of an envelope into a typed value.
pub fn data<T: DeserializeOwned>(body: Value) -> Result<T, PressableError> {
    Ok(codec::decode(take_data(body)?)?)
}

/// Parses `GET sites/{id}`.
pub fn parse_site(body: Value) -> Result<Site, PressableError> {
    data(body)
}

/// Parses `GET sites/{id}/ftp`. A null `data` means no users.
pub fn parse_sftp_users(body: Value) -> Result<Vec<SftpUser>, PressableError> {
    match take_data(body)? {
        Value::Null => Ok(Vec::new()),
        other => Ok(codec::decode(other)?),
    }
}

/// Parses `POST collaborators/batch_create`.
///
/// `data` may be a list of collaborators, a single one, or absent.
pub fn parse_created_collaborators(body: Value) -> Result<Vec<Collaborator>, PressableError> {
    match body.get("data").cloned().unwrap_or(Value::Null) {
        Value::Null => Ok(Vec::new()),
        list @ Value::Array(_) => Ok(codec::decode(list)?),
        single @ Value::Object(_) => Ok(vec![codec::decode(single)?]),
        other => Err(PressableError::InvalidResponse(format!(
            "unexpected collaborator payload: {other}"
        ))),
    }
}

/// Parses `POST sites/{id}/ftp/password/{username}`.
///
/// The new password is either the `data` string itself or its `password`
/// member.
pub fn parse_password(body: Value) -> Result<String, PressableError> {
    let password = match take_data(body)? {
        Value::String(s) => Some(s),
        Value::Object(mut map) => match map.remove("password") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    };

    password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| PressableError::InvalidResponse("no password in reset response".into()))
}
