//! Boundary adapter for backend response bodies.
//!
//! The backend answers list endpoints either with a bare JSON array or with a
//! `{success, data, message}` envelope whose `data` may itself be a list or a single
//! object. Everything past this module sees a plain `Vec<T>`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("backend reported failure: {0}")]
    Rejected(String),
    #[error("unrecognised response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: Option<bool>,
    data: Option<Payload<T>>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Many(Vec<T>),
    One(T),
}

/// Decode a list response of either shape.
pub fn decode_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, EnvelopeError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    list_from_value(value)
}

/// An object is an envelope only when it carries `success` or `data`; any other object
/// is decoded as a single item.
pub fn list_from_value<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<Vec<T>, EnvelopeError> {
    let is_envelope = value
        .as_object()
        .is_some_and(|object| object.contains_key("success") || object.contains_key("data"));

    if !is_envelope {
        return Ok(match serde_json::from_value::<Payload<T>>(value)? {
            Payload::Many(items) => items,
            Payload::One(item) => vec![item],
        });
    }

    let envelope: Envelope<T> = serde_json::from_value(value)?;
    if envelope.success == Some(false) {
        return Err(EnvelopeError::Rejected(
            envelope.message.unwrap_or_else(|| "no message".to_string()),
        ));
    }
    Ok(match envelope.data {
        Some(Payload::Many(items)) => items,
        Some(Payload::One(item)) => vec![item],
        None => Vec::new(),
    })
}

pub(crate) mod lenient {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use std::fmt;
    use std::str::FromStr;

    /// Accepts a JSON number, a numeric string, an empty string, or null.
    pub(crate) fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: fmt::Display,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<N> {
            Value(N),
            Text(String),
        }

        match Option::<Raw<T>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Value(value)) => Ok(Some(value)),
            Some(Raw::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<T>().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ClassSubject, StudentRecord};

    #[test]
    fn bare_arrays_pass_through() {
        let subjects: Vec<ClassSubject> =
            decode_list(br#"[{"subjectName":"Maths","code":"M1"},{"subjectName":"Science"}]"#)
                .expect("bare list");
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[1].code, None);
    }

    #[test]
    fn envelopes_unwrap_data() {
        let students: Vec<StudentRecord> = decode_list(
            br#"{"success":true,"message":"ok","data":[{"studentId":"3","name":"Ravi","email":"ravi@school.test","className":"Class 3","rollNo":"3A01","dob":"01/02/2012"}]}"#,
        )
        .expect("envelope list");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].student_id, Some(3));
    }

    #[test]
    fn single_object_payloads_become_one_item() {
        let subjects: Vec<ClassSubject> =
            decode_list(br#"{"success":true,"data":{"subjectName":"English"}}"#)
                .expect("single payload");
        assert_eq!(subjects, vec![ClassSubject::named("English")]);
    }

    #[test]
    fn missing_data_is_an_empty_list() {
        let subjects: Vec<ClassSubject> =
            decode_list(br#"{"success":true}"#).expect("empty envelope");
        assert!(subjects.is_empty());
    }

    #[test]
    fn failed_envelopes_surface_the_message() {
        let err = decode_list::<ClassSubject>(br#"{"success":false,"message":"no such class"}"#)
            .expect_err("failure envelope");
        match err {
            EnvelopeError::Rejected(message) => assert_eq!(message, "no such class"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn bare_objects_are_single_items_not_empty_envelopes() {
        let subjects: Vec<ClassSubject> =
            decode_list(br#"{"subjectName":"Maths"}"#).expect("bare object");
        assert_eq!(subjects, vec![ClassSubject::named("Maths")]);

        assert!(matches!(
            decode_list::<ClassSubject>(br#"{"unexpected":true}"#),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn envelope_data_with_a_bad_item_is_malformed() {
        assert!(matches!(
            decode_list::<StudentRecord>(br#"{"success":true,"data":[{"name":"Ravi"}]}"#),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_list::<ClassSubject>(b"not json"),
            Err(EnvelopeError::Malformed(_))
        ));
        assert!(matches!(
            decode_list::<ClassSubject>(b"42"),
            Err(EnvelopeError::Malformed(_))
        ));
    }
}
