//! Serde helpers for HTML form fields.
//!
//! Browsers submit an unselected `<select>` or blank input as an empty
//! string, which should mean "absent" rather than a parse failure.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        slot: Option<Uuid>,
    }

    #[test]
    fn test_empty_values_become_none() {
        let form: Form = serde_json::from_str(r#"{"slot":"  "}"#).unwrap();
        assert!(form.slot.is_none());
    }

    #[test]
    fn test_missing_values_become_none() {
        let form: Form = serde_json::from_str("{}").unwrap();
        assert!(form.slot.is_none());
    }

    #[test]
    fn test_present_uuid_parses() {
        let form: Form =
            serde_json::from_str(r#"{"slot":"12345678-1234-1234-1234-123456789abc"}"#).unwrap();
        assert_eq!(
            form.slot,
            Some(Uuid::from_u128(0x12345678_1234_1234_1234_123456789abc))
        );
    }

    #[test]
    fn test_invalid_uuid_is_rejected() {
        let result: Result<Form, _> = serde_json::from_str(r#"{"slot":"not-a-uuid"}"#);
        assert!(result.is_err());
    }
}
