//! The JSON body of the gateway requests.
//!
//! Fields are looked up leniently, e.g. a year can be sent both as `2024` and `"2024"`.
use std::convert::TryFrom;

use adapter::Credentials;
use primitives::Period;
use serde_json::{Map, Value};

use crate::response::ResponseError;

pub const CREDENTIALS: &[&str] = &["customerId", "apiKey", "secretKey"];
pub const MONTHLY_STATS: &[&str] = &["customerId", "apiKey", "secretKey", "year", "month"];
pub const MONTHLY_COMPARISON: &[&str] = &[
    "customerId",
    "apiKey",
    "secretKey",
    "year1",
    "month1",
    "year2",
    "month2",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody(Map<String, Value>);

impl RequestBody {
    /// An empty body is treated as an empty object.
    pub fn parse(bytes: &[u8]) -> Result<Self, ResponseError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => Ok(Self(fields)),
            Ok(_) => Err(ResponseError::BadRequest(
                "Request body should be a JSON object".to_string(),
            )),
            Err(err) => Err(ResponseError::BadRequest(format!(
                "Invalid JSON body: {err}"
            ))),
        }
    }

    /// Fails with all the `required` names if any of them is missing or empty.
    pub fn require(&self, required: &'static [&'static str]) -> Result<(), ResponseError> {
        let is_missing = |name: &&str| match self.0.get(*name) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => true,
            Some(Value::String(value)) => value.trim().is_empty(),
            Some(Value::Number(number)) => number.as_f64() == Some(0.0),
            Some(_) => false,
        };

        if required.iter().any(is_missing) {
            Err(ResponseError::MissingParameters(required))
        } else {
            Ok(())
        }
    }

    /// A non-empty string field.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// A non-empty string or a JSON number rendered in decimal, e.g. a numeric `customerId`.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.0.get(name) {
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => self.string(name).map(str::to_string),
        }
    }

    /// An integer field, either a JSON number or a numeric string.
    pub fn integer(&self, name: &str) -> Result<Option<i64>, ResponseError> {
        let invalid = || ResponseError::BadRequest(format!("'{name}' should be an integer"));

        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(_) | Value::String(_)) => match self.text(name) {
                Some(value) => value.parse().map(Some).map_err(|_| invalid()),
                None => Ok(None),
            },
            Some(_) => Err(invalid()),
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ResponseError> {
        let field = |name: &str| self.text(name).unwrap_or_default();

        Credentials::new(field("apiKey"), field("customerId"), field("secretKey"))
            .map_err(|_| ResponseError::MissingParameters(CREDENTIALS))
    }

    /// The calendar month of the `year` & `month` fields, `None` when both are absent.
    pub fn month(&self, year: &str, month: &str) -> Result<Option<Period>, ResponseError> {
        match (self.integer(year)?, self.integer(month)?) {
            (None, None) => Ok(None),
            (Some(year_value), Some(month_value)) => {
                let invalid = || {
                    ResponseError::BadRequest(format!(
                        "Invalid '{year}' ({year_value}) or '{month}' ({month_value})"
                    ))
                };
                let year_value = i32::try_from(year_value).map_err(|_| invalid())?;
                let month_value = u32::try_from(month_value).map_err(|_| invalid())?;

                Period::month(year_value, month_value)
                    .map(Some)
                    .map_err(|err| ResponseError::BadRequest(err.to_string()))
            }
            _ => Err(ResponseError::BadRequest(format!(
                "Both '{year}' and '{month}' are required for a period"
            ))),
        }
    }

    /// Like [`RequestBody::month`], for fields which were already required.
    pub fn required_month(&self, year: &str, month: &str) -> Result<Period, ResponseError> {
        self.month(year, month)?.ok_or_else(|| {
            ResponseError::BadRequest(format!("Both '{year}' and '{month}' are required"))
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> RequestBody {
        RequestBody::parse(value.to_string().as_bytes()).expect("Valid body")
    }

    #[test]
    fn parses_objects_only() {
        assert_eq!(RequestBody::default(), RequestBody::parse(b"").expect("Empty body"));
        assert!(matches!(
            RequestBody::parse(b"[1, 2]"),
            Err(ResponseError::BadRequest(_))
        ));
        assert!(matches!(
            RequestBody::parse(b"{\"customerId\":"),
            Err(ResponseError::BadRequest(_))
        ));
    }

    #[test]
    fn missing_or_empty_required_fields() {
        let complete = body(json!({
            "customerId": "1234567",
            "apiKey": "api-key",
            "secretKey": "secret",
            "year": 2024,
            "month": "1",
        }));
        assert!(complete.require(MONTHLY_STATS).is_ok());

        for incomplete in [
            json!({"apiKey": "api-key", "secretKey": "secret", "year": 2024, "month": 1}),
            json!({"customerId": "", "apiKey": "api-key", "secretKey": "secret", "year": 2024, "month": 1}),
            json!({"customerId": "1234567", "apiKey": null, "secretKey": "secret", "year": 2024, "month": 1}),
            json!({"customerId": "1234567", "apiKey": "api-key", "secretKey": "secret", "year": 2024, "month": 0}),
        ] {
            assert_eq!(
                Err(ResponseError::MissingParameters(MONTHLY_STATS)),
                body(incomplete).require(MONTHLY_STATS)
            );
        }
    }

    #[test]
    fn numeric_credentials() {
        let request = body(json!({
            "customerId": 1234567,
            "apiKey": "api-key",
            "secretKey": "secret",
        }));

        assert!(request.require(CREDENTIALS).is_ok());
        let credentials = request.credentials().expect("Numeric customer id");
        assert_eq!("1234567", credentials.customer_id());
        assert_eq!("api-key", credentials.api_key());
    }

    #[test]
    fn months() {
        let request = body(json!({"year": "2024", "month": 2, "year2": 2023}));

        assert_eq!(
            Some(Period::month(2024, 2).expect("Valid month")),
            request.month("year", "month").expect("Valid period")
        );
        assert_eq!(None, request.month("year1", "month1").expect("No period"));
        assert!(request.month("year2", "month2").is_err());

        let invalid = body(json!({"year": 2024, "month": 13}));
        assert!(matches!(
            invalid.required_month("year", "month"),
            Err(ResponseError::BadRequest(_))
        ));

        let not_a_number = body(json!({"year": "twenty", "month": 1}));
        assert!(not_a_number.month("year", "month").is_err());
    }
}
