//! Field deserializers that accept numbers and numeric text interchangeably.
//!
//! Stored documents may carry whole numbers as doubles, and clients send
//! phone numbers and capacities either as JSON numbers or as strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    fn into_whole<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            NumberOrText::Int(value) => Ok(value),
            NumberOrText::Float(value)
                if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 =>
            {
                Ok(value as i64)
            }
            NumberOrText::Float(value) => {
                Err(E::custom(format!("expected a whole number, got {value}")))
            }
            NumberOrText::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("expected a whole number, got {text:?}"))),
        }
    }

    fn into_text(self) -> String {
        match self {
            NumberOrText::Int(value) => value.to_string(),
            NumberOrText::Float(value) if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 => {
                (value as i64).to_string()
            }
            NumberOrText::Float(value) => value.to_string(),
            NumberOrText::Text(text) => text,
        }
    }
}

fn narrow<T, E>(value: i64) -> Result<T, E>
where
    T: TryFrom<i64>,
    E: serde::de::Error,
{
    T::try_from(value).map_err(|_| E::custom(format!("{value} is out of range")))
}

pub fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = NumberOrText::deserialize(deserializer)?.into_whole::<D::Error>()?;
    narrow::<T, D::Error>(value)
}

pub fn optional_whole_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(raw) => {
            let value = raw.into_whole::<D::Error>()?;
            narrow::<T, D::Error>(value).map(Some)
        }
        None => Ok(None),
    }
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.map(NumberOrText::into_text))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "super::optional_whole_number")]
        capacity: Option<u32>,
        #[serde(default, deserialize_with = "super::optional_text")]
        contact: Option<String>,
    }

    fn parse(value: serde_json::Value) -> Result<Sample, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn numbers_and_numeric_text_are_interchangeable() {
        let sample = parse(json!({ "capacity": "6", "contact": 9845098450i64 })).unwrap();
        assert_eq!(sample.capacity, Some(6));
        assert_eq!(sample.contact.as_deref(), Some("9845098450"));

        let sample = parse(json!({ "capacity": 4.0, "contact": "98450 98450" })).unwrap();
        assert_eq!(sample.capacity, Some(4));
        assert_eq!(sample.contact.as_deref(), Some("98450 98450"));
    }

    #[test]
    fn absent_and_null_stay_none() {
        let sample = parse(json!({ "capacity": null })).unwrap();
        assert!(sample.capacity.is_none());
        assert!(sample.contact.is_none());
    }

    #[test]
    fn fractional_or_negative_capacity_is_rejected() {
        assert!(parse(json!({ "capacity": 2.5 })).is_err());
        assert!(parse(json!({ "capacity": -3 })).is_err());
        assert!(parse(json!({ "capacity": "four" })).is_err());
    }
}
