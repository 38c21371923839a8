//! Serde helpers encoding a `Duration` as integer milliseconds (feature-gated).

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub(crate) fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let millis = u64::try_from(d.as_millis()).map_err(serde::ser::Error::custom)?;
    serializer.serialize_u64(millis)
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Wrapper {
        #[serde(with = "crate::millis")]
        delay: Duration,
    }

    #[test]
    fn test_serialize() {
        let wrapper = Wrapper {
            delay: Duration::from_millis(2500),
        };
        assert_eq!(serde_json::to_string(&wrapper).unwrap(), r#"{"delay":2500}"#);
    }

    #[test]
    fn test_deserialize() {
        let wrapper: Wrapper = serde_json::from_str(r#"{"delay":40}"#).unwrap();
        assert_eq!(wrapper.delay, Duration::from_millis(40));
    }

    #[test]
    fn test_reject_negative() {
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"delay":-1}"#);
        assert!(result.is_err());
    }
}
