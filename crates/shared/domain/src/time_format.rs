//! Serde helpers accepting `HH:MM` as well as `HH:MM:SS` times.

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer};

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_time(&s).ok_or_else(|| de::Error::custom(format!("invalid time `{s}`, expected HH:MM")))
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => parse_time(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time `{s}`, expected HH:MM"))),
            None => Ok(None),
        }
    }
}
