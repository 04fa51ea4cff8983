use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

/// A timezone-less point in time with whole-second precision.
///
/// This is how the member store keeps `created_at` around, in
/// `YYYY-MM-DD HH:MM:SS` form. Anything finer than a second is
/// dropped when a value gets created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
  pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

  #[must_use]
  pub fn now() -> Self {
    Self::from_naive(Utc::now().naive_utc())
  }

  #[must_use]
  pub fn from_naive(value: NaiveDateTime) -> Self {
    Self(value.with_nanosecond(0).unwrap_or(value))
  }

  /// Parses the stored `YYYY-MM-DD HH:MM:SS` form.
  pub fn parse(input: &str) -> Result<Self, ParseError> {
    NaiveDateTime::parse_from_str(input, Self::FORMAT)
      .map(Self::from_naive)
      .map_err(ParseError)
  }

  /// Parses either the stored form or an RFC 3339 timestamp which
  /// gets converted to UTC.
  pub fn parse_lenient(input: &str) -> Result<Self, ParseError> {
    Self::parse(input).or_else(|_| {
      DateTime::parse_from_rfc3339(input)
        .map(|v| Self::from_naive(v.naive_utc()))
        .map_err(ParseError)
    })
  }
}

impl From<NaiveDateTime> for Timestamp {
  fn from(value: NaiveDateTime) -> Self {
    Self::from_naive(value)
  }
}

impl From<Timestamp> for NaiveDateTime {
  fn from(value: Timestamp) -> Self {
    value.0
  }
}

impl Display for Timestamp {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.0.format(Self::FORMAT).fmt(f)
  }
}

impl Deref for Timestamp {
  type Target = NaiveDateTime;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl FromStr for Timestamp {
  type Err = ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse_lenient(s)
  }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
      type Value = Timestamp;

      fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("`YYYY-MM-DD HH:MM:SS` or RFC 3339 timestamp")
      }

      fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
      where
        E: serde::de::Error,
      {
        Timestamp::parse_lenient(v).map_err(serde::de::Error::custom)
      }
    }

    deserializer.deserialize_str(Visitor)
  }
}

impl serde::Serialize for Timestamp {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.collect_str(self)
  }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ParseError(chrono::ParseError);
