use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Parse a backend timestamp.
///
/// RFC 3339 is tried first.  The backend's `isoformat()` output carries no offset, so a bare
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` is read as UTC.
pub fn parse(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    if let Ok(datetime) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(datetime);
    }
    let naive = PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    )?;
    Ok(naive.assume_utc())
}

/// Format the time of day as `HH:MM` in the given offset.
pub fn time_of_day(datetime: OffsetDateTime, offset: UtcOffset) -> String {
    let local = datetime.to_offset(offset);
    format!("{:02}:{:02}", local.hour(), local.minute())
}

/// The local UTC offset, or UTC when the platform cannot determine it.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Deserialize a backend timestamp into an OffsetDateTime
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// Serialize an OffsetDateTime into an RFC 3339 formatted string
pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = datetime
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

/// The same as the parent module, for `Option<OffsetDateTime>` fields.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    /// Deserialize an optional backend timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => super::parse(&s).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }

    /// Serialize an optional timestamp as RFC 3339 or null.
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(datetime) => super::serialize(datetime, serializer),
            None => serializer.serialize_none(),
        }
    }
}
