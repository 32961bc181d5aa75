use chrono::{
    format::{Item, StrftimeItems},
    DateTime, Utc,
};
use sea_kfmt_types::Record;
use std::io::Write;

use crate::{CompileErr, RenderErr};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Extracts one field of a record as bytes. The set of extractors is fixed;
/// each corresponds to one directive of the format language.
pub enum Extractor {
    /// `%s`, `%v`
    Value,
    /// `%S`, `%V`
    ValueLen,
    /// `%R`
    ValueLenBigEndian,
    /// `%k`
    Key,
    /// `%K`
    KeyLen,
    /// `%t`
    Topic,
    /// `%p`
    Partition,
    /// `%o`
    Offset,
    /// `%T`
    TimestampMillis,
    /// `%T{strftime...}`
    Strftime(TimeFormat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A strftime pattern, validated at compile time.
pub struct TimeFormat {
    pattern: String,
}

impl Extractor {
    /// Append the bytes of this field of `record` to `out`.
    pub fn extract<R: Record>(&self, record: &R, out: &mut Vec<u8>) -> Result<(), RenderErr> {
        match self {
            Self::Value => out.extend_from_slice(record.value().unwrap_or_default()),
            Self::ValueLen => write!(out, "{}", len_of(record.value()))?,
            Self::ValueLenBigEndian => {
                out.extend_from_slice(&(len_of(record.value()) as u64).to_be_bytes())
            }
            Self::Key => out.extend_from_slice(record.key().unwrap_or_default()),
            Self::KeyLen => write!(out, "{}", len_of(record.key()))?,
            Self::Topic => out.extend_from_slice(record.topic().as_bytes()),
            Self::Partition => write!(out, "{}", record.partition())?,
            Self::Offset => write!(out, "{}", record.offset())?,
            Self::TimestampMillis => write!(out, "{}", record.timestamp_millis())?,
            Self::Strftime(format) => format.format_millis(record.timestamp_millis(), out)?,
        }
        Ok(())
    }
}

fn len_of(bytes: Option<&[u8]>) -> usize {
    bytes.map(<[u8]>::len).unwrap_or(0)
}

impl TimeFormat {
    pub fn new<S: Into<String>>(pattern: S) -> Result<Self, CompileErr> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(CompileErr::InvalidTimeFormat(pattern));
        }
        let format = Self { pattern };
        // some items parse but can never be formatted, e.g. `%#z`
        if format.format(DateTime::<Utc>::default()).is_none() {
            return Err(CompileErr::InvalidTimeFormat(format.pattern));
        }
        Ok(format)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Format a timestamp, given in milliseconds since the Unix epoch, in UTC.
    pub fn format_millis(&self, millis: i64, out: &mut Vec<u8>) -> Result<(), RenderErr> {
        let time = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or(RenderErr::TimestampOutOfRange(millis))?;
        let text = self
            .format(time)
            .ok_or_else(|| RenderErr::TimeFormat(self.pattern.clone()))?;
        out.extend_from_slice(text.as_bytes());
        Ok(())
    }

    fn format(&self, time: DateTime<Utc>) -> Option<String> {
        use std::fmt::Write;

        let mut text = String::new();
        write!(text, "{}", time.format(&self.pattern)).ok()?;
        Some(text)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sea_kfmt_types::{OwnedRecord, StreamKey};
    use time::macros::datetime;

    fn record() -> OwnedRecord {
        OwnedRecord::new(&StreamKey::new("foo").unwrap(), 3, 42)
            .with_key("key")
            .with_value("hello")
            .with_timestamp(datetime!(2023-06-05 13:55:53.001 UTC))
    }

    fn extract(extractor: Extractor, record: &OwnedRecord) -> Vec<u8> {
        let mut out = Vec::new();
        extractor.extract(record, &mut out).unwrap();
        out
    }

    #[test]
    fn test_fields() {
        let record = record();
        assert_eq!(extract(Extractor::Value, &record), b"hello");
        assert_eq!(extract(Extractor::ValueLen, &record), b"5");
        assert_eq!(
            extract(Extractor::ValueLenBigEndian, &record),
            [0, 0, 0, 0, 0, 0, 0, 5]
        );
        assert_eq!(extract(Extractor::Key, &record), b"key");
        assert_eq!(extract(Extractor::KeyLen, &record), b"3");
        assert_eq!(extract(Extractor::Topic, &record), b"foo");
        assert_eq!(extract(Extractor::Partition, &record), b"3");
        assert_eq!(extract(Extractor::Offset, &record), b"42");
        assert_eq!(extract(Extractor::TimestampMillis, &record), b"1685973353001");
    }

    #[test]
    fn test_absent_key_value() {
        let record = OwnedRecord::new(&StreamKey::new("foo").unwrap(), 0, 0);
        assert_eq!(extract(Extractor::Value, &record), b"");
        assert_eq!(extract(Extractor::ValueLen, &record), b"0");
        assert_eq!(extract(Extractor::KeyLen, &record), b"0");
        assert_eq!(extract(Extractor::ValueLenBigEndian, &record), [0; 8]);
    }

    #[test]
    fn test_strftime() {
        let record = record();
        let format = TimeFormat::new("%Y-%m-%d %H:%M:%S%.3f").unwrap();
        assert_eq!(
            extract(Extractor::Strftime(format), &record),
            b"2023-06-05 13:55:53.001"
        );
        assert_eq!(
            TimeFormat::new("%Q"),
            Err(CompileErr::InvalidTimeFormat("%Q".to_owned()))
        );
    }

    #[test]
    fn test_parse_only_items() {
        // `%#z` is accepted by the strftime parser, but cannot be formatted
        assert_eq!(
            TimeFormat::new("%#z"),
            Err(CompileErr::InvalidTimeFormat("%#z".to_owned()))
        );
        assert_eq!(
            TimeFormat::new("at %H:%M %#z"),
            Err(CompileErr::InvalidTimeFormat("at %H:%M %#z".to_owned()))
        );
        assert!(TimeFormat::new("%z").is_ok());
    }

    #[test]
    fn test_format_into_buffer() {
        let format = TimeFormat::new("%H:%M").unwrap();
        let mut out = b"at ".to_vec();
        format.format_millis(1685973353001, &mut out).unwrap();
        assert_eq!(out, b"at 13:55");
        assert!(matches!(
            format.format_millis(i64::MAX, &mut out),
            Err(RenderErr::TimestampOutOfRange(i64::MAX))
        ));
    }
}
