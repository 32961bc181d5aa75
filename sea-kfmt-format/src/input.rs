//! Reading records out of a byte stream, with the same format language used for rendering.
//!
//! ```ignore
//! %k %v   key, value (also %s)
//! %t      topic
//! %p      partition, decimal
//! %K %V   length of the following %k / %v, decimal (also %S)
//! %R      length of the following %v, 8 bytes big endian
//! ```
//!
//! A field without a known length extends up to the literal that follows it. If it is the
//! last item of the format, it extends to the end of input.
use std::{
    io::{BufRead, Read},
    str::FromStr,
};

use crate::{compile, CompileErr, Extractor, ReadErr, Segment};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// A record parsed from input, to be produced. Unset fields are left to the producer.
pub struct InputRecord {
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
    pub topic: Option<String>,
    pub partition: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A compiled input format.
pub struct InputFormat {
    items: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Key,
    Value,
    Topic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthKind {
    Decimal,
    BigEndian,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Literal(Vec<u8>),
    Text(Target),
    Length(Target, LengthKind),
    Partition,
}

/// Compile a format string for reading.
pub fn compile_reader(format: &str) -> Result<InputFormat, CompileErr> {
    let template = compile(format)?;
    let mut items = Vec::new();
    for segment in template.segments() {
        match segment {
            Segment::Literal(bytes) if bytes.is_empty() => (),
            Segment::Literal(bytes) => items.push(Item::Literal(bytes.clone())),
            Segment::Field(extractor) => items.push(match extractor {
                Extractor::Key => Item::Text(Target::Key),
                Extractor::Value => Item::Text(Target::Value),
                Extractor::Topic => Item::Text(Target::Topic),
                Extractor::KeyLen => Item::Length(Target::Key, LengthKind::Decimal),
                Extractor::ValueLen => Item::Length(Target::Value, LengthKind::Decimal),
                Extractor::ValueLenBigEndian => Item::Length(Target::Value, LengthKind::BigEndian),
                Extractor::Partition => Item::Partition,
                Extractor::Offset => return Err(CompileErr::UnsupportedInputDirective('o')),
                Extractor::TimestampMillis | Extractor::Strftime(_) => {
                    return Err(CompileErr::UnsupportedInputDirective('T'))
                }
            }),
        }
    }
    validate(&items)?;
    Ok(InputFormat { items })
}

/// A field of unknown length must be followed by a literal, or be the last item.
/// A decimal number must be followed by a literal not starting with a digit.
fn validate(items: &[Item]) -> Result<(), CompileErr> {
    let mut sized = KnownLengths::default();
    for (i, item) in items.iter().enumerate() {
        let next = items.get(i + 1);
        match item {
            Item::Length(target, kind) => {
                sized.set(*target);
                if *kind == LengthKind::Decimal && !separates_number(next) {
                    return Err(CompileErr::AmbiguousFields(target.length_letter()));
                }
            }
            Item::Partition => {
                if !separates_number(next) {
                    return Err(CompileErr::AmbiguousFields('p'));
                }
            }
            Item::Text(target) => {
                if !sized.take(*target) && !matches!(next, None | Some(Item::Literal(_))) {
                    return Err(CompileErr::AmbiguousFields(target.letter()));
                }
            }
            Item::Literal(_) => (),
        }
    }
    Ok(())
}

fn separates_number(next: Option<&Item>) -> bool {
    match next {
        None => true,
        Some(Item::Literal(literal)) => !literal.first().map_or(false, u8::is_ascii_digit),
        Some(_) => false,
    }
}

#[derive(Default)]
struct KnownLengths {
    key: bool,
    value: bool,
}

impl KnownLengths {
    fn set(&mut self, target: Target) {
        match target {
            Target::Key => self.key = true,
            Target::Value => self.value = true,
            Target::Topic => (),
        }
    }

    fn take(&mut self, target: Target) -> bool {
        match target {
            Target::Key => std::mem::take(&mut self.key),
            Target::Value => std::mem::take(&mut self.value),
            Target::Topic => false,
        }
    }
}

impl Target {
    fn letter(&self) -> char {
        match self {
            Self::Key => 'k',
            Self::Value => 'v',
            Self::Topic => 't',
        }
    }

    fn length_letter(&self) -> char {
        match self {
            Self::Key => 'K',
            Self::Value | Self::Topic => 'V',
        }
    }
}

impl InputFormat {
    /// Read one record. Returns `None` if the input is exhausted before the record starts.
    pub fn read<B: BufRead>(&self, reader: &mut B) -> Result<Option<InputRecord>, ReadErr> {
        if reader.fill_buf()?.is_empty() {
            return Ok(None);
        }
        let mut record = InputRecord::default();
        let mut key_len = None;
        let mut value_len = None;
        let mut skip_literal = false;

        for (i, item) in self.items.iter().enumerate() {
            match item {
                Item::Literal(literal) => {
                    if !std::mem::take(&mut skip_literal) {
                        expect_literal(reader, literal)?;
                    }
                }
                Item::Length(target, kind) => {
                    let len = match kind {
                        LengthKind::Decimal => parse_number(&read_digits(reader, false)?)?,
                        LengthKind::BigEndian => {
                            let mut bytes = [0u8; 8];
                            read_exact(reader, &mut bytes)?;
                            let len = u64::from_be_bytes(bytes);
                            usize::try_from(len)
                                .map_err(|_| ReadErr::InvalidNumber(len.to_string()))?
                        }
                    };
                    match target {
                        Target::Key => key_len = Some(len),
                        Target::Value => value_len = Some(len),
                        Target::Topic => (),
                    }
                }
                Item::Partition => {
                    record.partition = Some(parse_number(&read_digits(reader, true)?)?);
                }
                Item::Text(target) => {
                    let len = match target {
                        Target::Key => key_len.take(),
                        Target::Value => value_len.take(),
                        Target::Topic => None,
                    };
                    let bytes = match (len, self.items.get(i + 1)) {
                        (Some(len), _) => read_len(reader, len)?,
                        (None, Some(Item::Literal(delim))) => {
                            skip_literal = true;
                            let is_last = i + 2 == self.items.len();
                            read_until_literal(reader, delim, is_last)?
                        }
                        (None, _) => {
                            let mut bytes = Vec::new();
                            reader.read_to_end(&mut bytes)?;
                            bytes
                        }
                    };
                    match target {
                        Target::Key => record.key = Some(bytes),
                        Target::Value => record.value = Some(bytes),
                        Target::Topic => {
                            record.topic = Some(String::from_utf8(bytes).map_err(|e| {
                                ReadErr::InvalidTopic(String::from_utf8_lossy(e.as_bytes()).into())
                            })?)
                        }
                    }
                }
            }
        }
        Ok(Some(record))
    }

    /// Whether the format reads the topic of each record.
    pub fn has_topic(&self) -> bool {
        self.items.contains(&Item::Text(Target::Topic))
    }
}

impl FromStr for InputFormat {
    type Err = CompileErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile_reader(s)
    }
}

fn read_exact<B: BufRead>(reader: &mut B, buf: &mut [u8]) -> Result<(), ReadErr> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ReadErr::UnexpectedEof,
        _ => ReadErr::Io(e),
    })
}

fn read_len<B: BufRead>(reader: &mut B, len: usize) -> Result<Vec<u8>, ReadErr> {
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() < len {
        return Err(ReadErr::UnexpectedEof);
    }
    Ok(bytes)
}

fn expect_literal<B: BufRead>(reader: &mut B, literal: &[u8]) -> Result<(), ReadErr> {
    let found = read_len(reader, literal.len())?;
    if found != literal {
        return Err(ReadErr::LiteralMismatch {
            expected: literal.to_vec(),
            found,
        });
    }
    Ok(())
}

/// Read up to and including `delim`, returning what precedes it. If `eof_ok`, the end of
/// input also terminates the field.
fn read_until_literal<B: BufRead>(
    reader: &mut B,
    delim: &[u8],
    eof_ok: bool,
) -> Result<Vec<u8>, ReadErr> {
    let mut bytes = Vec::new();
    let Some(&last) = delim.last() else {
        return Ok(bytes);
    };
    loop {
        reader.read_until(last, &mut bytes)?;
        if bytes.ends_with(delim) {
            bytes.truncate(bytes.len() - delim.len());
            return Ok(bytes);
        }
        if bytes.last() != Some(&last) {
            // reached the end of input
            return if eof_ok {
                Ok(bytes)
            } else {
                Err(ReadErr::UnexpectedEof)
            };
        }
    }
}

fn read_digits<B: BufRead>(reader: &mut B, signed: bool) -> Result<String, ReadErr> {
    let mut digits = String::new();
    loop {
        let Some(&b) = reader.fill_buf()?.first() else {
            break;
        };
        if !(b.is_ascii_digit() || (signed && digits.is_empty() && b == b'-')) {
            break;
        }
        digits.push(b as char);
        reader.consume(1);
    }
    if digits.is_empty() && reader.fill_buf()?.is_empty() {
        return Err(ReadErr::UnexpectedEof);
    }
    Ok(digits)
}

fn parse_number<T: FromStr>(digits: &str) -> Result<T, ReadErr> {
    digits
        .parse()
        .map_err(|_| ReadErr::InvalidNumber(digits.to_owned()))
}
