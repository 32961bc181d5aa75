use nom::{bytes::complete::take_while_m_n, IResult};

use crate::CompileErr;

/// Decode one escape sequence. `input` must start with the backslash.
/// Returns the remaining input and the decoded byte.
pub(crate) fn unescape(input: &str) -> Result<(&str, u8), CompileErr> {
    debug_assert!(input.starts_with('\\'));
    let mut chars = input[1..].chars();
    let c = chars.next().ok_or(CompileErr::UnterminatedEscape)?;
    let rest = chars.as_str();
    match c {
        'n' => Ok((rest, b'\n')),
        'r' => Ok((rest, b'\r')),
        't' => Ok((rest, b'\t')),
        'x' => match hex_pair(rest) {
            Ok((rest, hex)) => {
                // two hex digits always fit in a byte
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| CompileErr::MalformedEscape(hex.to_owned()))?;
                Ok((rest, byte))
            }
            Err(_) => Err(CompileErr::MalformedEscape(rest.chars().take(2).collect())),
        },
        other => Err(CompileErr::UnknownEscape(other)),
    }
}

fn hex_pair(input: &str) -> IResult<&str, &str> {
    take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_control_escapes() {
        assert_eq!(unescape("\\nabc"), Ok(("abc", b'\n')));
        assert_eq!(unescape("\\r"), Ok(("", b'\r')));
        assert_eq!(unescape("\\t%v"), Ok(("%v", b'\t')));
    }

    #[test]
    fn test_hex_escapes() {
        for byte in 0..=255u8 {
            let lower = format!("\\x{byte:02x}rest");
            let upper = format!("\\x{byte:02X}rest");
            assert_eq!(unescape(&lower), Ok(("rest", byte)));
            assert_eq!(unescape(&upper), Ok(("rest", byte)));
        }
    }

    #[test]
    fn test_bad_escapes() {
        assert_eq!(unescape("\\"), Err(CompileErr::UnterminatedEscape));
        assert_eq!(unescape("\\q"), Err(CompileErr::UnknownEscape('q')));
        assert_eq!(unescape("\\\\"), Err(CompileErr::UnknownEscape('\\')));
        assert_eq!(
            unescape("\\x4"),
            Err(CompileErr::MalformedEscape("4".to_owned()))
        );
        assert_eq!(
            unescape("\\xg1"),
            Err(CompileErr::MalformedEscape("g1".to_owned()))
        );
        assert_eq!(
            unescape("\\x"),
            Err(CompileErr::MalformedEscape(String::new()))
        );
    }
}
