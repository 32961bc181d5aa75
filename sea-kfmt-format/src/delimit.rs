use nom::{
    bytes::complete::{take_until, take_while1},
    IResult,
};

use crate::CompileErr;

/// The character closing a delimited text opened by `open`.
/// Brackets close with their counterpart, anything else closes itself.
pub fn closing_of(open: char) -> char {
    match open {
        '{' => '}',
        '[' => ']',
        '(' => ')',
        c => c,
    }
}

/// Match a delimited text. The first character of `text` is the opening delimiter, which
/// may be repeated. The text ends at the first run of the same number of closing delimiters.
///
/// Returns `(inner, remainder)`.
///
/// ```
/// use sea_kfmt_format::match_delimited;
///
/// assert_eq!(match_delimited("[[a]b]]}").unwrap(), ("a]b", "}"));
/// assert_eq!(match_delimited("|%H|rest").unwrap(), ("%H", "rest"));
/// ```
pub fn match_delimited(text: &str) -> Result<(&str, &str), CompileErr> {
    let open = text.chars().next().ok_or(CompileErr::EmptyDelimited)?;
    let (text, opening) = opening_run(text, open).map_err(|_| CompileErr::EmptyDelimited)?;
    let n = opening.chars().count();
    let closing: String = std::iter::repeat(closing_of(open)).take(n).collect();
    let (remainder, inner) = inner_until(text, &closing)
        .map_err(|_| CompileErr::UnmatchedDelimiter(closing.clone()))?;
    Ok((inner, &remainder[closing.len()..]))
}

fn opening_run(input: &str, open: char) -> IResult<&str, &str> {
    take_while1(|c: char| c == open)(input)
}

fn inner_until<'a>(input: &'a str, closing: &str) -> IResult<&'a str, &'a str> {
    take_until(closing)(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_brackets() {
        assert_eq!(match_delimited("{%Y}}"), Ok(("%Y", "}")));
        assert_eq!(match_delimited("[%Y]"), Ok(("%Y", "")));
        assert_eq!(match_delimited("(%Y)rest"), Ok(("%Y", "rest")));
    }

    #[test]
    fn test_repeated() {
        assert_eq!(match_delimited("[[[pattern]]]}"), Ok(("pattern", "}")));
        assert_eq!(match_delimited("{{pattern}}}"), Ok(("pattern", "}")));
        assert_eq!(match_delimited("||pattern||}"), Ok(("pattern", "}")));
        // a shorter closing run inside the text is not a match
        assert_eq!(match_delimited("{{a}b}}"), Ok(("a}b", "")));
    }

    #[test]
    fn test_self_delimiting() {
        assert_eq!(match_delimited("#%H:%M#"), Ok(("%H:%M", "")));
        assert_eq!(match_delimited("xyzx"), Ok(("yz", "")));
    }

    #[test]
    fn test_empty_inner() {
        assert_eq!(match_delimited("[]"), Ok(("", "")));
    }

    #[test]
    fn test_unmatched() {
        assert_eq!(
            match_delimited("[[pattern]"),
            Err(CompileErr::UnmatchedDelimiter("]]".to_owned()))
        );
        assert_eq!(
            match_delimited("{pattern"),
            Err(CompileErr::UnmatchedDelimiter("}".to_owned()))
        );
        assert_eq!(match_delimited(""), Err(CompileErr::EmptyDelimited));
    }
}
