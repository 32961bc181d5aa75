use crate::{match_delimited, CompileErr, Extractor, TimeFormat};

/// The only qualifier recognized inside `%T{...}`.
const STRFTIME: &str = "strftime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    /// `%%`, folded into the literal
    Percent,
    Field(Extractor),
}

/// Look up a single-letter directive. `%T` with a qualifier is handled by [`parse_directive`].
pub(crate) fn lookup(c: char) -> Option<Extractor> {
    Some(match c {
        's' | 'v' => Extractor::Value,
        'S' | 'V' => Extractor::ValueLen,
        'R' => Extractor::ValueLenBigEndian,
        'k' => Extractor::Key,
        'K' => Extractor::KeyLen,
        't' => Extractor::Topic,
        'p' => Extractor::Partition,
        'o' => Extractor::Offset,
        'T' => Extractor::TimestampMillis,
        _ => return None,
    })
}

/// Parse one directive. `input` must start with the percent sign.
/// Returns the remaining input and the directive.
pub(crate) fn parse_directive(input: &str) -> Result<(&str, Directive), CompileErr> {
    debug_assert!(input.starts_with('%'));
    let mut chars = input[1..].chars();
    let c = chars.next().ok_or(CompileErr::IncompleteDirective)?;
    let rest = chars.as_str();
    match c {
        '%' => Ok((rest, Directive::Percent)),
        'T' if rest.starts_with('{') => {
            let (rest, format) = time_qualifier(&rest[1..])?;
            Ok((rest, Directive::Field(Extractor::Strftime(format))))
        }
        c => match lookup(c) {
            Some(extractor) => Ok((rest, Directive::Field(extractor))),
            None => Err(CompileErr::UnknownDirective(c)),
        },
    }
}

/// `input` is what follows `%T{`.
fn time_qualifier(input: &str) -> Result<(&str, TimeFormat), CompileErr> {
    let Some(rest) = input.strip_prefix(STRFTIME) else {
        let name: String = input.chars().take_while(|c| c.is_ascii_alphanumeric()).collect();
        return Err(CompileErr::UnknownTimeQualifier(name));
    };
    let (pattern, rest) = match_delimited(rest)?;
    if pattern.is_empty() {
        return Err(CompileErr::EmptyDelimited);
    }
    let rest = rest
        .strip_prefix('}')
        .ok_or(CompileErr::MissingClosingBrace)?;
    Ok((rest, TimeFormat::new(pattern)?))
}

#[cfg(test)]
mod test {
    use super::*;

    fn strftime(pattern: &str) -> Directive {
        Directive::Field(Extractor::Strftime(TimeFormat::new(pattern).unwrap()))
    }

    #[test]
    fn test_simple_directives() {
        assert_eq!(
            parse_directive("%vrest"),
            Ok(("rest", Directive::Field(Extractor::Value)))
        );
        assert_eq!(
            parse_directive("%S"),
            Ok(("", Directive::Field(Extractor::ValueLen)))
        );
        assert_eq!(parse_directive("%%v"), Ok(("v", Directive::Percent)));
        assert_eq!(
            parse_directive("%T "),
            Ok((" ", Directive::Field(Extractor::TimestampMillis)))
        );
    }

    #[test]
    fn test_every_letter() {
        for c in "svSVRkKtpoT".chars() {
            assert!(lookup(c).is_some(), "{c}");
        }
        for c in "abcdefghijlmnqruwxyzABCDEFGHIJLMNOPQUWXYZ".chars() {
            assert!(lookup(c).is_none(), "{c}");
        }
    }

    #[test]
    fn test_strftime() {
        assert_eq!(
            parse_directive("%T{strftime[%Y-%m-%d]}\\n"),
            Ok(("\\n", strftime("%Y-%m-%d")))
        );
        assert_eq!(
            parse_directive("%T{strftime{{%H}}}"),
            Ok(("", strftime("%H")))
        );
        assert_eq!(
            parse_directive("%T{strftime||%H:%M||}x"),
            Ok(("x", strftime("%H:%M")))
        );
        // the delimiter can be repeated to enclose a closing brace
        assert_eq!(
            parse_directive("%T{strftime[[%H} [UTC] ]]}"),
            Ok(("", strftime("%H} [UTC] ")))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_directive("%"), Err(CompileErr::IncompleteDirective));
        assert_eq!(parse_directive("%z"), Err(CompileErr::UnknownDirective('z')));
        assert_eq!(
            parse_directive("%T{unix}"),
            Err(CompileErr::UnknownTimeQualifier("unix".to_owned()))
        );
        assert_eq!(
            parse_directive("%T{strftime[%Y]"),
            Err(CompileErr::MissingClosingBrace)
        );
        assert_eq!(
            parse_directive("%T{strftime[%Y] }"),
            Err(CompileErr::MissingClosingBrace)
        );
        assert_eq!(
            parse_directive("%T{strftime[[%Y]}"),
            Err(CompileErr::UnmatchedDelimiter("]]".to_owned()))
        );
        assert_eq!(
            parse_directive("%T{strftime"),
            Err(CompileErr::EmptyDelimited)
        );
        assert_eq!(
            parse_directive("%T{strftime[]}"),
            Err(CompileErr::EmptyDelimited)
        );
        assert_eq!(
            parse_directive("%T{strftime{{}}}"),
            Err(CompileErr::EmptyDelimited)
        );
    }
}
