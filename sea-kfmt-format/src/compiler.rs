use crate::{
    directive::{parse_directive, Directive},
    escape::unescape,
    CompileErr, Segment, Template,
};

/// Compile a format string into a [`Template`], in a single left-to-right pass.
///
/// Fails on the first malformed escape or directive; a template never partially compiles.
pub fn compile(format: &str) -> Result<Template, CompileErr> {
    let mut segments = Vec::new();
    let mut literal = Vec::new();
    let mut input = format;

    while !input.is_empty() {
        if input.starts_with('\\') {
            let (rest, byte) = unescape(input)?;
            literal.push(byte);
            input = rest;
        } else if input.starts_with('%') {
            let (rest, directive) = parse_directive(input)?;
            match directive {
                Directive::Percent => literal.push(b'%'),
                Directive::Field(extractor) => {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    segments.push(Segment::Field(extractor));
                }
            }
            input = rest;
        } else {
            let end = input.find(is_special).unwrap_or(input.len());
            literal.extend_from_slice(input[..end].as_bytes());
            input = &input[end..];
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    let template = Template::new(segments);
    log::debug!(
        "Compiled format {format:?} into {} segments",
        template.segments().len()
    );
    Ok(template)
}

fn is_special(c: char) -> bool {
    c == '\\' || c == '%'
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Extractor, Renderer, TimeFormat};
    use sea_kfmt_types::{OwnedRecord, StreamKey};

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.as_bytes().to_vec())
    }

    fn record() -> OwnedRecord {
        OwnedRecord::new(&StreamKey::new("foo").unwrap(), 3, 42)
            .with_key("k")
            .with_value("v")
    }

    fn render(format: &str, record: &OwnedRecord) -> Vec<u8> {
        let template = compile(format).unwrap();
        Renderer::new().render(&template, record).unwrap().to_vec()
    }

    #[test]
    fn test_segments_alternate() {
        let template = compile("%k=%v\\n").unwrap();
        assert_eq!(
            template.segments(),
            [
                lit(""),
                Segment::Field(Extractor::Key),
                lit("="),
                Segment::Field(Extractor::Value),
                lit("\n"),
            ]
        );
    }

    #[test]
    fn test_constant() {
        let template = compile("hello\\tworld").unwrap();
        assert!(template.is_constant());
        assert_eq!(template.segments(), [lit("hello\tworld")]);
        assert!(compile("").unwrap().segments().is_empty());
        assert_eq!(render("static", &record()), b"static");
        assert_eq!(render("static", &OwnedRecord::default()), b"static");
    }

    #[test]
    fn test_percent_does_not_seal() {
        let template = compile("100%% %v%%").unwrap();
        assert_eq!(
            template.segments(),
            [lit("100% "), Segment::Field(Extractor::Value), lit("%")]
        );
        assert!(compile("%%").unwrap().is_constant());
        assert_eq!(render("%%%%", &record()), b"%%");
    }

    #[test]
    fn test_control_escapes_anywhere() {
        for (escape, byte) in [("\\n", b'\n'), ("\\r", b'\r'), ("\\t", b'\t')] {
            assert_eq!(render(escape, &record()), [byte]);
            assert_eq!(render(&format!("{escape}%v"), &record()), [byte, b'v']);
            assert_eq!(render(&format!("%v{escape}"), &record()), [b'v', byte]);
            assert_eq!(
                render(&format!("%k{escape}%v"), &record()),
                [b'k', byte, b'v']
            );
        }
    }

    #[test]
    fn test_hex_escapes() {
        for byte in 0..=255u8 {
            assert_eq!(render(&format!("\\x{byte:02x}"), &record()), [byte]);
            assert_eq!(render(&format!("\\x{byte:02X}"), &record()), [byte]);
        }
    }

    #[test]
    fn test_unicode_literal() {
        assert_eq!(render("🌊 %v", &record()), "🌊 v".as_bytes());
    }

    #[test]
    fn test_all_fields() {
        assert_eq!(render("%t:%p:%o:%k=%v\\n", &record()), b"foo:3:42:k=v\n");
        let record = record().with_value("hello");
        assert_eq!(render("%S %s\\n", &record), b"5 hello\n");
        assert_eq!(render("%V %K", &record), b"5 1");
        assert_eq!(render("%R%v", &record), b"\0\0\0\0\0\0\0\x05hello");
        assert_eq!(render("%T", &record), b"0");
    }

    #[test]
    fn test_strftime_delimiters() {
        let expected = [
            lit("["),
            Segment::Field(Extractor::Strftime(TimeFormat::new("%Y").unwrap())),
            lit("]"),
        ];
        for format in [
            "[%T{strftime[[[%Y]]]}]",
            "[%T{strftime{{%Y}}}]",
            "[%T{strftime||%Y||}]",
            "[%T{strftime(%Y)}]",
        ] {
            assert_eq!(compile(format).unwrap().segments(), expected);
        }
        assert_eq!(render("%T{strftime[%Y-%m-%d]}", &record()), b"1970-01-01");
    }

    #[test]
    fn test_errors() {
        assert_eq!(compile("%z"), Err(CompileErr::UnknownDirective('z')));
        assert_eq!(compile("%v %"), Err(CompileErr::IncompleteDirective));
        assert_eq!(compile("%v \\"), Err(CompileErr::UnterminatedEscape));
        assert_eq!(compile("\\a"), Err(CompileErr::UnknownEscape('a')));
        assert_eq!(
            compile("\\x1"),
            Err(CompileErr::MalformedEscape("1".to_owned()))
        );
        assert_eq!(
            compile("%T{strftime[[%Y]}"),
            Err(CompileErr::UnmatchedDelimiter("]]".to_owned()))
        );
        assert_eq!(
            compile("%T{epoch}"),
            Err(CompileErr::UnknownTimeQualifier("epoch".to_owned()))
        );
        assert_eq!(
            compile("%T{strftime[%Y]"),
            Err(CompileErr::MissingClosingBrace)
        );
        assert_eq!(
            compile("%T{strftime[%#z]}"),
            Err(CompileErr::InvalidTimeFormat("%#z".to_owned()))
        );
        assert_eq!(compile("%T{strftime[]}"), Err(CompileErr::EmptyDelimited));
    }

    #[test]
    fn test_deterministic() {
        let format = "%T{strftime[%H]} %k %%\\x41 %v\\n";
        assert_eq!(compile(format).unwrap(), compile(format).unwrap());
    }
}
