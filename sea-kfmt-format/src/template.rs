use sea_kfmt_types::Record;
use std::str::FromStr;

use crate::{compile, CompileErr, Extractor, RenderErr};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One piece of a compiled template.
pub enum Segment {
    Literal(Vec<u8>),
    Field(Extractor),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A compiled format string. Immutable, and can be shared across threads to render
/// records concurrently, as long as each thread renders into its own buffer.
///
/// Every field is preceded by a literal, which may be empty. A trailing literal is only
/// present if it is non-empty.
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over the fields, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &Extractor> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(e) => Some(e),
            Segment::Literal(_) => None,
        })
    }

    /// A template without fields renders the same bytes for every record.
    pub fn is_constant(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Append the rendered record to `out`. On error, `out` may contain a partial rendering.
    pub fn render_into<R: Record>(
        &self,
        record: &R,
        out: &mut Vec<u8>,
    ) -> Result<(), RenderErr> {
        for segment in self.segments.iter() {
            match segment {
                Segment::Literal(bytes) => out.extend_from_slice(bytes),
                Segment::Field(extractor) => extractor.extract(record, out)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Template {
    type Err = CompileErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}
