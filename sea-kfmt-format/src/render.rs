use sea_kfmt_types::Record;

use crate::{RenderErr, Template};

#[derive(Debug, Default)]
/// Renders records with a reusable output buffer. The buffer is cleared, not reallocated,
/// between records, so it grows to fit the largest record and stays there.
pub struct Renderer {
    buf: Vec<u8>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Render one record. The returned bytes are valid until the next call.
    pub fn render<R: Record>(
        &mut self,
        template: &Template,
        record: &R,
    ) -> Result<&[u8], RenderErr> {
        self.buf.clear();
        template.render_into(record, &mut self.buf)?;
        Ok(&self.buf)
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

/// Render one record into a freshly allocated buffer.
pub fn render<R: Record>(template: &Template, record: &R) -> Result<Vec<u8>, RenderErr> {
    let mut out = Vec::new();
    template.render_into(record, &mut out)?;
    Ok(out)
}
