use flume::{bounded, Receiver, Sender};
use sea_kfmt_types::Record;
use std::{io::Write, sync::Arc};

use crate::{Emit, EmitErr, Outcome, RenderErr, Renderer, Template};

/// Number of rendered records that may be in flight before taps wait for the sink.
pub const FUNNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
/// Funnels records rendered by many concurrent delivery paths (say, one task per partition)
/// into a single sink. Each path renders with its own [`FunnelTap`]; only the writes and the
/// running count are serialized, so the cutoff is evaluated exactly once per record.
///
/// Records from the same tap are emitted in the order they are sent.
pub struct Funnel {
    template: Arc<Template>,
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
}

#[derive(Debug)]
/// The rendering end of a [`Funnel`].
pub struct FunnelTap {
    template: Arc<Template>,
    renderer: Renderer,
    sender: Sender<Vec<u8>>,
}

impl Funnel {
    pub fn new(template: Template) -> Self {
        Self::with_capacity(template, FUNNEL_CAPACITY)
    }

    pub fn with_capacity(template: Template, capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            template: Arc::new(template),
            sender,
            receiver,
        }
    }

    /// Create a tap for one delivery path.
    pub fn tap(&self) -> FunnelTap {
        FunnelTap {
            template: self.template.clone(),
            renderer: Renderer::new(),
            sender: self.sender.clone(),
        }
    }

    /// Write records to `sink` until all taps are dropped, or `max` records have been
    /// written. Zero means unbounded. On cutoff, taps are disconnected.
    pub async fn drain<W: Write>(self, sink: &mut W, max: u64) -> Result<Outcome, EmitErr> {
        let Self {
            sender, receiver, ..
        } = self;
        // otherwise the channel never closes
        drop(sender);
        let mut count = 0;
        while let Ok(bytes) = receiver.recv_async().await {
            sink.write_all(&bytes)?;
            count += 1;
            if max != 0 && count >= max {
                log::info!("Reached the maximum of {max} records");
                return Ok(Outcome::Cutoff(count));
            }
        }
        log::info!("All taps closed after {count} records");
        Ok(Outcome::Exhausted(count))
    }
}

impl FunnelTap {
    /// Render a record and send it to the sink. Returns [`Emit::Cutoff`] if the funnel
    /// is no longer draining, in which case the delivery path should stop.
    pub async fn send<R: Record>(&mut self, record: &R) -> Result<Emit, RenderErr> {
        let bytes = self.renderer.render(&self.template, record)?.to_vec();
        Ok(match self.sender.send_async(bytes).await {
            Ok(()) => Emit::Continue,
            Err(_) => Emit::Cutoff,
        })
    }
}
