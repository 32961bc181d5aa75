use futures::{pin_mut, Stream, StreamExt};
use sea_kfmt_types::Record;
use std::io::Write;

use crate::{DriveErr, EmitErr, Renderer, Template};

#[derive(Debug)]
/// Renders records one by one into a sink, counting them, until an optional cutoff.
///
/// The driver does not terminate the process by itself; see [`exit_on_cutoff`].
pub struct Driver<W: Write> {
    template: Template,
    renderer: Renderer,
    sink: W,
    max: u64,
    count: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// Result of emitting one record.
pub enum Emit {
    Continue,
    /// The cutoff has been reached; no more records will be emitted.
    Cutoff,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// How a drive ended, with the number of records emitted.
pub enum Outcome {
    /// The source ended before the cutoff.
    Exhausted(u64),
    Cutoff(u64),
}

impl<W: Write> Driver<W> {
    pub fn new(template: Template, sink: W) -> Self {
        Self {
            template,
            renderer: Renderer::new(),
            sink,
            max: 0,
            count: 0,
        }
    }

    /// Stop after `max` records. Zero means unbounded.
    pub fn set_max(&mut self, max: u64) -> &mut Self {
        self.max = max;
        self
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    /// Number of records emitted so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_cutoff(&self) -> bool {
        self.max != 0 && self.count >= self.max
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Render one record and write it to the sink. A render error aborts before anything
    /// of this record is written.
    pub fn emit<R: Record>(&mut self, record: &R) -> Result<Emit, EmitErr> {
        if self.is_cutoff() {
            return Ok(Emit::Cutoff);
        }
        let bytes = self.renderer.render(&self.template, record)?;
        self.sink.write_all(bytes)?;
        self.count += 1;
        Ok(if self.is_cutoff() {
            Emit::Cutoff
        } else {
            Emit::Continue
        })
    }

    /// Emit a batch in order, stopping at the cutoff. The rest of the batch is discarded.
    pub fn emit_batch<R, I>(&mut self, batch: I) -> Result<Emit, EmitErr>
    where
        R: Record,
        I: IntoIterator<Item = R>,
    {
        for record in batch {
            if self.emit(&record)? == Emit::Cutoff {
                return Ok(Emit::Cutoff);
            }
        }
        Ok(if self.is_cutoff() {
            Emit::Cutoff
        } else {
            Emit::Continue
        })
    }

    /// Drive a record stream until it ends or the cutoff is reached.
    /// Source errors are fatal and returned as [`DriveErr::Source`].
    pub async fn drive<S, R, E>(&mut self, stream: S) -> Result<Outcome, DriveErr<E>>
    where
        S: Stream<Item = Result<R, E>>,
        R: Record,
        E: std::error::Error,
    {
        if self.is_cutoff() {
            return Ok(Outcome::Cutoff(self.count));
        }
        pin_mut!(stream);
        while let Some(record) = stream.next().await {
            let record = record.map_err(DriveErr::Source)?;
            if self.emit(&record)? == Emit::Cutoff {
                log::info!("Reached the maximum of {} records", self.max);
                return Ok(Outcome::Cutoff(self.count));
            }
        }
        log::info!("Source exhausted after {} records", self.count);
        Ok(Outcome::Exhausted(self.count))
    }
}

impl Outcome {
    pub fn count(&self) -> u64 {
        match self {
            Self::Exhausted(n) | Self::Cutoff(n) => *n,
        }
    }
}

/// Flush `sink` and exit the process if the cutoff has been reached. Records fetched but
/// not yet emitted are discarded; there is no draining. Otherwise, returns the count.
pub fn exit_on_cutoff<W: Write>(outcome: Outcome, sink: &mut W) -> u64 {
    if let Outcome::Cutoff(count) = outcome {
        if let Err(e) = sink.flush() {
            log::error!("Failed to flush output: {e}");
        }
        log::debug!("Exiting after {count} records");
        std::process::exit(0);
    }
    outcome.count()
}

#[cfg(test)]
mod test {
    use super::*;
    use sea_kfmt_types::{OwnedRecord, StreamKey};

    fn records(n: i64) -> Vec<OwnedRecord> {
        let topic = StreamKey::new("t").unwrap();
        (0..n)
            .map(|i| OwnedRecord::new(&topic, 0, i).with_value(i.to_string()))
            .collect()
    }

    #[test]
    fn test_emit_unbounded() {
        let mut driver = Driver::new("%v,".parse().unwrap(), Vec::new());
        assert_eq!(driver.emit_batch(records(100)).unwrap(), Emit::Continue);
        assert_eq!(driver.count(), 100);
        assert!(driver.into_sink().ends_with(b"98,99,"));
    }

    #[test]
    fn test_emit_cutoff() {
        let mut driver = Driver::new("%v,".parse().unwrap(), Vec::new());
        driver.set_max(3);
        assert_eq!(driver.emit_batch(records(2)).unwrap(), Emit::Continue);
        assert_eq!(driver.emit_batch(records(5)).unwrap(), Emit::Cutoff);
        assert_eq!(driver.count(), 3);
        assert_eq!(driver.emit(&records(1)[0]).unwrap(), Emit::Cutoff);
        assert_eq!(driver.into_sink(), b"0,1,0,");
    }

    #[test]
    fn test_cutoff_of_one() {
        let mut driver = Driver::new("%o\\n".parse().unwrap(), Vec::new());
        driver.set_max(1);
        assert_eq!(driver.emit_batch(records(3)).unwrap(), Emit::Cutoff);
        assert_eq!(driver.into_sink(), b"0\n");
    }

    #[test]
    fn test_exhausted_does_not_exit() {
        let mut sink = Vec::new();
        assert_eq!(exit_on_cutoff(Outcome::Exhausted(5), &mut sink), 5);
    }
}
