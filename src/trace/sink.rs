//! 按行输出的 sink

use std::io::Write;

use serde::Serialize;

use super::{TraceRecord, TraceSink};
use crate::sim::{SimError, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    /// `Sender: 0; Packet: 1; Send Time: 10; Receiver Time: 20; Current Rate: 10; `
    #[default]
    Text,
    /// `0;1;10;20;10`
    Csv,
    /// 每行一个 JSON 对象
    Jsonl,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a Summary,
}

#[derive(Debug)]
pub struct LineSink<W: Write> {
    out: W,
    format: TraceFormat,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W, format: TraceFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for LineSink<W> {
    fn record(&mut self, rec: &TraceRecord) -> Result<(), SimError> {
        match self.format {
            TraceFormat::Text => writeln!(
                self.out,
                "Sender: {}; Packet: {}; Send Time: {}; Receiver Time: {}; Current Rate: {}; ",
                rec.flow, rec.seq, rec.send_time, rec.receive_time, rec.rate
            )?,
            TraceFormat::Csv => writeln!(
                self.out,
                "{};{};{};{};{}",
                rec.flow, rec.seq, rec.send_time, rec.receive_time, rec.rate
            )?,
            TraceFormat::Jsonl => {
                serde_json::to_writer(&mut self.out, rec)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn summary(&mut self, summary: &Summary) -> Result<(), SimError> {
        match self.format {
            TraceFormat::Text => writeln!(self.out, "Overhead: {}", summary.overhead)?,
            TraceFormat::Csv => writeln!(self.out, "overhead;{}", summary.overhead)?,
            TraceFormat::Jsonl => {
                serde_json::to_writer(&mut self.out, &SummaryLine { summary })?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
