//! Progress reporting for the passes over the input files.
//!
//! Bars are drawn by `tracing-indicatif`: every monitor owns an entered span,
//! and the indicatif layer renders a bar for it. Without the layer installed
//! the span calls are no-ops, so `--no-progress` needs no special casing here.

use std::io::Read;
use std::time::Instant;

use color_eyre::eyre::Result;
use indicatif::{HumanBytes, HumanDuration, ProgressStyle};
use tracing::span::EnteredSpan;
use tracing::{info, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// A wrapper around a reader that reports how many bytes of `total` have
/// been read so far.
pub struct ProgressMonitor<R: Read> {
    /// The total amount that the reader will read
    pub total: u64,
    /// Amount read so far
    pub read: u64,
    reader: R,
    pass: &'static str,
    started: Instant,
    reported: bool,
    span: EnteredSpan,
}

/// The bar style shared by all passes.
pub fn bar_style() -> Result<ProgressStyle> {
    // https://docs.rs/indicatif/latest/indicatif/index.html#templates
    Ok(ProgressStyle::with_template(
        "{msg:>9} {wide_bar} {binary_bytes}/{binary_total_bytes} [est. {eta} remaining]",
    )?)
}

impl<R: Read> ProgressMonitor<R> {
    pub fn new(reader: R, total: u64, pass: &'static str, style: &ProgressStyle) -> Self {
        let span = info_span!("pass", pass);
        span.pb_set_style(style);
        span.pb_set_length(total);
        span.pb_set_message(pass);
        Self {
            total,
            read: 0,
            reader,
            pass,
            started: Instant::now(),
            reported: false,
            span: span.entered(),
        }
    }

    fn update(&mut self, delta: usize) {
        self.read += delta as u64;
        self.span.pb_inc(delta as u64);
        // a zero length read ends passes whose size changed under us
        if (delta == 0 || self.read >= self.total) && !self.reported {
            self.reported = true;
            self.report();
        }
    }

    fn report(&self) {
        let elapsed = self.started.elapsed();
        let per_second = self.read as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        info!(
            "{} {} in {} ({}/s avg)",
            self.pass,
            HumanBytes(self.read),
            HumanDuration(elapsed),
            HumanBytes(per_second as u64)
        );
    }
}

impl<R: Read> Read for ProgressMonitor<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let out = self.reader.read(buf)?;
        self.update(out);
        Ok(out)
    }
}
