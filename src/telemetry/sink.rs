//! Log sinks
//!
//! A [`LogSink`] is a cloneable `tracing` dispatcher. Stages run their work
//! inside it with [`LogSink::scope`]; nothing is installed globally.

use super::rotate::RotatingFileWriter;
use crate::config::LogConfig;
use crate::error::Result;
use std::fmt;
use std::future::Future;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Width of the separator line written at the end of each stage
pub const SEPARATOR_WIDTH: usize = 120;

/// A separator line made of `ch`
pub fn separator(ch: char) -> String {
    std::iter::repeat(ch).take(SEPARATOR_WIDTH).collect()
}

/// `2025-07-15 09:05:03 | INFO | message`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(writer, "{now} | {} | ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Where a stage's log lines go
#[derive(Debug, Clone)]
pub struct LogSink {
    dispatch: Dispatch,
}

impl LogSink {
    /// Use whatever subscriber is current at construction time
    pub fn ambient() -> Self {
        Self {
            dispatch: tracing::dispatcher::get_default(Dispatch::clone),
        }
    }

    /// Discard everything
    pub fn none() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Rotating file `{config.dir}/{file_name}`, optionally mirrored to stderr
    pub fn to_file(config: &LogConfig, file_name: &str, console: bool) -> Result<Self> {
        let writer =
            RotatingFileWriter::open(config.dir.join(file_name), config.max_bytes, config.backups)?;
        Ok(Self::from_writer(writer, console))
    }

    /// Write formatted lines to any `MakeWriter`
    ///
    /// Lines at INFO and above reach the writer. With `console`, events are
    /// also printed to stderr, filtered by `RUST_LOG` (default `info`).
    pub fn from_writer<W>(writer: W, console: bool) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(LevelFilter::INFO);

        let console_layer = console.then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        });

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// The underlying dispatcher
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run a future with this sink as its default subscriber
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        fut.with_subscriber(self.dispatch.clone()).await
    }

    /// Run a closure with this sink as its default subscriber
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::ambient()
    }
}
