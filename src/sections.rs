//! Named trace sections around intercepted calls
//!
//! A section brackets the wrapped call so that a profiler can show it on a
//! timeline. Sections are best-effort: a tracer that cannot open or close a
//! section reports a [`SectionError`], and the interceptor drops it.

use std::cell::RefCell;
use thiserror::Error;
use tracing::span::EnteredSpan;

/// Errors a section tracer may report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    #[error("no open section on this thread")]
    NotOpen,

    #[error("section tracing unavailable: {0}")]
    Unavailable(String),
}

/// Opens and closes named trace sections
///
/// Sections nest per thread: `end_section` closes the most recent section the
/// calling thread opened.
pub trait SectionTracer: Send + Sync {
    fn begin_section(&self, name: &str) -> Result<(), SectionError>;
    fn end_section(&self) -> Result<(), SectionError>;
}

/// Tracer for platforms without section support
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSections;

impl SectionTracer for NoopSections {
    fn begin_section(&self, _name: &str) -> Result<(), SectionError> {
        Ok(())
    }

    fn end_section(&self) -> Result<(), SectionError> {
        Ok(())
    }
}

thread_local! {
    static OPEN_SECTIONS: RefCell<Vec<EnteredSpan>> = const { RefCell::new(Vec::new()) };
}

/// Tracer that maps sections onto entered `tracing` spans
///
/// Each section is a `TRACE` span named `section` with the section name as a
/// field. Entered spans live on a thread-local stack until their section ends.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSections;

impl TracingSections {
    pub fn new() -> Self {
        Self
    }

    /// Number of sections the calling thread has open
    pub fn open_sections(&self) -> usize {
        OPEN_SECTIONS.with(|open| open.borrow().len())
    }
}

impl SectionTracer for TracingSections {
    fn begin_section(&self, name: &str) -> Result<(), SectionError> {
        let span = tracing::trace_span!(target: "debuglog", "section", section = name).entered();
        OPEN_SECTIONS.with(|open| open.borrow_mut().push(span));
        Ok(())
    }

    fn end_section(&self) -> Result<(), SectionError> {
        OPEN_SECTIONS
            .with(|open| open.borrow_mut().pop())
            .map(drop)
            .ok_or(SectionError::NotOpen)
    }
}
