//! Output surface and link opener
//!
//! The render path only ever talks to an `OutputSurface`: the binary uses
//! the crossterm-backed `TerminalSurface`, tests use `BufferSurface` to
//! record every clear and write in order.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};

/// Text sink for frames, mini lines and banners
pub trait OutputSurface: Send {
    /// Clear the visible surface and home the cursor
    fn clear(&mut self) -> io::Result<()>;

    /// Write text as-is (`\n` separated lines)
    fn write(&mut self, text: &str) -> io::Result<()>;
}

/// Crossterm terminal surface.
///
/// The terminal runs in raw mode, where `\n` does not return the carriage,
/// so line breaks are written as `\r\n`.
pub struct TerminalSurface<W: Write + Send> {
    out: W,
}

impl TerminalSurface<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> OutputSurface for TerminalSurface<W> {
    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.replace('\n', "\r\n").as_bytes())?;
        self.out.flush()
    }
}

/// Single recorded surface operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Clear,
    Write(String),
}

/// In-memory surface; clones share the same record
#[derive(Debug, Clone, Default)]
pub struct BufferSurface {
    ops: Arc<Mutex<Vec<SurfaceOp>>>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation so far, in order
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Written texts only, in order
    pub fn writes(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                SurfaceOp::Write(text) => Some(text),
                SurfaceOp::Clear => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Clear))
            .count()
    }

    pub fn reset(&self) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, op: SurfaceOp) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }
}

impl OutputSurface for BufferSurface {
    fn clear(&mut self) -> io::Result<()> {
        self.push(SurfaceOp::Clear);
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.push(SurfaceOp::Write(text.to_string()));
        Ok(())
    }
}

/// Opens URLs outside the dashboard (system browser)
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Opens links with the platform's default handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        // Detached so the worker never waits on the browser
        open::that_detached(url)
    }
}
