//! Presenter sink that writes the transcript to stdout.

use std::io::{self, Write};
use std::sync::Mutex;

use handle_widget::{PresenterSink, SlotId};

/// Prints slots as they change. Slots are written one after another, so
/// two answers typed at once interleave word by word, each word tagged
/// when the writing slot changes.
pub struct TerminalSink<W: Write + Send> {
    out: Mutex<Output<W>>,
}

struct Output<W> {
    writer: W,
    /// Slot whose line is currently open.
    open: Option<SlotId>,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: Mutex::new(Output { writer, open: None }),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .writer
    }

    fn with(&self, f: impl FnOnce(&mut Output<W>) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = f(&mut out).and_then(|_| out.writer.flush()) {
            tracing::debug!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write> Output<W> {
    /// Start writing on `slot`'s line.
    fn enter(&mut self, slot: SlotId) -> io::Result<()> {
        if self.open != Some(slot) {
            self.close()?;
            write!(self.writer, "[{slot}] ")?;
            self.open = Some(slot);
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.open.take().is_some() {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn line(&mut self, slot: SlotId, text: &str) -> io::Result<()> {
        self.close()?;
        writeln!(self.writer, "[{slot}] {text}")
    }
}

impl<W: Write + Send> PresenterSink for TerminalSink<W> {
    fn indicator(&self, slot: SlotId, visible: bool) {
        if visible {
            self.with(|out| out.line(slot, "..."));
        }
    }

    fn clear(&self, _slot: SlotId) {}

    fn append(&self, slot: SlotId, text: &str) {
        self.with(|out| {
            out.enter(slot)?;
            write!(out.writer, "{}", text.replace('\u{a0}', " "))
        });
    }

    fn settle(&self, slot: SlotId, _html: &str) {
        self.with(|out| {
            if out.open == Some(slot) {
                out.close()?;
            }
            Ok(())
        });
    }

    fn plain(&self, slot: SlotId, text: &str) {
        self.with(|out| out.line(slot, text));
    }

    fn feedback(&self, slot: SlotId, visible: bool) {
        if visible {
            self.with(|out| out.line(slot, &format!("rate with /up {slot} or /down {slot}")));
        }
    }

    fn citations(&self, slot: SlotId, citations: &str) {
        self.with(|out| out.line(slot, &format!("sources: {citations}")));
    }

    fn remove(&self, slot: SlotId) {
        self.with(|out| out.line(slot, "(deleted)"));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn typed_words_share_one_line() {
        let sink = TerminalSink::new(Vec::new());
        sink.indicator(1, true);
        sink.append(1, "Hello\u{a0}");
        sink.append(1, "world\u{a0}");
        sink.settle(1, "<p>Hello world</p>");
        sink.feedback(1, true);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "[1] ...\n[1] Hello world \n[1] rate with /up 1 or /down 1\n");
    }

    #[test]
    fn interleaved_slots_are_tagged() {
        let sink = TerminalSink::new(Vec::new());
        sink.append(1, "a\u{a0}");
        sink.append(2, "b\u{a0}");
        sink.plain(3, "Welcome!");

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "[1] a \n[2] b \n[3] Welcome!\n");
    }
}
