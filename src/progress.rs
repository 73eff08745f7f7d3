use std::fmt::Write;

use indicatif::{
    ProgressBar,
    ProgressState,
    ProgressStyle,
};

use crate::{
    utils::format_size,
    Error,
};

/// Receives byte counts while an archive is streamed to disk.
pub trait ProgressSink {
    fn start(&mut self, total: u64);

    /// `received` is the cumulative number of bytes written so far.
    fn update(&mut self, received: u64);

    fn finish(&mut self);
}

/// Redraws a 50 cell bar in place on the terminal.
pub struct TerminalProgress {
    style: ProgressStyle,
    progress_bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Result<Self, Error> {
        let style = ProgressStyle::with_template("[{bar:50}] {received}/{expected}")?
            .with_key("received", |state: &ProgressState, w: &mut dyn Write| {
                let _ = write!(w, "{:<6}", format_size(state.pos()));
            })
            .with_key("expected", |state: &ProgressState, w: &mut dyn Write| {
                let _ = write!(w, "{:<6}", format_size(state.len().unwrap_or(0)));
            })
            .progress_chars("= ");

        Ok(Self {
            style,
            progress_bar: None,
        })
    }
}

impl ProgressSink for TerminalProgress {
    fn start(&mut self, total: u64) {
        let progress_bar = ProgressBar::new(total);
        progress_bar.set_style(self.style.clone());
        self.progress_bar = Some(progress_bar);
    }

    fn update(&mut self, received: u64) {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_position(received);
        }
    }

    fn finish(&mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish();
        }
    }
}
