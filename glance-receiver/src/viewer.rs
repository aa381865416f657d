//! Terminal frame viewer.
//!
//! Renders decoded frames with `ratatui-image`, which picks the best
//! graphics protocol the terminal supports:
//! - Sixel (Windows Terminal, xterm, foot, WezTerm, …)
//! - Kitty graphics protocol (Kitty, WezTerm, Ghostty)
//! - iTerm2 inline images (iTerm2, WezTerm)
//! - Halfblocks fallback (any terminal with 24-bit color)
//!
//! The exit gesture is `q` or `Esc`, polled without blocking between
//! frames. While the viewer is open, raw mode owns the terminal, so
//! the binary routes its logs to stderr.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use image::{DynamicImage, RgbImage};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui_image::StatefulImage;
use ratatui_image::picker::{Picker, ProtocolType};

use glance_core::GlanceError;
use glance_core::stream::{DisplaySink, PixelFormat, RawFrame};

// ── TerminalViewer ───────────────────────────────────────────────

pub struct TerminalViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    picker: Picker,
    open: bool,
}

impl TerminalViewer {
    /// Detect the terminal graphics protocol and enter the alternate
    /// screen. Must run before any other terminal output.
    pub fn new(force_protocol: Option<&str>) -> Result<Self, GlanceError> {
        // Query the terminal before raw mode changes its behavior.
        let picker = create_picker(force_protocol);

        enable_raw_mode().map_err(term_err)?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, EnterAlternateScreen).map_err(term_err)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(term_err)?;

        Ok(Self {
            terminal,
            picker,
            open: true,
        })
    }
}

fn term_err(e: io::Error) -> GlanceError {
    GlanceError::RenderFailed(e.to_string())
}

/// Pick a graphics protocol: an explicit `--graphics` choice wins,
/// otherwise query the terminal and fall back to halfblocks when it
/// stays quiet.
fn create_picker(force_protocol: Option<&str>) -> Picker {
    if let Some(name) = force_protocol {
        let proto = match name.to_lowercase().as_str() {
            "sixel" => Some(ProtocolType::Sixel),
            "kitty" => Some(ProtocolType::Kitty),
            "iterm2" | "iterm" => Some(ProtocolType::Iterm2),
            "halfblocks" | "half" => Some(ProtocolType::Halfblocks),
            _ => None,
        };
        match proto {
            Some(proto) => {
                let mut picker = Picker::halfblocks();
                picker.set_protocol_type(proto);
                return picker;
            }
            None => eprintln!("unknown graphics protocol '{name}', auto-detecting"),
        }
    }

    Picker::from_query_stdio().unwrap_or_else(|_| Picker::halfblocks())
}

impl DisplaySink for TerminalViewer {
    fn render(&mut self, frame: &RawFrame) -> Result<(), GlanceError> {
        if frame.format != PixelFormat::Rgb8 {
            return Err(GlanceError::RenderFailed(
                "viewer expects packed RGB frames".into(),
            ));
        }
        let img = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| {
                GlanceError::RenderFailed("frame buffer does not match dimensions".into())
            })?;

        let mut protocol = self
            .picker
            .new_resize_protocol(DynamicImage::ImageRgb8(img));
        self.terminal
            .draw(|f| {
                f.render_stateful_widget(StatefulImage::default(), f.area(), &mut protocol);
            })
            .map_err(term_err)?;
        Ok(())
    }

    fn poll_exit(&mut self) -> Result<bool, GlanceError> {
        while event::poll(Duration::ZERO).map_err(term_err)? {
            if let Event::Key(key) = event::read().map_err(term_err)? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for TerminalViewer {
    fn drop(&mut self) {
        self.close();
    }
}
