//! Showing the map panel on a terminal
//!
//! With an interactive terminal the panel is drawn with ratatui in the
//! alternate screen until a key is pressed; otherwise the rendered text is
//! printed as is.

use crate::config::MapperConfig;
use crate::error::Result;
use crate::grid::{GridRenderer, RenderedMap};
use crate::map::Map;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Ratatui when attached to a terminal, plain text otherwise
    #[default]
    Auto,
    Ratatui,
    Plain,
}

#[derive(Debug)]
pub struct ViewCapabilities {
    pub has_terminal: bool,
    pub is_interactive: bool,
}

impl ViewCapabilities {
    pub fn detect() -> Self {
        Self {
            has_terminal: atty::is(atty::Stream::Stdout),
            is_interactive: atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout),
        }
    }

    pub fn supports_ratatui(&self) -> bool {
        self.has_terminal && self.is_interactive
    }
}

/// The rendered grid inside a bordered block titled with the current room
pub struct MapPanel<'a> {
    rendered: &'a RenderedMap,
    current_glyph: &'a str,
}

impl<'a> MapPanel<'a> {
    pub fn new(rendered: &'a RenderedMap, current_glyph: &'a str) -> Self {
        Self {
            rendered,
            current_glyph,
        }
    }

    pub fn widget(&self) -> Paragraph<'a> {
        let lines: Vec<Line> = self
            .rendered
            .text
            .lines()
            .map(|line| highlight(line, self.current_glyph))
            .collect();
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(self.rendered.title.clone()),
        )
    }

    /// Grid size plus the border
    pub fn size(&self) -> (u16, u16) {
        let width = self.rendered.text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let height = self.rendered.text.lines().count();
        (width as u16 + 2, height as u16 + 2)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (width, height) = self.size();
        let area = Rect {
            width: width.min(area.width),
            height: height.min(area.height),
            ..area
        };
        frame.render_widget(self.widget(), area);
    }
}

fn highlight<'a>(line: &'a str, glyph: &str) -> Line<'a> {
    let pos = match line.find(glyph) {
        Some(pos) if !glyph.is_empty() => pos,
        _ => return Line::from(line),
    };
    let end = pos + glyph.len();
    Line::from(vec![
        Span::raw(&line[..pos]),
        Span::styled(
            &line[pos..end],
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(&line[end..]),
    ])
}

/// Render the map around the current room and show it. Returns false when the
/// map has no current room.
pub fn show_map(map: &Map, mode: ViewMode, config: &MapperConfig) -> Result<bool> {
    let renderer = GridRenderer::new(config.grid.clone());
    let rendered = match renderer.render_map(map, config.grid.width, config.grid.height, None) {
        Some(rendered) => rendered,
        None => return Ok(false),
    };

    let use_ratatui = match mode {
        ViewMode::Auto => ViewCapabilities::detect().supports_ratatui(),
        ViewMode::Ratatui => true,
        ViewMode::Plain => false,
    };
    debug!("Showing map with {}", if use_ratatui { "ratatui" } else { "plain text" });

    if use_ratatui {
        show_in_terminal(&MapPanel::new(&rendered, &config.grid.current))?;
    } else {
        println!("{}", rendered.title);
        println!("{}", rendered.text);
    }
    Ok(true)
}

fn show_in_terminal(panel: &MapPanel) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = (|| -> io::Result<()> {
        terminal.draw(|f| panel.render(f, f.size()))?;
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => break,
                Event::Resize(_, _) => {
                    terminal.draw(|f| panel.render(f, f.size()))?;
                }
                _ => {}
            }
        }
        Ok(())
    })();

    // always restore the terminal, even after a draw error
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}
