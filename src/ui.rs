use crate::app::{App, Focus};
use crate::braille;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Scroll ceiling for the help overlay; generous so wrapped text on
/// narrow terminals stays reachable
pub const HELP_CONTENT_LINES: u16 = 40;

/// Line count of the controls box content
pub const CONTROLS_CONTENT_LINES: u16 = 16;

// Sidebar palette
const FRAME_COLOR: Color = Color::Cyan;
const ACCENT_COLOR: Color = Color::Yellow;
const FG_COLOR: Color = Color::White;
const DIM_FG_COLOR: Color = Color::Gray;

/// Rounded-border block used for every sidebar box
fn bordered_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(FRAME_COLOR))
        .title(title)
}

/// Top-level frame render
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Inner canvas size in cells, borders excluded
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

/// Visible content lines of the controls box for a given terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    // Sidebar: status (5) + params (9) + controls borders (2)
    terminal_height.saturating_sub(5 + 9 + 2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Status
            Constraint::Length(9), // Parameters + matrix row
            Constraint::Min(10),   // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = bordered_block(" Atom Life ");

    let status_text = if app.world.running { "RUNNING" } else { "PAUSED" };
    let status_color = if app.world.running { FRAME_COLOR } else { ACCENT_COLOR };

    let content = vec![
        Line::from(Span::styled(
            format!("{} atoms", app.world.particles().len()),
            Style::default().fg(FG_COLOR),
        )),
        Line::from(Span::styled(
            format!("{} species", app.roster.len()),
            Style::default().fg(DIM_FG_COLOR),
        )),
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = bordered_block(" Species ");

    let make_line = |label: &str, value: String, swatch: Option<Color>, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(ACCENT_COLOR)
        } else {
            Style::default().fg(FG_COLOR)
        };
        let mut spans = vec![Span::styled(format!("{}{}: ", prefix, label), style)];
        if let Some(color) = swatch {
            spans.push(Span::styled("██ ", Style::default().fg(color)));
        }
        spans.push(Span::styled(value, style));
        Line::from(spans)
    };

    let selected = app.roster.at(app.selected);
    let target = app.roster.at(app.target);

    let attraction = match (selected, target) {
        (Some(from), Some(to)) => format!("{:+.2}", app.roster.attraction(from.id, to.id)),
        _ => "-".to_string(),
    };

    let content = vec![
        make_line(
            "Species",
            selected.map_or("-".to_string(), |s| s.color.name()),
            selected.map(|s| s.color.to_ratatui()),
            app.focus == Focus::Species,
        ),
        make_line(
            "Pop",
            selected.map_or("-".to_string(), |s| s.population.to_string()),
            None,
            app.focus == Focus::Population,
        ),
        make_line(
            "Target",
            target.map_or("-".to_string(), |s| s.color.name()),
            target.map(|s| s.color.to_ratatui()),
            app.focus == Focus::Target,
        ),
        make_line("Pull", attraction, None, app.focus == Focus::Attraction),
        make_line(
            "Speed",
            format!("{}", app.ticks_per_frame),
            None,
            app.focus == Focus::Speed,
        ),
        matrix_row(app),
    ];

    // Keep the focused item visible in short terminals
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0
    } else if focus_line >= visible_height {
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// The selected species' full attraction row, one colored cell per target
fn matrix_row(app: &App) -> Line<'_> {
    let Some(selected) = app.roster.at(app.selected) else {
        return Line::from(Span::styled("  (no species)", Style::default().fg(DIM_FG_COLOR)));
    };

    let mut spans = vec![Span::styled("  ", Style::default())];
    for (i, other) in app.roster.species().iter().enumerate() {
        let g = app.roster.attraction(selected.id, other.id);
        let marker = if i == app.target { "▣" } else { "■" };
        // Sign at a glance: green pull, red push, gray neutral
        let color = if g > 0.0 {
            Color::Green
        } else if g < 0.0 {
            Color::Red
        } else {
            Color::DarkGray
        };
        spans.push(Span::styled(marker, Style::default().fg(color)));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(ACCENT_COLOR);
    let desc_style = Style::default().fg(DIM_FG_COLOR);

    let key_line = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        key_line("Space", "pause/resume".to_string()),
        key_line("R", "reset".to_string()),
        key_line("A", "add species".to_string()),
        key_line("X", "remove species".to_string()),
        key_line("Z", "randomize matrix".to_string()),
        key_line("C", "recolor species".to_string()),
        key_line("W", "save as preset".to_string()),
        key_line("[/]", "select species".to_string()),
        key_line(",/.", "select target".to_string()),
        key_line("1-9", "presets".to_string()),
        key_line("Tab", "cycle focus".to_string()),
        key_line("↑/↓", "adjust focused".to_string()),
        key_line("+/-", "speed".to_string()),
        key_line("V", "fullscreen".to_string()),
        key_line("H", "help".to_string()),
        key_line("Q", "quit".to_string()),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = bordered_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = bordered_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(&app.world, &app.roster, inner.width, inner.height);

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
            let paragraph = Paragraph::new(Line::from(span));
            frame.render_widget(paragraph, cell_rect);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Overlay sits over the canvas, not the sidebar
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    let help_width = 58.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(32);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("ATOM LIFE", Style::default().fg(FRAME_COLOR))),
        Line::from(""),
        Line::from("Each species pulls or pushes every other species (and itself) with a coefficient between -1 and 1. Short-range forces, damped motion, and wall bounces produce cells, chases, and orbits."),
        Line::from(""),
        Line::from(Span::styled("EDITING:", Style::default().fg(ACCENT_COLOR))),
        Line::from("[/] pick the species to edit, ,/. pick the target of its attraction, Tab+arrows adjust. Population and add/remove rebuild the world; attraction edits apply live."),
        Line::from(""),
        Line::from(Span::styled("MATRIX ROW:", Style::default().fg(ACCENT_COLOR))),
        Line::from("One square per target species: green = pull, red = push, gray = neutral. The hollow square marks the current target."),
        Line::from(""),
        Line::from(Span::styled("PRESETS (1-9):", Style::default().fg(ACCENT_COLOR))),
        Line::from("1=Trio, 2=Chasers, 3=Orbits, 4=Cells, 5=Membranes, 6=Soup, 7=Lattice"),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(ACCENT_COLOR))),
        Line::from("Space=Pause, R=Reset, A=Add, X=Remove, Z=Randomize, C=Recolor, W=Save preset, V=Fullscreen, +/-=Speed, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(ACCENT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
