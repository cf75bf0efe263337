use crate::app::{App, Focus};
use crate::blocks::{self, UPPER_HALF_BLOCK};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

// UI color scheme
const BORDER_COLOR: Color = Color::LightRed;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
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

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Status
            Constraint::Length(8), // Parameters
            Constraint::Min(6),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Doom Fire ");
    let sim = &app.simulation;

    let (status_text, status_color) = if app.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if sim.settings().fire_active {
        ("BURNING", Color::LightRed)
    } else {
        ("EXTINGUISHED", DIM_TEXT_COLOR)
    };

    let fps_style = if app.stats.frame_missed {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(TEXT_COLOR)
    };
    let missed = if app.stats.frame_missed { " !" } else { "" };

    let mut content = vec![
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
        Line::from(Span::styled(
            format!("{}/{} fps{}", app.stats.actual_fps, app.target_fps, missed),
            fps_style,
        )),
        Line::from(Span::styled(
            format!("{}x{} {}", sim.width(), sim.height(), app.preset_name()),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];
    if let Some(message) = &app.status_message {
        content.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(HIGHLIGHT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = app.simulation.settings();

    let content = vec![
        make_line("Fade", format!("{:.2}", settings.fade_speed), app.focus == Focus::Fade),
        make_line("Spread", format!("{:.2}", settings.spread), app.focus == Focus::Spread),
        make_line("Wind", format!("{:+.1}", settings.wind), app.focus == Focus::Wind),
        make_line("Bits", format!("{}", settings.precision_bits), app.focus == Focus::Bits),
        make_line("FPS", format!("{}", app.target_fps), app.focus == Focus::Fps),
        make_line("Scale", format!("1/{}", app.downscale), app.focus == Focus::Downscale),
    ];

    // Keep the focused line visible when the box is short
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2);
    let scroll = if visible_height == 0 || focus_line < visible_height {
        0
    } else {
        focus_line.saturating_sub(visible_height - 1)
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let fire = if app.simulation.settings().fire_active {
        "put out"
    } else {
        "light"
    };
    let colors = if app.use_palette { "grayscale" } else { "palette" };

    let content = vec![
        make_control("Space", "pause/resume"),
        make_control(".", "single step"),
        make_control("F", fire),
        make_control("R", "reset"),
        make_control("C", colors),
        make_control("P", "next preset"),
        make_control("Tab", "select param"),
        make_control("↑/↓", "adjust"),
        make_control("[/]", "downscale"),
        make_control("+/-", "target fps"),
        make_control("S", "snapshot png"),
        make_control("V", "fullscreen"),
        make_control("H/?", "help"),
        make_control("Q", "quit"),
    ];

    let paragraph = Paragraph::new(content).block(styled_block(" Controls "));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sim = &app.simulation;
    let cells = blocks::render_to_blocks(
        sim.grid(),
        sim.width(),
        sim.height(),
        inner.width,
        inner.height,
        app.active_palette(),
    );

    // Write straight into the buffer; one widget per cell is too slow for a full canvas
    let buffer = frame.buffer_mut();
    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;
        if let Some(target) = buffer.cell_mut((x, y)) {
            target
                .set_char(UPPER_HALF_BLOCK)
                .set_fg(cell.top)
                .set_bg(cell.bottom);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    let help_width = 56.min(canvas_width.saturating_sub(4));
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

    let heading =
        |text: &'static str| Line::from(Span::styled(text, Style::default().fg(HIGHLIGHT_COLOR)));
    let term = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(TEXT_COLOR)));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("DOOM FIRE", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("The bottom row burns at full heat. Every step each cell copies its heat one row up, losing a random amount and drifting sideways."),
        Line::from(""),
        heading("PARAMETERS (Tab, then Up/Down):"),
        Line::from(""),
        term("Fade"),
        Line::from("Maximum heat lost per row. Higher values give shorter flames."),
        Line::from(""),
        term("Spread"),
        Line::from("How far heat may wander left or right per row."),
        Line::from(""),
        term("Wind"),
        Line::from("Constant sideways drift. Positive blows right."),
        Line::from(""),
        term("Bits"),
        Line::from("Random bits per draw. Few bits give banded flames; 0 turns randomness off."),
        Line::from(""),
        term("FPS / Scale"),
        Line::from("Target frame rate, and terminal pixels per fire cell."),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Pause, .=Step, F=Fire, R=Reset, C=Colors, P=Preset, S=Snapshot, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2);
    let is_scrollable = content_height > visible_height;

    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
