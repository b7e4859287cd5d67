use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};

use crate::app::{App, DispatchMode, LocationStatus, Message, MessageRole};
use crate::gemini::GroundingChunk;

/// Convert `**bold**` markup to styled spans. Unbalanced markers are left
/// as literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() % 2 == 0 {
        // Odd number of ** markers; don't guess, render verbatim
        return Line::from(text.to_string());
    }

    let spans: Vec<Span<'static>> = parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(part.to_string())
            }
        })
        .collect();

    Line::from(spans)
}

/// Citation chip for one grounding chunk: a link line for web sources, a
/// place line (plus optional review snippet) for maps sources, nothing for
/// an empty chunk.
pub fn grounding_chip_lines(chunk: &GroundingChunk) -> Vec<Line<'static>> {
    if let Some(web) = &chunk.web {
        return vec![Line::from(vec![
            Span::styled("  ⌕ ", Style::default().fg(Color::Blue)),
            Span::styled(web.title.clone(), Style::default().fg(Color::Blue)),
            Span::styled(format!("  {}", web.uri), Style::default().fg(Color::DarkGray)),
        ])];
    }

    if let Some(maps) = &chunk.maps {
        let mut lines = vec![Line::from(vec![
            Span::styled("  ⚑ ", Style::default().fg(Color::Yellow)),
            Span::styled(maps.title.clone(), Style::default().fg(Color::Yellow)),
            Span::styled(format!("  {}", maps.uri), Style::default().fg(Color::DarkGray)),
        ])];

        let snippet = maps
            .place_answer_sources
            .as_ref()
            .and_then(|s| s.review_snippets.first());
        if let Some(snippet) = snippet {
            lines.push(Line::from(Span::styled(
                format!("    \"{}\"", snippet.content),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        return lines;
    }

    Vec::new()
}

/// Render one transcript entry: role label, body text verbatim, citation
/// chips, timestamp.
pub fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match msg.role {
        MessageRole::Model => {
            let mut header = vec![Span::styled(
                "TOWPRO DISPATCH",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )];
            if msg.is_thinking {
                header.push(Span::styled(
                    " [thinking]",
                    Style::default().fg(Color::Magenta),
                ));
            }
            lines.push(Line::from(header));

            for line in msg.text.lines() {
                lines.push(parse_markdown_line(line));
            }

            if let Some(grounding) = &msg.grounding {
                for chunk in &grounding.grounding_chunks {
                    lines.extend(grounding_chip_lines(chunk));
                }
            }
        }
        MessageRole::User => {
            lines.push(Line::from(Span::styled(
                "You",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    }

    lines.push(Line::from(Span::styled(
        msg.timestamp.format("%I:%M %p").to_string(),
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    let [sidebar_area, chat_area] =
        Layout::horizontal([Constraint::Length(34), Constraint::Min(0)]).areas(body_area);

    render_sidebar(app, frame, sidebar_area);
    render_chat(app, frame, chat_area);

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " TowPro.AI ",
            Style::default().fg(Color::White).bg(Color::Red).bold(),
        ),
        Span::styled(
            " 24/7 EMERGENCY DISPATCH ",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let [status_area, mode_area, emergency_area] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Min(0),
        Constraint::Length(5),
    ])
    .areas(area);

    render_status_card(app, frame, status_area);
    render_mode_card(app, frame, mode_area);
    render_emergency_card(frame, emergency_area);
}

fn render_status_card(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" System Status ");

    let location_style = match app.location_status {
        LocationStatus::Granted => Style::default().fg(Color::Blue),
        LocationStatus::Requesting => Style::default().fg(Color::Yellow),
        LocationStatus::Idle | LocationStatus::Denied => Style::default().fg(Color::DarkGray),
    };

    let lines = vec![
        Line::from(vec![
            Span::raw(" Agent             "),
            Span::styled("● Online", Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw(" Location Services "),
            Span::styled(app.location_status.label(), location_style),
        ]),
        Line::from(vec![
            Span::raw(" Wait Time         "),
            Span::styled("~35 mins", Style::default().fg(Color::Yellow)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_mode_card(app: &App, frame: &mut Frame, area: Rect) {
    let mode_color = match app.mode {
        DispatchMode::Standard => Color::Cyan,
        DispatchMode::Complex => Color::Magenta,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(mode_color))
        .title(" Dispatch Mode ");

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", app.mode.display_name()),
            Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {}", app.mode.tagline()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!(" {}", app.mode.description()),
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(" Ctrl+T ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" switch mode"),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_emergency_card(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let lines = vec![
        Line::from(Span::styled(
            " ☎ CALL 911 ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(Span::styled(
            "If you are in immediate danger",
            Style::default().fg(Color::Red),
        ))
        .centered(),
        Line::from(Span::styled(
            "or injured, call 911 immediately.",
            Style::default().fg(Color::Red),
        ))
        .centered(),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [banner_area, transcript_area, input_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    render_safety_banner(frame, banner_area);
    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
}

fn render_safety_banner(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Safety First ");

    let lines = vec![
        Line::from(
            " Do not exit your vehicle if you are on an active highway. Turn on your hazard lights.",
        ),
        Line::from(" Wait for the dispatch agent to confirm your location."),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(Color::Yellow))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Dispatch Channel ");

    let inner = block.inner(area);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        lines.extend(message_lines(msg));
        lines.push(Line::default());
    }

    if app.loading {
        lines.push(Line::from(Span::styled(
            "TOWPRO DISPATCH",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("{}{}", app.mode.loading_caption(), dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Count wrapped rows, not logical lines: the paragraph renders with
    // Wrap, so a long reply occupies width/wrap_width rows per line and the
    // scroll bound has to match what scroll_to_bottom estimated.
    let wrap_width = inner.width.max(1) as usize;
    app.total_chat_lines = lines
        .iter()
        .map(|line| (line.width() / wrap_width + 1) as u16)
        .sum();
    // Clamp in case the estimate from scroll_to_bottom overshot
    app.chat_scroll = app
        .chat_scroll
        .min(app.total_chat_lines.saturating_sub(app.chat_height));

    let transcript = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(transcript, area);

    if app.total_chat_lines > app.chat_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.total_chat_lines as usize)
            .position(app.chat_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if app.loading {
        (Color::DarkGray, " Dispatch in progress... ")
    } else {
        (Color::Cyan, " Type your location and emergency (Enter to send) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor visible in a single-line input
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || app.input_cursor < inner_width {
        0
    } else {
        app.input_cursor - inner_width + 1
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::White))
        .block(block);

    frame.render_widget(input, area);

    if !app.loading {
        let cursor_x = (app.input_cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.mode {
        DispatchMode::Standard => Style::default().bg(Color::Cyan).fg(Color::Black),
        DispatchMode::Complex => Style::default().bg(Color::Magenta).fg(Color::White),
    };
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let footer_content = Line::from(vec![
        Span::styled(
            match app.mode {
                DispatchMode::Standard => " STANDARD ",
                DispatchMode::Complex => " COMPLEX ",
            },
            mode_style,
        ),
        Span::styled(" ", label_style),
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Ctrl+T ", key_style),
        Span::styled(" mode ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
        Span::styled(
            " Powered by Gemini 2.5 Flash (Standard) & Gemini 3 Pro (Complex)",
            Style::default().bg(Color::Black).fg(Color::DarkGray),
        ),
    ]);

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
