use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use parley_core::{ChatRole, NoticeKind, TextInput};
use crate::app::{App, FocusPane};

const SIDEBAR_WIDTH: u16 = 34;

/// Render one line of assistant markdown: headings, bullets, **bold** and `code`
fn render_markdown_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();

    if let Some(heading) = trimmed.trim_start_matches('#').strip_prefix(' ').filter(|_| trimmed.starts_with('#')) {
        return Line::from(Span::styled(
            heading.trim().to_string(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ));
    }

    let (prefix, body) = match trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        Some(rest) => ("  • ", rest),
        None => ("", line),
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    if !prefix.is_empty() {
        spans.push(Span::raw(prefix));
    }

    let mut current_text = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut bold_text = String::new();
                let mut found_close = false;
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(std::mem::take(&mut current_text)));
                    }
                    spans.push(Span::styled(bold_text, Style::default().add_modifier(Modifier::BOLD)));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            }
            '`' => {
                let code: String = chars.by_ref().take_while(|&c| c != '`').collect();
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(code, Style::default().fg(Color::Magenta)));
            }
            c => current_text.push(c),
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, chat_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_chat(app, frame, chat_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" parley ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("→ {}", app.endpoint), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.focus {
        FocusPane::Sidebar => " Enter: save key  Tab: chat  Ctrl-C: quit",
        FocusPane::Chat => " Enter: send  PgUp/PgDn: scroll  Tab: API key  Ctrl-C: quit",
    };

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(
            "Your message will be sent to the ChatGPT Completions API.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));

    frame.render_widget(footer, area);
}

fn border_color(focused: bool) -> Color {
    if focused { Color::Cyan } else { Color::DarkGray }
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Sidebar;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(" API Key ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [input_area, button_area, status_area, notice_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(inner);

    // Masked key field, one mask char per key char so the cursor lines up
    let masked = app.key_form.masked();
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let scroll_offset = input_scroll_offset(&app.key_form.input, inner_width);
    let input_text = if masked.is_empty() {
        Span::styled("API Key...", Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = masked.chars().skip(scroll_offset).take(inner_width).collect();
        Span::styled(visible, Style::default().fg(Color::Cyan))
    };
    let input = Paragraph::new(Line::from(input_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray })),
    );
    frame.render_widget(input, input_area);

    if focused {
        set_input_cursor(frame, &app.key_form.input, input_area);
    }

    let button_style = if app.key_form.can_submit() {
        Style::default().fg(Color::White).bg(Color::Blue).bold()
    } else {
        Style::default().fg(Color::Black).bg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(" Save ", button_style))).alignment(Alignment::Center),
        button_area,
    );

    let status = if app.credentials.is_set() {
        Span::styled("✓ Key saved", Style::default().fg(Color::Green))
    } else {
        Span::styled("No key set", Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Paragraph::new(Line::from(status)), status_area);

    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Destructive => Color::Red,
        };
        let text = Text::from(vec![
            Line::from(Span::styled(notice.title.clone(), Style::default().fg(color).bold())),
            Line::from(notice.description.clone()),
        ]);
        let notice_widget = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(color)));
        frame.render_widget(notice_widget, notice_area);
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = history_area.height.saturating_sub(2);
    app.chat_width = history_area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Chat;
    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(format!(" Chat ({}) ", app.conversation.session_id()));

    let history_text = if app.conversation.turns().is_empty() {
        Text::from(Span::styled(
            "Send a message to start chatting...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for turn in app.conversation.turns() {
            let role_style = match turn.role {
                ChatRole::User => Style::default().fg(Color::Cyan),
                ChatRole::Assistant => Style::default().fg(Color::Yellow),
                ChatRole::Error => Style::default().fg(Color::Red),
            };
            lines.push(Line::from(Span::styled(
                format!("{}:", turn.role.label()),
                role_style.add_modifier(Modifier::BOLD),
            )));

            if turn.is_pending() {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            } else {
                match turn.role {
                    ChatRole::Assistant => lines.extend(turn.text().lines().map(render_markdown_line)),
                    ChatRole::User => lines.extend(turn.text().lines().map(|l| Line::from(l.to_string()))),
                    ChatRole::Error => lines.extend(
                        turn.text()
                            .lines()
                            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Red)))),
                    ),
                }
            }
            lines.push(Line::default());
        }

        Text::from(lines)
    };

    let history = Paragraph::new(history_text)
        .block(history_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(history, history_area);

    let pending = app.conversation.is_pending();
    let input_title = if pending { " Waiting for reply... " } else { " Message chatbot " };
    let input_color = if pending {
        Color::DarkGray
    } else if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let draft = &app.conversation.draft;
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let scroll_offset = input_scroll_offset(draft, inner_width);
    let visible_text: String = draft.value().chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(input_color))
                .title(input_title),
        );
    frame.render_widget(input, input_area);

    if focused {
        set_input_cursor(frame, draft, input_area);
    }
}

/// Horizontal scroll that keeps the cursor inside a field of `width` chars
fn input_scroll_offset(input: &TextInput, width: usize) -> usize {
    if width == 0 || input.cursor() < width {
        0
    } else {
        input.cursor() - width + 1
    }
}

/// Place the terminal cursor inside a bordered single-line field
fn set_input_cursor(frame: &mut Frame, input: &TextInput, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_x = (input.cursor() - input_scroll_offset(input, inner_width)) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use parley_core::TextInput;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_empty_conversation_shows_prompt() {
        let mut app = test_app(Some("sk-abcdef"));
        let screen = draw(&mut app);
        assert!(screen.contains("Send a message to start chatting..."));
        assert!(screen.contains("Key saved"));
        assert!(!screen.contains("sk-abcdef"));
    }

    #[tokio::test]
    async fn test_pending_turn_renders_thinking_indicator() {
        let mut app = test_app(Some("sk-abc"));
        app.conversation.draft = TextInput::with_value("hello");
        app.submit_message();

        let screen = draw(&mut app);
        assert!(screen.contains("You:"));
        assert!(screen.contains("Thinking."));
        assert!(screen.contains("Waiting for reply..."));
        app.shutdown();
    }

    #[test]
    fn test_error_turn_renders_error_prefix() {
        let mut app = test_app(None);
        app.focus = FocusPane::Chat;
        app.conversation.draft = TextInput::with_value("hello");
        app.submit_message();

        let screen = draw(&mut app);
        assert!(screen.contains("Error:"));
        assert!(screen.contains("API Key Required"));
    }

    #[test]
    fn test_notice_is_rendered_in_sidebar() {
        let mut app = test_app(None);
        app.key_form.input = TextInput::with_value("  ");
        app.save_api_key();

        let screen = draw(&mut app);
        assert!(screen.contains("API key cannot be empty."));
    }

    #[test]
    fn test_markdown_bold_and_code_spans() {
        let line = render_markdown_line("use **bold** and `code`");
        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["use ", "bold", " and ", "code"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_bullets_and_headings() {
        let bullet = render_markdown_line("- item");
        assert_eq!(bullet.spans[0].content, "  • ");
        let heading = render_markdown_line("## Title");
        assert_eq!(heading.spans[0].content, "Title");
    }

    #[test]
    fn test_sidebar_cursor_follows_masked_key() {
        let mut app = test_app(None);
        let key = format!("sk-{}wxyz", "a".repeat(44));
        app.key_form.input = TextInput::with_value(&key);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        // Field text row is y=3, inner columns start at x=2 and are 30 wide
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (31, 3));
        let buffer = terminal.backend().buffer();
        let row: String = (2..31).map(|x| buffer[(x, 3)].symbol().to_string()).collect();
        assert!(row.ends_with("wxyz"));
        assert!(row.trim_end().starts_with('*'));

        app.key_form.input.move_home();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (2, 3));
    }

    #[test]
    fn test_input_scroll_keeps_cursor_visible() {
        let input = TextInput::with_value("abcdefghij");
        assert_eq!(input_scroll_offset(&input, 20), 0);
        assert_eq!(input_scroll_offset(&input, 5), 6);
    }
}
