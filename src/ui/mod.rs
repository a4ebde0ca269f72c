// ui/mod.rs

pub mod spinner;

use crate::app::{App, Entry, investigation_entries};
use crate::game_state::{GamePhase, PendingInvestigation, SessionState};
use crate::message::Sender;
use crate::prompts::PARTNER_NAME;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use tui_textarea::TextArea;

pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;

const PAPER: Color = Color::Rgb(228, 216, 180);
const INK: Color = Color::Rgb(200, 187, 161);

pub fn dialogue_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .title(" 你说 (Enter 发送, Esc 结束对话) "),
    );
    input.set_cursor_line_style(Style::default());
    input
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let warning = Paragraph::new("Terminal too small. Please resize.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(warning, area);
        return;
    }

    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(30), Constraint::Min(0)]).areas(area);
    let [content, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(main);

    draw_sidebar(frame, &app.view, sidebar);
    match app.view.phase {
        GamePhase::Starting => draw_loading(frame, app, content),
        GamePhase::Narrative => draw_narrative(frame, &app.view, content),
        GamePhase::Investigation => draw_investigation(frame, app, content),
        GamePhase::Dialogue => draw_dialogue(frame, app, content),
    }
    if let Some(pending) = &app.view.pending_investigation {
        draw_clue_popup(frame, pending, content);
    }
    draw_status(frame, &app.view, status);
}

fn draw_sidebar(frame: &mut Frame, view: &SessionState, area: Rect) {
    let mut lines = vec![Line::from("玲珑府".bold().fg(PAPER)), Line::default()];

    if let Some(scene) = &view.scene {
        lines.push(Line::from(vec!["地点  ".fg(INK), Span::raw(scene.location.clone())]));
        lines.push(Line::default());
        lines.push(Line::from("在场人物".fg(INK)));
        lines.push(Line::from(format!("  {PARTNER_NAME} (搭档)")));
        for character in &scene.characters {
            let style = if view.active_character.as_deref() == Some(character.as_str()) {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::styled(format!("  {character}"), style));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(format!("线索 ({})", view.collected_clues.len()).fg(INK)));
    for clue in &view.collected_clues {
        lines.push(Line::from(format!("  · {}", clue.name)));
    }

    lines.push(Line::default());
    lines.push(Line::from("Ctrl+N 重开新案".dark_gray()));
    lines.push(Line::from("Ctrl+Q 退出".dark_gray()));

    let sidebar = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::RIGHT));
    frame.render_widget(sidebar, area);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let [center] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::Center)
        .areas(area);
    let text = if app.view.is_loading {
        Text::from(vec![
            Line::from(app.spinner.get_frame().to_string()),
            Line::from("正在加载案卷..."),
        ])
    } else if app.view.error.is_some() {
        Text::from("案卷加载失败，按 Enter 重试")
    } else {
        Text::from("按 Enter 开始")
    };
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).fg(PAPER),
        center,
    );
}

fn narrative_paragraph(view: &SessionState) -> Paragraph<'static> {
    let mut lines = vec![Line::from(view.narrative.speaker.clone().bold().fg(INK)), Line::default()];
    lines.extend(
        view.narrative
            .content
            .lines()
            .map(|paragraph| Line::from(paragraph.to_string())),
    );
    Paragraph::new(lines).wrap(Wrap { trim: false }).fg(PAPER)
}

fn draw_narrative(frame: &mut Frame, view: &SessionState, area: Rect) {
    let block = Block::bordered()
        .border_type(BorderType::Double)
        .title_bottom(Line::from(" 按 Enter 继续... ").centered());
    frame.render_widget(narrative_paragraph(view).block(block), area);
}

fn draw_investigation(frame: &mut Frame, app: &mut App, area: Rect) {
    let [story, menu] =
        Layout::vertical([Constraint::Percentage(45), Constraint::Min(0)]).areas(area);

    let location = app
        .view
        .scene
        .as_ref()
        .map(|scene| scene.location.clone())
        .unwrap_or_default();
    frame.render_widget(
        narrative_paragraph(&app.view).block(Block::bordered().title(format!(" {location} "))),
        story,
    );

    let items: Vec<ListItem> = investigation_entries(&app.view)
        .into_iter()
        .map(|entry| match entry {
            Entry::Point(point) => ListItem::new(format!("🔍 {}", point.name)),
            Entry::Character(name) => ListItem::new(format!("💬 与{name}对话")),
            Entry::Partner => ListItem::new(format!("🪭 请教{PARTNER_NAME}")),
        })
        .collect();
    let title = if app.view.is_loading {
        spinner::thinking(&app.spinner, "")
    } else {
        " 调查 (↑↓ 选择, Enter 确认) ".to_string()
    };
    let list = List::new(items)
        .block(Block::bordered().title(title))
        .highlight_style(Style::default().fg(Color::Black).bg(PAPER))
        .highlight_symbol("› ");
    frame.render_stateful_widget(list, menu, &mut app.selection);
}

fn draw_dialogue(frame: &mut Frame, app: &App, area: Rect) {
    let [history, input] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let mut lines = Vec::new();
    for message in &app.view.dialogue_history {
        let speaker = message.speaker.clone().unwrap_or_default();
        let (alignment, colour) = match message.sender {
            Sender::Player => (Alignment::Right, INK),
            Sender::Storyteller => (Alignment::Left, PAPER),
        };
        lines.push(Line::from(speaker.bold().fg(colour)).alignment(alignment));
        for paragraph in message.content.lines() {
            lines.push(Line::from(paragraph.to_string()).alignment(alignment));
        }
        lines.push(Line::default());
    }
    if app.view.is_loading {
        lines.push(Line::from(spinner::thinking(&app.spinner, app.active_speaker()).italic()));
    }

    // Keep the latest lines in view.
    let inner_height = history.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;
    let title = format!(" 与{}对话 ", app.active_speaker());
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::bordered().title(title));
    frame.render_widget(paragraph, history);
    frame.render_widget(&app.input, input);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn draw_clue_popup(frame: &mut Frame, pending: &PendingInvestigation, area: Rect) {
    let area = popup_area(area, 60, 40);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", pending.point.name))
        .title_bottom(Line::from(" Enter 收入线索 ").centered());
    let popup = Paragraph::new(pending.description.clone())
        .wrap(Wrap { trim: false })
        .fg(PAPER)
        .block(block);
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn draw_status(frame: &mut Frame, view: &SessionState, area: Rect) {
    let status = match &view.error {
        Some(error) => Paragraph::new(error.clone()).fg(Color::White).bg(Color::Red),
        None => Paragraph::new(format!(" {}", view.phase)).dark_gray(),
    };
    frame.render_widget(status.alignment(Alignment::Center), area);
}
