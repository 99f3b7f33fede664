use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::InputMode;
use crate::notify::NoticeKind;
use crate::types::Network;
use crate::ui_snapshot::UiSnapshot;
use crate::view::PerfTier;

// Nord palette
const TEXT: Color = Color::Rgb(216, 222, 233);
const TEXT_DIM: Color = Color::Rgb(106, 117, 137);
const FOCUS: Color = Color::Rgb(136, 192, 208);
const GOOD: Color = Color::Rgb(163, 190, 140);
const WARN: Color = Color::Rgb(235, 203, 139);
const BAD: Color = Color::Rgb(191, 97, 106);

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, snap: &UiSnapshot, mode: InputMode) {
    let search_expanded = mode == InputMode::Search || !snap.controls.search.is_empty();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(6);
    constraints.push(Constraint::Length(2)); // header
    constraints.push(Constraint::Length(3)); // stat cards
    if search_expanded {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0)); // table
    constraints.push(Constraint::Length(1)); // notice line
    constraints.push(Constraint::Length(2)); // footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], snap);
    idx += 1;
    stats(f, chunks[idx], snap);
    idx += 1;
    if search_expanded {
        search_bar(f, chunks[idx], snap, mode == InputMode::Search);
        idx += 1;
    }
    body(f, chunks[idx], snap);
    idx += 1;
    notice_line(f, chunks[idx], snap);
    idx += 1;
    footer(f, chunks[idx], snap);
}

// ===============================
// Header / Stats / Search
// ===============================
fn header(f: &mut Frame, area: Rect, snap: &UiSnapshot) {
    let mut spans = Vec::new();
    for (i, net) in Network::ALL.iter().enumerate() {
        spans.push(Span::raw(if i == 0 { "┌─" } else { "┬─" }));
        if *net == snap.network {
            spans.push(Span::styled(
                net.title(),
                Style::default().fg(FOCUS).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(net.title(), Style::default().fg(TEXT_DIM)));
        }
        spans.push(Span::raw("─"));
    }
    spans.push(Span::raw("┐ "));

    let status_color = if snap.network.is_live() { GOOD } else { WARN };
    spans.push(Span::styled(snap.network_status, Style::default().fg(status_color)));

    if snap.syncing {
        spans.push(Span::styled(" │ syncing…", Style::default().fg(WARN)));
    }
    if let Some(at) = &snap.last_updated {
        spans.push(Span::styled(
            format!(" │ Last updated: {at}"),
            Style::default().fg(TEXT_DIM),
        ));
    }
    spans.push(Span::styled(
        format!(" │ epoch {} slot {}", snap.epoch, snap.slot),
        Style::default().fg(TEXT_DIM),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain));
    f.render_widget(paragraph, area);
}

fn stats(f: &mut Frame, area: Rect, snap: &UiSnapshot) {
    let n = snap.stats.len().max(1) as u32;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, n); n as usize])
        .split(area);

    for (card, col) in snap.stats.iter().zip(cols.iter()) {
        let mut spans = vec![Span::styled(
            card.value.clone(),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )];
        if let Some(detail) = &card.detail {
            spans.push(Span::styled(format!(" {detail}"), Style::default().fg(TEXT_DIM)));
        }
        let w = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(format!(" {} ", card.label))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(TEXT_DIM)),
        );
        f.render_widget(w, *col);
    }
}

fn search_bar(f: &mut Frame, area: Rect, snap: &UiSnapshot, focused: bool) {
    let text = snap.controls.search.as_str();
    let border_color = if focused { FOCUS } else { TEXT_DIM };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(if focused { FOCUS } else { TEXT }))
        .block(
            Block::default()
                .title(" Search key / IP / data center ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border_color)),
        );
    f.render_widget(paragraph, area);

    if focused && area.width > 2 {
        let x = area.x + 1 + (text.chars().count().min(area.width.saturating_sub(2) as usize) as u16);
        f.set_cursor_position((x, area.y + 1));
    }
}

// ===============================
// Body
// ===============================
fn body(f: &mut Frame, area: Rect, snap: &UiSnapshot) {
    let table = &snap.table;

    let title = format!(
        " pNodes │ {} │ sort: {}{} ",
        table.count_label,
        snap.controls.sort.as_str(),
        if snap.controls.active_only { " │ active only" } else { "" }
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(FOCUS));

    if table.rows.is_empty() {
        let msg = if snap.generation == 0 {
            "Waiting for data…"
        } else {
            "No pNodes match the current filters"
        };
        let w = Paragraph::new(msg).style(Style::default().fg(TEXT_DIM)).block(block);
        f.render_widget(w, area);
        return;
    }

    let head = Row::new(vec![
        "pNode", "Status", "IP", "Data center", "Stake", "Comm.", "Perf.", "Version", "Last seen",
    ])
    .style(Style::default().fg(TEXT_DIM).add_modifier(Modifier::BOLD));

    let rows = table.rows.iter().map(|r| {
        let status_color = if r.is_active { GOOD } else { BAD };
        let tier_color = match r.tier {
            PerfTier::High => GOOD,
            PerfTier::Medium => WARN,
            PerfTier::Low => BAD,
        };
        Row::new(vec![
            Cell::from(r.short_key.clone()),
            Cell::from(r.status).style(Style::default().fg(status_color)),
            Cell::from(r.ip.clone()),
            Cell::from(r.data_center.clone()),
            Cell::from(r.stake.clone()),
            Cell::from(r.commission.clone()),
            Cell::from(r.performance.clone()).style(Style::default().fg(tier_color)),
            Cell::from(r.version.clone()),
            Cell::from(r.last_seen.clone()),
        ])
        .style(Style::default().fg(TEXT))
    });

    let widths = [
        Constraint::Length(19),
        Constraint::Length(8),
        Constraint::Length(15),
        Constraint::Min(10),
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(9),
    ];
    let w = Table::new(rows, widths).header(head).block(block);
    f.render_widget(w, area);
}

fn notice_line(f: &mut Frame, area: Rect, snap: &UiSnapshot) {
    let Some(notice) = &snap.notice else {
        return;
    };
    let (icon, color) = match notice.kind {
        NoticeKind::Info => ("ℹ", FOCUS),
        NoticeKind::Success => ("✓", GOOD),
        NoticeKind::Warning => ("!", WARN),
        NoticeKind::Error => ("✗", BAD),
    };
    let w = Paragraph::new(format!(
        " {icon} {} ({}s)",
        notice.message,
        notice.remaining_ms.div_ceil(1000)
    ))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    f.render_widget(w, area);
}

fn footer(f: &mut Frame, area: Rect, snap: &UiSnapshot) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(FOCUS));
    let mut spans: Vec<Span> = Vec::with_capacity(24);

    spans.push(Span::raw(snap.table.page_label.clone()));
    spans.push(Span::raw(" │ "));
    spans.push(key("←/→"));
    spans.push(Span::raw(" page │ "));
    spans.push(key("/"));
    spans.push(Span::raw(" search │ "));
    spans.push(key("a"));
    spans.push(Span::raw(" active │ "));
    spans.push(key("s"));
    spans.push(Span::raw(" sort │ "));
    spans.push(key("n"));
    spans.push(Span::raw(" network │ "));
    spans.push(key("r"));
    spans.push(Span::raw(" refresh │ "));
    spans.push(key("Esc"));
    spans.push(Span::raw(" dismiss │ "));
    spans.push(key("q"));
    spans.push(Span::raw(" quit"));

    if let Some(best) = snap.top_performers.first() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("★ {} {}", best.short_key, best.score),
            Style::default().fg(GOOD),
        ));
    }

    let w = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::TOP).border_type(BorderType::Plain));
    f.render_widget(w, area);
}
