//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  🦇 batrat   landings · 907 rows             │
//! ├─────────────────────┬────────────────────────┤
//! │  Fields             │  seconds_after_rat_... │
//! │  ▸ risk        cat  │  count 907  missing 0  │
//! │    reward      cat  │  mean 282.0  std 240.3 │
//! │    ...              ├────────────────────────┤
//! │                     │  ▇ ▇ ▅ ▃ ▂ ▁           │
//! ├─────────────────────┴────────────────────────┤
//! │  ↑↓ navigate   tab: dataset   a: analyses    │
//! └──────────────────────────────────────────────┘

use super::app::{App, View};
use batrat_core::{FieldKind, FieldSummary};
use ratatui::{prelude::*, widgets::*};

use crate::commands::fmt_opt;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(10),   // main
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    match app.view() {
        View::Field => draw_fields(f, rows[1], app),
        View::Analysis => draw_analyses(f, rows[1], app),
    }
    draw_keys(f, rows[2]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 🦇 batrat ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("  dataset: "),
            Span::styled(
                app.dataset().label(),
                Style::default().bold().fg(Color::Yellow),
            ),
            Span::styled(
                format!("  {} rows ", app.row_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_fields(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_field_list(f, cols[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(cols[1]);

    draw_summary(f, right[0], app);
    draw_distribution(f, right[1], app);
}

fn draw_field_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<Row> = app
        .summaries()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let is_cursor = i == app.cursor();
            let pointer = if is_cursor { "▸" } else { " " };

            let style = if is_cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if s.count == 0 {
                Style::default().fg(Color::Red)
            } else if s.missing > 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            Row::new(vec![
                pointer.to_string(),
                s.field.to_string(),
                short_kind(s.kind).to_string(),
                s.missing.to_string(),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        items,
        [
            Constraint::Length(2),  // pointer
            Constraint::Length(27), // name
            Constraint::Length(4),  // kind
            Constraint::Length(6),  // missing
        ],
    )
    .header(Row::new(vec!["", "field", "kind", "miss"]).style(Style::default().bold()))
    .block(Block::default().borders(Borders::ALL).title(" Fields "));

    f.render_widget(table, area);
}

fn draw_summary(f: &mut Frame, area: Rect, app: &App) {
    let Some(s) = app.selected() else {
        let p = Paragraph::new("No fields").block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", s.field));
    let p = Paragraph::new(summary_lines(s))
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(p, area);
}

fn summary_lines(s: &FieldSummary) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            s.kind.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(format!("count {}   missing {}", s.count, s.missing)),
    ];
    if let Some(n) = &s.numeric {
        lines.push(Line::from(format!(
            "mean {:.3}   std {}",
            n.mean,
            fmt_opt(n.std, 3)
        )));
        lines.push(Line::from(format!(
            "min {:.3}   max {:.3}",
            n.min, n.max
        )));
        lines.push(Line::from(format!(
            "25% {:.3}   50% {:.3}   75% {:.3}",
            n.q25, n.median, n.q75
        )));
    }
    if let Some(c) = &s.categorical {
        lines.push(Line::from(format!("unique {}", c.unique)));
        lines.push(Line::from(format!("top {} ({})", c.top, c.freq)));
    }
    lines
}

fn draw_distribution(f: &mut Frame, area: Rect, app: &App) {
    let bars = app.distribution();
    let title = match app.selected().map(|s| s.kind) {
        Some(FieldKind::Continuous) => " Histogram ",
        Some(FieldKind::Categorical) => " Counts ",
        _ => " Distribution ",
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if bars.is_empty() {
        let p = Paragraph::new("Nothing to plot for this field")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let curve = app.density_curve();
    let (bar_area, curve_area) = if curve.is_empty() {
        (area, None)
    } else {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(4)])
            .split(area);
        (split[0], Some(split[1]))
    };

    let data: Vec<(&str, u64)> = bars.iter().map(|(l, c)| (l.as_str(), *c)).collect();
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / data.len().max(1)).saturating_sub(1).clamp(1, 9) as u16;

    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, bar_area);

    if let Some(curve_area) = curve_area {
        let heights = curve_columns(&curve, bar_width as usize + 1);
        let sparkline = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(" Density (KDE) "))
            .data(&heights)
            .style(Style::default().fg(Color::Magenta));
        f.render_widget(sparkline, curve_area);
    }
}

/// Density values repeated so each spans the columns of its bar.
fn curve_columns(curve: &[f64], columns_per_bin: usize) -> Vec<u64> {
    curve
        .iter()
        .flat_map(|&c| std::iter::repeat_n(c.round().max(0.0) as u64, columns_per_bin))
        .collect()
}

fn draw_analyses(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let alpha = app.significance_level();
    let association = match app.association() {
        Ok((analysis, _)) => crate::commands::chisq::render(analysis, alpha),
        Err(e) => format!("{}\n\n{e}", e.user_message()),
    };
    let p = Paragraph::new(association).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Chi-square: risk × reward "),
    );
    f.render_widget(p, cols[0]);

    let (text, style) = match app.model() {
        Ok((model, _)) if model.converged => (model.to_string(), Style::default()),
        Ok((model, _)) => (model.to_string(), Style::default().fg(Color::Yellow)),
        Err(e) => (
            format!("{}\n\n{e}", e.user_message()),
            Style::default().fg(Color::Red),
        ),
    };
    let p = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Logit: risk ~ seconds_after_rat_arrival + hours_after_sunset "),
    );
    f.render_widget(p, cols[1]);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(" ↑↓ navigate   tab: switch dataset   a: analyses   q: quit")
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

fn short_kind(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Continuous => "num",
        FieldKind::Categorical => "cat",
        FieldKind::Text => "txt",
    }
}
