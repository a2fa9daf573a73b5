use ratatui::prelude::*;
use ratatui::widgets::*;

use strategy_analysis::chart::{CandleSeries, LineSeries};
use strategy_analysis::types::DayBucket;

use crate::App;

// ─── Colors ───

const BORDER: Style = Style::new().fg(Color::DarkGray);
const UP: Color = Color::Green;
const DOWN: Color = Color::Red;

/// Columns a single day occupies: candle glyph plus one gap.
const COLS_PER_DAY: usize = 2;

fn candle_color(day: &DayBucket) -> Color {
    if day.close >= day.open { UP } else { DOWN }
}

// ─── Main draw ───

pub fn draw(app: &App, frame: &mut Frame) {
    let [header_area, candles_area, line_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(10),
        Constraint::Percentage(35),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(app, header_area, frame.buffer_mut());
    render_footer(footer_area, frame.buffer_mut());

    match app.candle_series.len() {
        0 => {}
        1 => render_candles(&app.candle_series[0], app.offset, candles_area, frame.buffer_mut()),
        _ => {
            // PnL candles left, aligned tick candles right.
            let [left, right] = Layout::horizontal([
                Constraint::Percentage(50),
                Constraint::Percentage(50),
            ])
            .areas(candles_area);
            render_candles(&app.candle_series[0], app.offset, left, frame.buffer_mut());
            render_candles(&app.candle_series[1], app.offset, right, frame.buffer_mut());
        }
    }

    if let Some(line) = app.line_series.first() {
        render_line(line, line_area, frame.buffer_mut());
    }
}

// ─── Header / Footer ───

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let text = format!(
        " {} | {} days | day {}/{}",
        app.name,
        app.total_days,
        app.offset + 1,
        app.total_days,
    );
    Paragraph::new(text)
        .style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .render(area, buf);
}

fn render_footer(area: Rect, buf: &mut Buffer) {
    let text = " [Left/h Right/l] Scroll  [Home/g End/G] Jump  [q/Esc] Quit";
    Paragraph::new(text)
        .style(Style::default().fg(Color::Black).bg(Color::DarkGray))
        .render(area, buf);
}

// ─── Candles ───

/// Paint one candle per visible day: a high-low wick with an
/// open-close body, green when the day closed at or above its open.
fn render_candles(series: &CandleSeries, offset: usize, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(series.label.clone())
        .border_style(BORDER);
    let inner = block.inner(area);
    Widget::render(block, area, buf);

    if series.days.is_empty() || inner.height < 2 || inner.width < COLS_PER_DAY as u16 {
        return;
    }

    let start = offset.min(series.days.len() - 1);
    let capacity = inner.width as usize / COLS_PER_DAY;
    let end = (start + capacity).min(series.days.len());
    let visible = &series.days[start..end];

    let y_max = visible.iter().map(|d| d.high).fold(f64::MIN, f64::max);
    let y_min = visible.iter().map(|d| d.low).fold(f64::MAX, f64::min);
    // Flat window still needs a non-zero span to map onto rows.
    let span = if y_max > y_min { y_max - y_min } else { 1.0 };

    // Reserve the last row for date ticks.
    let chart_rows = (inner.height - 1) as usize;
    let to_row = |v: f64| -> usize {
        (((y_max - v) / span) * (chart_rows.saturating_sub(1)) as f64).round() as usize
    };

    let mut lines: Vec<Line> = Vec::with_capacity(chart_rows + 1);
    for row in 0..chart_rows {
        let mut spans: Vec<Span> = Vec::with_capacity(visible.len());
        for day in visible {
            let hi = to_row(day.high);
            let lo = to_row(day.low);
            let body_top = to_row(day.open).min(to_row(day.close));
            let body_bot = to_row(day.open).max(to_row(day.close));

            let glyph = if row >= body_top && row <= body_bot {
                "█ "
            } else if row >= hi && row <= lo {
                "│ "
            } else {
                "  "
            };
            spans.push(Span::styled(glyph, Style::default().fg(candle_color(day))));
        }
        // Right-edge scale: top row shows the max, bottom row the min.
        if row == 0 {
            spans.push(Span::styled(
                format!("{:.2}", y_max),
                Style::default().fg(Color::DarkGray),
            ));
        } else if row == chart_rows - 1 {
            spans.push(Span::styled(
                format!("{:.2}", y_min),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(date_ticks(visible, inner.width as usize));

    Paragraph::new(lines).render(inner, buf);
}

/// MM-DD labels under every fifth candle.
fn date_ticks(visible: &[DayBucket], width: usize) -> Line<'static> {
    let mut text = String::with_capacity(width);
    for (i, day) in visible.iter().enumerate() {
        if i % 5 == 0 {
            let label = if day.date.len() >= 10 { &day.date[5..10] } else { day.date.as_str() };
            text.push_str(label);
            // A label spans 5 chars; pad to the next labeled column.
            text.push_str("     ");
        }
    }
    text.truncate(width);
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

// ─── PnL line ───

fn render_line(series: &LineSeries, area: Rect, buf: &mut Buffer) {
    if series.points.is_empty() {
        Widget::render(
            Block::bordered().title(series.label.clone()).border_style(BORDER),
            area,
            buf,
        );
        return;
    }

    let data: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();

    let x_max = (data.len() - 1).max(1) as f64;
    let y_min = data.iter().map(|d| d.1).fold(f64::MAX, f64::min);
    let y_max = data.iter().map(|d| d.1).fold(f64::MIN, f64::max);
    let (y_min, y_max) = if y_min < y_max {
        (y_min, y_max)
    } else {
        (y_min - 1.0, y_max + 1.0)
    };

    let first_ts = series.points.first().map(|p| p.0.as_str()).unwrap_or("");
    let last_ts = series.points.last().map(|p| p.0.as_str()).unwrap_or("");

    let datasets = vec![Dataset::default()
        .name(series.label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&data)];

    let chart = Chart::new(datasets)
        .block(Block::bordered().title(series.label.clone()).border_style(BORDER))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels::<Vec<Line>>(vec![first_ts.into(), last_ts.into()])
                .style(BORDER),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels::<Vec<Line>>(vec![
                    format!("{:.2}", y_min).into(),
                    format!("{:.2}", (y_min + y_max) / 2.0).into(),
                    format!("{:.2}", y_max).into(),
                ])
                .style(BORDER),
        );

    Widget::render(chart, area, buf);
}
