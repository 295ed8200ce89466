//! One-shot terminal chart rendering.
//!
//! Enters the alternate screen, draws a single chart, and tears the
//! terminal down again on any key press. When stdout is not a terminal
//! (pipes, tests) a text summary is printed instead.

use std::io::{self, IsTerminal, Stdout};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};
use ratatui::{Frame, Terminal};

use crate::error::CliError;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Red,
    Color::Blue,
];

/// Cycle through the chart palette for multi-series views.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// One labeled line on a chart.
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub color: Color,
}

/// A complete chart view ready to render.
pub struct ChartView {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Optional first/middle/last x-axis labels (dates); numeric bounds are
    /// used when empty.
    pub x_labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

pub fn render(view: &ChartView) -> Result<(), CliError> {
    if view.series.iter().all(|series| series.points.is_empty()) {
        println!("nothing to chart");
        return Ok(());
    }

    if !io::stdout().is_terminal() {
        render_text(view);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = draw_until_key(&mut terminal, view);

    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = terminal.show_cursor();

    result
}

fn draw_until_key(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    view: &ChartView,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|frame| draw_chart(frame, view))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(()),
            _ => {}
        }
    }
}

fn draw_chart(frame: &mut Frame, view: &ChartView) {
    let (x_min, x_max) = x_bounds(&view.series);
    let (y_min, y_max) = y_bounds(&view.series);

    let datasets = view
        .series
        .iter()
        .map(|series| {
            Dataset::default()
                .name(series.name.clone())
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series.color))
                .data(&series.points)
        })
        .collect::<Vec<_>>();

    let x_labels = if view.x_labels.is_empty() {
        axis_labels(x_min, x_max)
    } else {
        view.x_labels.iter().cloned().map(Line::from).collect()
    };

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!("{} (press any key to close)", view.title))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title(view.x_title.clone())
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(view.y_title.clone())
                .bounds([y_min, y_max])
                .labels(axis_labels(y_min, y_max)),
        );

    frame.render_widget(chart, frame.area());
}

fn render_text(view: &ChartView) {
    println!("{}", view.title);
    for series in &view.series {
        let Some((_, first)) = series.points.first() else {
            continue;
        };
        let Some((_, last)) = series.points.last() else {
            continue;
        };
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (_, y) in &series.points {
            min = min.min(*y);
            max = max.max(*y);
        }
        println!(
            "  {:<14} points={} first={first:.2} last={last:.2} min={min:.2} max={max:.2}",
            series.name,
            series.points.len(),
        );
    }
}

fn x_bounds(series: &[ChartSeries]) -> (f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    for entry in series {
        for (x, _) in &entry.points {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
        }
    }
    if !x_min.is_finite() || !x_max.is_finite() {
        return (0.0, 1.0);
    }
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    (x_min, x_max)
}

fn y_bounds(series: &[ChartSeries]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for entry in series {
        for (_, y) in &entry.points {
            min = min.min(*y);
            max = max.max(*y);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn axis_labels(min: f64, max: f64) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Line::from(format!("{min:.2}")),
        Line::from(format!("{mid:.2}")),
        Line::from(format!("{max:.2}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: Vec<(f64, f64)>) -> ChartSeries {
        ChartSeries {
            name: String::from("test"),
            points,
            color: palette_color(0),
        }
    }

    #[test]
    fn bounds_pad_the_value_range() {
        let view = [series(vec![(0.0, 100.0), (1.0, 110.0)])];
        let (y_min, y_max) = y_bounds(&view);
        assert!(y_min < 100.0);
        assert!(y_max > 110.0);
    }

    #[test]
    fn degenerate_bounds_still_span_a_range() {
        let view = [series(vec![(0.0, 5.0)])];
        let (y_min, y_max) = y_bounds(&view);
        assert!(y_max > y_min);
        let (x_min, x_max) = x_bounds(&view);
        assert!(x_max > x_min);
    }

    #[test]
    fn empty_series_get_default_bounds() {
        let view = [series(Vec::new())];
        assert_eq!(x_bounds(&view), (0.0, 1.0));
        assert_eq!(y_bounds(&view), (0.0, 1.0));
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
    }
}
