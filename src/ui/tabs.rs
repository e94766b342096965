use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};

const ACTIVE: Color = Color::Rgb(255, 220, 80);
const IDLE: Color = Color::Rgb(120, 120, 140);

fn tab_title(app: &App, tab: Tab) -> Line<'static> {
    let style = if tab == app.current_tab {
        Style::default().fg(ACTIVE).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(IDLE)
    };
    let mut spans = vec![Span::styled(tab.title().to_string(), style)];
    if let Tab::Game(id) = tab {
        let best = app.scoreboard.best(id);
        if best > 0 {
            spans.push(Span::styled(format!("{} ", best), Style::default().fg(Color::Rgb(255, 215, 0))));
        }
    }
    Line::from(spans)
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all().iter().map(|t| tab_title(app, *t)).collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
                .border_type(BorderType::Rounded)
                .title(" 🚀 Spacecade ")
                .title_style(
                    Style::default()
                        .fg(Color::Rgb(200, 120, 255))
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(app.current_tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(ACTIVE).add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, area);
}
