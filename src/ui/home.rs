use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::games::canvas::BrailleCanvas;
use crate::games::GameId;
use crate::scores::ScoreBoard;

const BANNER: &str = r#"
███████╗ ██████╗   █████╗   ██████╗ ███████╗  ██████╗  █████╗  ██████╗  ███████╗
██╔════╝ ██╔══██╗ ██╔══██╗ ██╔════╝ ██╔════╝ ██╔════╝ ██╔══██╗ ██╔══██╗ ██╔════╝
███████╗ ██████╔╝ ███████║ ██║      █████╗   ██║      ███████║ ██║  ██║ █████╗  
╚════██║ ██╔═══╝  ██╔══██║ ██║      ██╔══╝   ██║      ██╔══██║ ██║  ██║ ██╔══╝  
███████║ ██║      ██║  ██║ ╚██████╗ ███████╗ ╚██████╗ ██║  ██║ ██████╔╝ ███████╗
╚══════╝ ╚═╝      ╚═╝  ╚═╝  ╚═════╝ ╚══════╝  ╚═════╝ ╚═╝  ╚═╝ ╚═════╝  ╚══════╝"#;

struct GameTile {
    icon: &'static str,
    color: Color,
    border_color: Color,
}

fn tile_style(id: GameId) -> GameTile {
    match id {
        GameId::SpaceInvaders => GameTile { icon: "👾", color: Color::Rgb(80, 255, 80), border_color: Color::Rgb(40, 140, 40) },
        GameId::AsteroidBreaker => GameTile { icon: "☄", color: Color::Rgb(160, 110, 255), border_color: Color::Rgb(80, 55, 140) },
        GameId::SatelliteRescue => GameTile { icon: "🛰", color: Color::Rgb(0, 191, 255), border_color: Color::Rgb(0, 95, 140) },
    }
}

fn difficulty_color(id: GameId) -> Color {
    match id.difficulty() {
        "Easy" => Color::Rgb(46, 213, 115),
        "Medium" => Color::Rgb(255, 200, 60),
        _ => Color::Rgb(255, 71, 87),
    }
}

fn render_game_tile(frame: &mut Frame, area: Rect, id: GameId, best: u32, selected: bool) {
    let tile = tile_style(id);
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { tile.border_color };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 { return; }

    let mut lines: Vec<Line> = Vec::new();

    let name_color = if selected { Color::Rgb(255, 255, 255) } else { tile.color };
    lines.push(Line::from(vec![
        Span::styled(format!("[{}] ", id.index() + 1), Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", tile.icon), Style::default()),
        Span::styled(id.title(), Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
    ]));
    lines.push(Line::from(Span::styled(id.difficulty(), Style::default().fg(difficulty_color(id)))));

    for desc_line in id.description().split('\n') {
        lines.push(Line::from(vec![
            Span::styled(desc_line, Style::default().fg(if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(120, 120, 140) })),
        ]));
    }

    if best > 0 {
        lines.push(Line::from(Span::styled(
            format!("🏆 High Score: {}", best),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        )));
    }

    if selected {
        lines.push(Line::from(vec![
            Span::styled("▶ Enter to play", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        ]));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

fn control_line(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<17}", keys), Style::default().fg(Color::Rgb(80, 200, 255))),
        Span::styled(what, Style::default().fg(Color::Rgb(140, 140, 140))),
    ])
}

fn game_controls(id: GameId) -> Vec<Line<'static>> {
    let tile = tile_style(id);
    let blurb = match id {
        GameId::SpaceInvaders => "Clear all 50 invaders before they land!",
        GameId::AsteroidBreaker => "Grab 5 gems per level, touch nothing else.",
        GameId::SatelliteRescue => "Meet each satellite inside the Earth zone.",
    };
    let moves: &[(&'static str, &'static str)] = match id {
        GameId::SpaceInvaders => &[("← / →  A / D", "Move cannon"), ("Space", "Shoot")],
        GameId::AsteroidBreaker => &[("↑ ↓ ← →  WASD", "Fly")],
        GameId::SatelliteRescue => &[("↑ ↓ ← →  WASD", "Thrust (burns fuel)")],
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {} {}", tile.icon, id.title()), Style::default().fg(tile.color).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled(format!("  {}", blurb), Style::default().fg(Color::Rgb(100, 100, 120))),
        ]),
        Line::from(""),
    ];
    lines.extend(moves.iter().map(|&(k, w)| control_line(k, w)));
    lines.push(control_line("R", "Restart"));
    lines.push(control_line("P", "Pause"));
    lines
}

fn render_tagline(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        app.tagline.visible(),
        Style::default()
            .fg(Color::Rgb(150, 160, 190))
            .add_modifier(Modifier::ITALIC),
    )];
    // Caret blinks at roughly 2 Hz.
    if !app.tagline.is_done() || (app.clock_ms() / 500) % 2 == 0 {
        spans.push(Span::styled("▌", Style::default().fg(Color::Rgb(0, 191, 255))));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

pub fn render_home(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Banner
            Constraint::Length(2),  // Tagline
            Constraint::Length(10), // Game tiles
            Constraint::Min(10),   // Controls area
            Constraint::Length(2),  // Footer
        ])
        .split(area);

    // Star backdrop behind the banner
    let (bw, bh) = (chunks[0].width as usize, chunks[0].height as usize);
    if bw > 0 && bh > 0 {
        let mut sky = BrailleCanvas::new(bw, bh, Color::Reset);
        sky.star_field(120, app.clock_ms() / 16);
        frame.render_widget(Paragraph::new(sky.into_lines()), chunks[0]);
    }
    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(80, 200, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    render_tagline(frame, chunks[1], app);

    let games_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" 🎮 Space Games - ←→ Select, Enter to Play ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    let games_inner = games_block.inner(chunks[2]);
    frame.render_widget(games_block, chunks[2]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(games_inner);

    for id in GameId::ALL {
        let i = id.index();
        render_game_tile(frame, cols[i], id, app.scoreboard.best(id), app.selected_game == i);
    }

    // Controls area: navigation left, game controls right
    let ctrl_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(60),
        ])
        .split(chunks[3]);

    let controls = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  🔧 Navigation", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        ]),
        control_line("Tab / Shift+Tab", "Switch tabs"),
        control_line("1-3", "Launch game"),
        control_line("← →", "Select game"),
        control_line("Enter", "Play selected"),
        control_line("Esc", "Return to Home"),
        control_line("q / Ctrl+C", "Quit"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Navigation Control ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, ctrl_cols[0]);

    let selected = GameId::ALL.get(app.selected_game).copied().unwrap_or(GameId::SpaceInvaders);
    let game_ctrl = Paragraph::new(game_controls(selected))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(50, 100, 140)))
                .title(format!(" 🎮 {} Control ", selected.title()))
                .title_style(Style::default().fg(tile_style(selected).color).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(game_ctrl, ctrl_cols[1]);

    let mut footer_spans = vec![
        Span::styled("  🦀 ", Style::default().fg(Color::Rgb(255, 100, 50))),
        Span::styled(concat!("v", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("H", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" High Scores", Style::default().fg(Color::Rgb(100, 100, 130))),
    ];
    if let Some((id, score)) = app.last_result {
        footer_spans.push(Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))));
        footer_spans.push(Span::styled(
            format!("Last run: {} {}", id.title(), score),
            Style::default().fg(Color::Rgb(140, 140, 170)),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(footer_spans)).alignment(Alignment::Center), chunks[4]);

    if app.show_scores {
        render_high_scores_overlay(frame, area, &app.scoreboard);
    }
}

fn render_high_scores_overlay(frame: &mut Frame, area: Rect, scores: &ScoreBoard) {
    let overlay_w = 44u16.min(area.width.saturating_sub(4));
    let overlay_h = 14u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 200, 80)))
        .title(" 🏆 High Scores ")
        .title_style(Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for id in GameId::ALL {
        let tile = tile_style(id);
        let best = scores.best(id);
        let score_span = if best > 0 {
            Span::styled(format!("{}", best), Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD))
        } else {
            Span::styled("No scores yet", Style::default().fg(Color::Rgb(60, 60, 80)))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", tile.icon), Style::default()),
            Span::styled(format!("{:<18}", id.title()), Style::default().fg(tile.color).add_modifier(Modifier::BOLD)),
            score_span,
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("  Total ", Style::default().fg(Color::Rgb(140, 140, 170))),
        Span::styled(format!("{}", scores.total()), Style::default().fg(Color::Rgb(255, 255, 255)).add_modifier(Modifier::BOLD)),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Press ", Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("H", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" to close", Style::default().fg(Color::Rgb(80, 80, 100))),
    ]));

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}
