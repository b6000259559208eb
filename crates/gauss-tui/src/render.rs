use crate::app::{App, ScreenState};
use crate::game::GameMode;
use crate::stats::{format_time, ModeSummary};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use gauss_core::format_number;
use gauss_core::rref::cell_in_place;
use std::io;

/// Width of one matrix cell
const CELL_WIDTH: usize = 8;

/// Recent moves listed under the matrix
const RECENT_MOVES: usize = 5;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    match app.screen_state {
        ScreenState::Playing => render_game_screen(stdout, app, term_width, term_height)?,
        ScreenState::Solved => render_solved_screen(stdout, app, term_width, term_height)?,
        ScreenState::Stats => render_stats_screen(stdout, app, term_width)?,
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    if app.screen_state == ScreenState::Playing {
        // Leave the cursor at the end of the prompt
        let (x, y) = prompt_position(app, term_height);
        execute!(stdout, MoveTo(x + 2 + app.input.chars().count() as u16, y), Show)?;
    }
    Ok(())
}

fn prompt_position(app: &App, term_height: u16) -> (u16, u16) {
    let size = app.game.matrix().size() as u16;
    let y = (3 + size + 2 + RECENT_MOVES as u16 + 2).min(term_height.saturating_sub(6));
    (2, y)
}

fn render_game_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    let title = "═══ GAUSS ═══";
    execute!(
        stdout,
        MoveTo(2, 1),
        SetForegroundColor(theme.key),
        Print(title)
    )?;

    let matrix_width = render_matrix(stdout, app, 2, 3)?;

    let info_x = (2 + matrix_width + 4).min(term_width.saturating_sub(24));
    render_info_panel(stdout, app, info_x, 3)?;

    let size = app.game.matrix().size() as u16;
    render_recent_moves(stdout, app, 2, 3 + size + 2)?;

    let (px, py) = prompt_position(app, term_height);
    render_prompt(stdout, app, px, py, term_width)?;
    render_controls(stdout, app, px, py + 3)?;

    Ok(())
}

/// Draw the augmented matrix; returns the width used
fn render_matrix(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<u16> {
    let theme = &app.theme;
    let matrix = app.game.matrix();

    let mut width = 0;
    for (i, (row, value)) in matrix
        .coefficients()
        .iter()
        .zip(matrix.augmented())
        .enumerate()
    {
        let row_y = y + i as u16;
        execute!(
            stdout,
            MoveTo(x, row_y),
            SetForegroundColor(theme.info),
            Print(format!("R{:<3}", i + 1)),
            SetForegroundColor(theme.border),
            Print("[")
        )?;

        for (j, &cell) in row.iter().enumerate() {
            let color = if cell_in_place(i, j, cell) {
                theme.in_place
            } else {
                theme.cell
            };
            execute!(
                stdout,
                SetForegroundColor(color),
                Print(format!("{:>w$}", format_number(cell), w = CELL_WIDTH))
            )?;
        }

        execute!(
            stdout,
            SetForegroundColor(theme.border),
            Print("  |"),
            SetForegroundColor(theme.augmented),
            Print(format!("{:>w$}", format_number(*value), w = CELL_WIDTH)),
            SetForegroundColor(theme.border),
            Print(" ]")
        )?;

        width = (4 + 1 + CELL_WIDTH * (row.len() + 1) + 5) as u16;
    }

    Ok(width)
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let game = &app.game;
    let config = game.config();

    let mode_color = match game.mode() {
        GameMode::Fmc => theme.fg,
        GameMode::Timed => theme.key,
    };
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.info),
        Print("Mode:        "),
        SetForegroundColor(mode_color),
        Print(format!("{:>8}", game.mode()))
    )?;

    let rows = [
        format!("Time:        {:>8}", game.elapsed_string()),
        format!("Moves:       {:>8}", game.move_count()),
        format!("God's number:{:>8}", game.estimate().move_count),
        format!("Rating:      {:>8}", game.rating()),
        String::new(),
        format!("Difficulty:  {:>8}", config.difficulty),
        format!("Compress.:   {:>8}", config.compressibility),
        format!("Regime: {:>13}", config.regime()),
        format!("Seed: {:>15}", game.seed()),
        String::new(),
        format!("Hints used:  {:>8}", game.hints_used()),
        format!("Rejected:    {:>8}", game.rejected()),
    ];

    for (i, row) in rows.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x, y + 1 + i as u16),
            SetForegroundColor(theme.info),
            Print(row)
        )?;
    }

    Ok(())
}

fn render_recent_moves(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let moves = app.game.moves();
    let skip = moves.len().saturating_sub(RECENT_MOVES);

    for (i, op) in moves.iter().enumerate().skip(skip) {
        execute!(
            stdout,
            MoveTo(x, y + (i - skip) as u16),
            SetForegroundColor(theme.info),
            Print(format!("{:>3}. ", i + 1)),
            SetForegroundColor(theme.fg),
            Print(op)
        )?;
    }
    Ok(())
}

fn render_prompt(
    stdout: &mut io::Stdout,
    app: &App,
    x: u16,
    y: u16,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let width = term_width.saturating_sub(x + 2) as usize;
    let line = format!("> {}", app.input);

    execute!(
        stdout,
        MoveTo(x, y),
        SetBackgroundColor(theme.prompt_bg),
        SetForegroundColor(theme.fg),
        Print(format!("{:<w$}", line, w = width)),
        SetBackgroundColor(theme.bg)
    )?;

    if let Some(ref err) = app.last_error {
        execute!(
            stdout,
            MoveTo(x, y + 1),
            SetForegroundColor(theme.error),
            Print(err)
        )?;
    }
    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    let controls = [
        ("R2 = R2 - 3*R1", "Move"),
        ("hint", "Next move"),
        ("new [d c]", "New puzzle"),
        ("restart", "Same seed"),
        ("mode", "fmc/timed"),
        ("save/load", "Puzzle file"),
        ("stats", "Statistics"),
        ("theme", "Colors"),
        ("Up/Down", "History"),
        ("quit", "Exit"),
    ];

    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 5;
        let row = i % 5;
        let cx = x + (col as u16) * 30;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>14}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.prompt_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn centered(stdout: &mut io::Stdout, text: &str, y: u16, term_width: u16) -> io::Result<()> {
    let x = term_width.saturating_sub(text.chars().count() as u16) / 2;
    execute!(stdout, MoveTo(x, y), Print(text))
}

fn render_solved_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let game = &app.game;
    let top = (term_height / 2).saturating_sub(6);

    execute!(stdout, SetForegroundColor(theme.success))?;
    centered(stdout, "★ SOLVED ★", top, term_width)?;

    execute!(stdout, SetForegroundColor(theme.fg))?;
    let lines = [
        format!(
            "{} moves (God's number {})",
            game.move_count(),
            game.estimate().move_count
        ),
        format!("Time {}", game.elapsed_string()),
        match game.efficiency() {
            Some(eff) => format!("Efficiency {:.0}%", eff),
            None => String::new(),
        },
        format!("Mode {}  ·  seed {}", game.mode(), game.seed()),
    ];
    for (i, line) in lines.iter().enumerate() {
        centered(stdout, line, top + 2 + i as u16, term_width)?;
    }

    execute!(stdout, SetForegroundColor(theme.info))?;
    let mut y = top + 7;
    for line in game.matrix().to_string().lines() {
        centered(stdout, line, y, term_width)?;
        y += 1;
    }

    execute!(stdout, SetForegroundColor(theme.key))?;
    centered(
        stdout,
        "Enter/n: new   r: restart   s: stats   Esc: view   q: quit",
        y + 1,
        term_width,
    )?;
    Ok(())
}

fn render_stats_screen(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let stats = &app.stats;

    execute!(stdout, SetForegroundColor(theme.key))?;
    centered(stdout, "═══ STATISTICS ═══", 1, term_width)?;

    let col1_x = 4u16;
    let col2_x = term_width / 2;
    render_mode_summary(stdout, app, "Fewest moves", &stats.summary(GameMode::Fmc), col1_x, 3)?;
    render_mode_summary(stdout, app, "Timed", &stats.summary(GameMode::Timed), col2_x, 3)?;

    execute!(
        stdout,
        MoveTo(col1_x, 10),
        SetForegroundColor(theme.fg),
        Print("Recent solves")
    )?;
    for (i, record) in stats.recent(10).enumerate() {
        execute!(
            stdout,
            MoveTo(col1_x, 11 + i as u16),
            SetForegroundColor(theme.info),
            Print(format!(
                "#{:<4} {:<6} {:>3} moves (est {:>2})  {:>8}  d{:<3} c{:<3} seed {}",
                record.id,
                record.mode,
                record.moves,
                record.gods_number,
                format_time(record.time_secs),
                record.difficulty,
                record.compressibility,
                record.seed
            ))
        )?;
    }

    execute!(stdout, SetForegroundColor(theme.key))?;
    centered(stdout, "Esc/q: back", 22, term_width)?;
    Ok(())
}

fn render_mode_summary(
    stdout: &mut io::Stdout,
    app: &App,
    title: &str,
    summary: &ModeSummary,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let dash = || "-".to_string();

    let rows = [
        format!("Solves:      {}", summary.solves),
        format!(
            "Best moves:  {}",
            summary.best_moves.map(|m| m.to_string()).unwrap_or_else(dash)
        ),
        format!(
            "Best time:   {}",
            summary.best_time_secs.map(format_time).unwrap_or_else(dash)
        ),
        format!(
            "Efficiency:  {}",
            summary
                .avg_efficiency
                .map(|e| format!("{:.0}%", e))
                .unwrap_or_else(dash)
        ),
    ];

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.fg),
        Print(title)
    )?;
    for (i, row) in rows.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x, y + 1 + i as u16),
            SetForegroundColor(theme.info),
            Print(row)
        )?;
    }
    Ok(())
}
