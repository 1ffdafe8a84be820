//! CLI output: the per-turn board map and the end-of-game summary, in
//! human-readable or JSON form.

use colored::Colorize;
use is_terminal::IsTerminal;
use std::fmt::Write as _;
use std::io;
use tabled::{builder::Builder, settings::Style};

use crate::engine::{BoardState, EliminationCause, Point};

use super::play::GameOutcome;

const EMPTY: &str = "◦";
const HAZARD: &str = "░";
const FOOD: &str = "⚕";
const DEFAULT_SNAKE_COLOR: (u8, u8, u8) = (136, 136, 136);
const FOOD_COLOR: (u8, u8, u8) = (255, 92, 117);

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with tables, colors, and formatting.
    Human,
    /// Machine-readable JSON output.
    Json,
}

impl OutputFormat {
    /// Determine the output format based on CLI flag and TTY detection.
    ///
    /// - If `format` is Some("json"), return Json
    /// - If `format` is Some("human"), return Human
    /// - If `format` is None, auto-detect based on stdout being a TTY
    pub fn from_flag(format: Option<&str>) -> Result<Self, String> {
        match format {
            Some("json") => Ok(OutputFormat::Json),
            Some("human") => Ok(OutputFormat::Human),
            Some(other) => Err(format!(
                "Invalid format '{}'. Use 'json' or 'human'.",
                other
            )),
            None => {
                if io::stdout().is_terminal() {
                    Ok(OutputFormat::Human)
                } else {
                    Ok(OutputFormat::Json)
                }
            }
        }
    }
}

/// How one snake is drawn on the board map.
#[derive(Debug, Clone)]
pub struct SnakeStyle<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub glyph: char,
    pub color: &'a str,
}

/// Parse a `#rrggbb` colour, falling back to the board's default grey.
pub fn parse_snake_color(color: &str) -> (u8, u8, u8) {
    let hex = match color.strip_prefix('#') {
        Some(hex) if hex.len() == 6 && hex.is_ascii() => hex,
        _ => return DEFAULT_SNAKE_COLOR,
    };

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => (r, g, b),
        _ => DEFAULT_SNAKE_COLOR,
    }
}

/// Draw the board with the y axis pointing up, preceded by a legend.
pub fn render_board(
    board: &BoardState,
    header: &str,
    styles: &[SnakeStyle<'_>],
    use_color: bool,
) -> String {
    let width = board.width.max(0) as usize;
    let height = board.height.max(0) as usize;
    let empty = if use_color {
        EMPTY.bright_black().to_string()
    } else {
        EMPTY.to_string()
    };
    let mut cells = vec![vec![empty; height]; width];

    let mut put = |p: &Point, glyph: String| {
        if board.is_on_board(*p) {
            cells[p.x as usize][p.y as usize] = glyph;
        }
    };

    let hazard = if use_color {
        " ".on_bright_black().to_string()
    } else {
        HAZARD.to_string()
    };
    board.hazards.iter().for_each(|p| put(p, hazard.clone()));

    let (fr, fg, fb) = FOOD_COLOR;
    let food = if use_color {
        FOOD.truecolor(fr, fg, fb).to_string()
    } else {
        FOOD.to_string()
    };
    board.food.iter().for_each(|p| put(p, food.clone()));

    let mut legend = String::new();
    for snake in board.alive_snakes() {
        let Some(style) = styles.iter().find(|s| s.id == snake.id) else {
            continue;
        };
        let glyph = if use_color {
            let (r, g, b) = parse_snake_color(style.color);
            style.glyph.to_string().truecolor(r, g, b).to_string()
        } else {
            style.glyph.to_string()
        };
        snake.body.iter().for_each(|p| put(p, glyph.clone()));

        let _ = writeln!(
            legend,
            "{} {}: health {}, length {}, head {}",
            style.name,
            glyph,
            snake.health,
            snake.body.len(),
            snake.head().map(|h| h.to_string()).unwrap_or_default(),
        );
    }

    let mut out = String::new();
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "Hazards {HAZARD}: {}", board.hazards.len());
    let _ = writeln!(out, "Food {FOOD}: {}", board.food.len());
    out.push_str(&legend);
    for y in (0..height).rev() {
        for column in &cells {
            out.push_str(&column[y]);
        }
        out.push('\n');
    }
    out
}

/// Apply color to an elimination cause.
pub fn cause_colored(cause: EliminationCause) -> String {
    match cause {
        EliminationCause::NotEliminated => "alive".green().to_string(),
        EliminationCause::OutOfHealth => cause.as_str().yellow().to_string(),
        EliminationCause::BySquad => cause.as_str().dimmed().to_string(),
        _ => cause.as_str().red().to_string(),
    }
}

/// Build and print a table from headers and rows.
pub fn print_table(headers: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}

/// Print a key-value pair with proper formatting.
pub fn print_field(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

/// Print the end-of-game summary.
pub fn print_outcome(outcome: &GameOutcome, format: OutputFormat) -> color_eyre::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
        }
        OutputFormat::Human => {
            print_field("Game", &outcome.game_id);
            print_field("Ruleset", &outcome.ruleset);
            print_field("Map", &outcome.map);
            print_field("Seed", &outcome.seed.to_string());
            print_field("Turns", &outcome.turns.to_string());

            let result = match (&outcome.winner_name, outcome.is_draw) {
                (Some(name), _) => format!("{} wins", name).green().bold().to_string(),
                (None, true) => "Draw".yellow().to_string(),
                (None, false) => "No winner".dimmed().to_string(),
            };
            print_field("Result", &result);
            println!();

            let rows = outcome
                .snakes
                .iter()
                .map(|s| {
                    vec![
                        s.name.clone(),
                        s.length.to_string(),
                        s.health.to_string(),
                        cause_colored(s.eliminated_cause),
                        s.eliminated_by.clone().unwrap_or_default(),
                        s.eliminated_on_turn
                            .map(|t| t.to_string())
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(
                vec!["Snake", "Length", "Health", "Status", "By", "Turn"],
                rows,
            );
        }
    }
    Ok(())
}
