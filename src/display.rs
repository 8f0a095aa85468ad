/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game.  No game logic is performed; this module only translates state
/// into terminal commands, scaling the 800×600 world onto whatever cell
/// grid the terminal offers.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use space_shooter::entities::Rect;
use space_shooter::score::Leaderboard;
use space_shooter::{RenderSink, RoundSummary, Rules, Snapshot};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_BEST: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_ADVERSARY: Color = Color::Red;
const C_PROJECTILE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Cyan;

const PLAY_HINT: &str = "← → / A D : Move   SPACE : Shoot   ESC : Menu   Q : Quit";

// ── Screen geometry ───────────────────────────────────────────────────────────

/// Maps world coordinates onto the terminal play area.
///
/// Row 0 is the HUD, row 1 the top border, the last two rows the bottom
/// border and the controls hint.
#[derive(Clone, Copy, Debug)]
struct Viewport {
    width: u16,
    height: u16,
    world_width: f32,
    world_height: f32,
}

impl Viewport {
    fn inner_cols(&self) -> u16 {
        self.width.saturating_sub(2).max(1)
    }

    fn inner_rows(&self) -> u16 {
        self.height.saturating_sub(4).max(1)
    }

    /// Cells covered by `rect`, clipped to the play area.  Every visible
    /// rect covers at least one cell.
    fn cells(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let sx = f32::from(self.inner_cols()) / self.world_width;
        let sy = f32::from(self.inner_rows()) / self.world_height;

        let left = (rect.x * sx).floor().max(0.0);
        let top = (rect.y * sy).floor().max(0.0);
        let right = (rect.right() * sx).ceil().min(f32::from(self.inner_cols()));
        let bottom = (rect.bottom() * sy).ceil().min(f32::from(self.inner_rows()));
        if right <= left || bottom <= top {
            return None;
        }
        let (left, top) = (left as u16, top as u16);
        let (right, bottom) = (right as u16, bottom as u16);
        Some((1 + left, 2 + top, right - left, bottom - top))
    }
}

// ── RenderSink ────────────────────────────────────────────────────────────────

/// Draws every running tick to the terminal.
pub struct TerminalSink<W: Write> {
    out: W,
    world_width: f32,
    world_height: f32,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, rules: &Rules) -> Self {
        Self {
            out,
            world_width: rules.world_width,
            world_height: rules.world_height,
        }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    fn viewport(&self) -> std::io::Result<Viewport> {
        let (width, height) = terminal::size()?;
        Ok(Viewport {
            width,
            height,
            world_width: self.world_width,
            world_height: self.world_height,
        })
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    type Error = std::io::Error;

    /// Render one complete frame.
    fn present(&mut self, snapshot: &Snapshot<'_>) -> std::io::Result<()> {
        let view = self.viewport()?;
        let out = &mut self.out;
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        draw_border(out, &view)?;
        draw_hud(out, &view, snapshot.score, snapshot.best_score)?;

        for adversary in snapshot.adversaries() {
            fill_rect(out, &view, &adversary.rect, "▓", C_ADVERSARY)?;
        }
        for projectile in snapshot.projectiles() {
            fill_rect(out, &view, &projectile.rect, "║", C_PROJECTILE)?;
        }
        fill_rect(out, &view, &snapshot.player().rect, "█", C_PLAYER)?;

        out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(PLAY_HINT))?;

        // Park cursor in a harmless spot and flush
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
        out.flush()
    }
}

// ── Border & HUD ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, view: &Viewport, score: u32, best: u32) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {score:>6}")))?;

    let best_str = format!("High Score: {best:>6}");
    let bx = view.width.saturating_sub(best_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(bx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_BEST))?;
    out.queue(Print(best_str))?;
    Ok(())
}

fn fill_rect<W: Write>(
    out: &mut W,
    view: &Viewport,
    rect: &Rect,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    let Some((col, row, cols, rows)) = view.cells(rect) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(color))?;
    let line = glyph.repeat(cols as usize);
    for r in row..row + rows {
        out.queue(cursor::MoveTo(col, r))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── Menu & game-over screens ──────────────────────────────────────────────────

fn centered<W: Write>(out: &mut W, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let (width, _) = terminal::size()?;
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_leaderboard<W: Write>(out: &mut W, first_row: u16, board: &Leaderboard) -> std::io::Result<()> {
    if board.is_empty() {
        return Ok(());
    }
    centered(out, first_row, "── Leaderboard ──", Color::White)?;
    for (i, entry) in board.entries().iter().enumerate() {
        let line = format!("{:>2}. {:<10} {:>6}", entry.rank, entry.name, entry.score);
        centered(out, first_row + 1 + i as u16, &line, Color::DarkGrey)?;
    }
    Ok(())
}

pub fn draw_menu<W: Write>(out: &mut W, best: u32, board: &Leaderboard) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (_, height) = terminal::size()?;
    let top = (height / 2).saturating_sub(10);

    centered(out, top, "★  SPACE  SHOOTER  ★", C_TITLE)?;
    centered(out, top + 2, "Use ← → to move, SPACE to shoot!", Color::White)?;
    centered(
        out,
        top + 3,
        "Destroy enemies to earn points. Don't let them reach the bottom!",
        Color::White,
    )?;
    centered(out, top + 5, &format!("High Score: {best}"), Color::Yellow)?;
    centered(out, top + 7, "ENTER : Start Game   Q : Quit", C_HINT)?;
    draw_leaderboard(out, top + 9, board)?;

    out.queue(style::ResetColor)?;
    out.flush()
}

pub fn draw_game_over<W: Write>(
    out: &mut W,
    summary: Option<&RoundSummary>,
    best: u32,
    board: &Leaderboard,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (_, height) = terminal::size()?;
    let top = (height / 2).saturating_sub(10);

    let lines: &[&str] = &[
        "╔════════════════════╗",
        "║    GAME  OVER      ║",
        "╚════════════════════╝",
    ];
    for (i, line) in lines.iter().enumerate() {
        centered(out, top + i as u16, line, Color::Red)?;
    }

    let score = summary.map_or(0, |s| s.score);
    centered(out, top + 4, &format!("Final Score: {score:>6}"), Color::Yellow)?;
    let best_line = match summary.and_then(|s| s.new_best) {
        Some(b) => format!("★ NEW BEST: {b:>6} ★"),
        None => format!("High Score:  {best:>6}"),
    };
    centered(out, top + 5, &best_line, Color::Yellow)?;
    if let Some(rank) = summary.and_then(|s| s.rank) {
        centered(out, top + 6, &format!("Leaderboard rank #{rank}"), Color::White)?;
    }
    centered(out, top + 8, "R : Play Again   ESC : Menu   Q : Quit", C_HINT)?;
    draw_leaderboard(out, top + 10, board)?;

    out.queue(style::ResetColor)?;
    out.flush()
}
