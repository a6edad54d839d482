//! Draws the framebuffer into the terminal.
use chip::{definitions::display, display::Framebuffer};
use tui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::definitions::screen::PIXEL;

/// The space the border of the block takes up.
const BORDER: u16 = 2;

/// Every pixel is `scale` cells wide, two pixel rows share a single cell
/// row.
pub struct Screen<'a> {
    frame: &'a Framebuffer,
    foreground: Color,
    background: Color,
}

impl<'a> Screen<'a> {
    pub fn new(frame: &'a Framebuffer) -> Self {
        Self {
            frame,
            foreground: Color::White,
            background: Color::Black,
        }
    }

    fn color(&self, pixel: bool) -> Color {
        if pixel {
            self.foreground
        } else {
            self.background
        }
    }
}

/// The biggest horizontal scale that still fits into `width` cells.
pub fn scale(width: u16) -> u16 {
    (width.saturating_sub(BORDER) / display::WIDTH as u16).max(1)
}

/// The bordered area the screen is drawn in, centered in `area`.
pub fn layout(area: Rect) -> Rect {
    let width = (display::WIDTH as u16 * scale(area.width) + BORDER).min(area.width);
    let height = (display::HEIGHT as u16 / 2 + BORDER).min(area.height);

    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl<'a> Widget for Screen<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let scale = scale(area.width + BORDER) as usize;
        let rows = self.frame.rows();

        for (cell_y, pair) in rows.chunks(2).enumerate().take(self.frame.height() / 2) {
            let y = area.y as usize + cell_y;
            if y >= area.bottom() as usize {
                break;
            }

            for x in 0..self.frame.width() {
                let top = pair[0][x];
                let bottom = pair.get(1).map_or(false, |row| row[x]);

                for offset in 0..scale {
                    let cell_x = area.x as usize + x * scale + offset;
                    if cell_x >= area.right() as usize {
                        break;
                    }
                    buf.get_mut(cell_x as u16, y as u16)
                        .set_symbol(PIXEL)
                        .set_fg(self.color(top))
                        .set_bg(self.color(bottom));
                }
            }
        }
    }
}
