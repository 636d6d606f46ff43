//! Spectrum bars

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

const BAR_CHARS: &[char] = &[' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Share of the spectrum on screen; the top bins are mostly empty
const VISIBLE_BINS: f32 = 0.4;

struct SpectrumWidget<'a> {
    heights: &'a [f32],
    block: Option<Block<'a>>,
}

impl<'a> SpectrumWidget<'a> {
    fn new(heights: &'a [f32]) -> Self {
        SpectrumWidget { heights, block: None }
    }

    fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Colour for bar `i` of `n` at byte value `value`
pub fn bar_color(value: f32, i: usize, n: usize) -> Color {
    let pos = if n == 0 { 0.0 } else { i as f32 / n as f32 };
    let bar_height = value / 2.0;
    let r = (bar_height + 25.0 * pos).clamp(0.0, 255.0) as u8;
    let g = (250.0 * pos).clamp(0.0, 255.0) as u8;
    Color::Rgb(r, g, 50)
}

/// Average `heights` into `columns` buckets over the visible part of the spectrum.
pub fn bucket(heights: &[f32], columns: usize) -> Vec<f32> {
    if heights.is_empty() || columns == 0 {
        return vec![0.0; columns];
    }
    let visible = ((heights.len() as f32 * VISIBLE_BINS) as usize).clamp(1, heights.len());
    (0..columns)
        .map(|col| {
            let start = col * visible / columns;
            let end = ((col + 1) * visible / columns).max(start + 1).min(visible);
            let chunk = &heights[start.min(visible - 1)..end];
            chunk.iter().sum::<f32>() / chunk.len() as f32
        })
        .collect()
}

impl Widget for SpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 || self.heights.is_empty() {
            return;
        }

        let num_bars = inner.width as usize;
        let max_height = inner.height as usize;
        let columns = bucket(self.heights, num_bars);

        for (col, height) in columns.iter().enumerate() {
            let total_eighths = (height.clamp(0.0, 1.0) * (max_height * 8) as f32) as usize;
            let full_rows = total_eighths / 8;
            let remainder = total_eighths % 8;
            let color = bar_color(height * 255.0, col, num_bars);
            let x = inner.x + col as u16;

            for row in 0..max_height {
                let y = inner.y + (max_height - 1 - row) as u16;
                let ch = if row < full_rows {
                    '█'
                } else if row == full_rows && remainder > 0 {
                    BAR_CHARS[remainder]
                } else {
                    ' '
                };
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

pub fn render_visualizer(frame: &mut Frame, area: Rect, heights: &[f32], fullscreen: bool) {
    let title = if fullscreen { " Visualizer (F/Esc to exit) " } else { " Visualizer " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title);

    if heights.is_empty() {
        let idle = Paragraph::new("Nothing playing")
            .style(Style::default().fg(Color::DarkGray))
            .centered()
            .block(block);
        frame.render_widget(idle, area);
        return;
    }

    frame.render_widget(SpectrumWidget::new(heights).block(block), area);
}
