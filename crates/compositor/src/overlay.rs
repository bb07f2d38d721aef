//! Overlay layout and panel painting
//!
//! A white panel anchored to the bottom-right corner, one text line per
//! non-camera sensor. Glyph rasterisation is left to the display.

use contracts::{CompositeFrame, Frame, PanelRect, Reading, Rgb, TextLine};

/// Overlay geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub panel_width: u32,
    pub min_panel_height: u32,
    /// Text inset from the panel's left edge
    pub text_inset: u32,
    /// First baseline, measured from the panel top
    pub first_baseline: u32,
    pub line_spacing: u32,
    /// Space below the last baseline
    pub bottom_margin: u32,
    pub panel_color: Rgb,
    pub text_color: Rgb,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            panel_width: 200,
            min_panel_height: 100,
            text_inset: 10,
            first_baseline: 30,
            line_spacing: 25,
            bottom_margin: 20,
            panel_color: Rgb::WHITE,
            text_color: Rgb::BLACK,
        }
    }
}

impl OverlayLayout {
    /// Unclipped panel height for `lines` text lines
    pub fn panel_height(&self, lines: usize) -> u32 {
        let extra = self.line_spacing * (lines.max(1) as u32 - 1);
        (self.first_baseline + extra + self.bottom_margin).max(self.min_panel_height)
    }

    /// Panel rectangle for a frame, clipped to the frame
    pub fn panel(&self, width: u32, height: u32, lines: usize) -> PanelRect {
        PanelRect {
            x0: width.saturating_sub(self.panel_width),
            y0: height.saturating_sub(self.panel_height(lines)),
            x1: width,
            y1: height,
        }
    }

    /// Text lines for the given values, `Sensor{i}:{value}`
    ///
    /// Positions are anchored to the unclipped panel and may fall outside
    /// small frames.
    pub fn lines(
        &self,
        frame_width: u32,
        frame_height: u32,
        values: &[&Reading],
    ) -> Vec<TextLine> {
        let x = frame_width as i64 - self.panel_width as i64 + self.text_inset as i64;
        let top = frame_height as i64 - self.panel_height(values.len()) as i64;

        values
            .iter()
            .enumerate()
            .map(|(i, value)| TextLine {
                x,
                y: top + self.first_baseline as i64 + (self.line_spacing as i64 * i as i64),
                text: format!("Sensor{i}:{value}"),
                color: self.text_color,
            })
            .collect()
    }

    /// Paint the panel onto a copy of `base` and attach the text lines
    pub fn compose<'a>(
        &self,
        tick: u64,
        base: &Frame,
        values: impl IntoIterator<Item = &'a Reading>,
    ) -> CompositeFrame {
        let values: Vec<&Reading> = values.into_iter().collect();
        let panel = self.panel(base.width, base.height, values.len());
        let lines = self.lines(base.width, base.height, &values);
        let image = paint_rect(base, &panel, self.panel_color);

        CompositeFrame {
            tick,
            image,
            panel,
            lines,
        }
    }
}

/// Fill `rect` with `color`, returning a new frame
fn paint_rect(base: &Frame, rect: &PanelRect, color: Rgb) -> Frame {
    let mut data = base.data.to_vec();
    if data.len() != base.width as usize * base.height as usize * 3 {
        return base.clone();
    }

    let stride = base.width as usize * 3;
    for y in rect.y0..rect.y1.min(base.height) {
        let row = y as usize * stride;
        let start = row + rect.x0 as usize * 3;
        let end = row + rect.x1.min(base.width) as usize * 3;
        for px in data[start..end].chunks_exact_mut(3) {
            px.copy_from_slice(&color.0);
        }
    }

    Frame::new(base.resolution(), data).unwrap_or_else(|| base.clone())
}
