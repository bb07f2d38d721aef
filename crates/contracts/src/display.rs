//! CompositeFrame - compositor output
//!
//! The base image with the overlay panel already painted, plus the text lines
//! the display collaborator rasterises on top.

use serde::{Deserialize, Serialize};

use crate::{ContractError, Frame};

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
}

/// Axis-aligned rectangle, in pixels, inclusive of `x0,y0` and exclusive of `x1,y1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PanelRect {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// One overlay text line, anchored at its baseline origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub x: i64,
    pub y: i64,
    pub text: String,
    pub color: Rgb,
}

/// Frame ready to be presented
#[derive(Debug, Clone)]
pub struct CompositeFrame {
    /// Compositor tick that produced this frame (starts at 1)
    pub tick: u64,

    /// Base image with the opaque panel painted in
    pub image: Frame,

    /// Panel area
    pub panel: PanelRect,

    /// Overlay text, one line per non-camera sensor
    pub lines: Vec<TextLine>,
}

/// Display collaborator
///
/// `present` shows the composite, waits at most the configured tick delay for
/// user input and returns `true` when a stop was requested.
pub trait DisplaySurface: Send {
    /// Display name (for logs)
    fn name(&self) -> &str;

    fn present(&mut self, frame: &CompositeFrame) -> Result<bool, ContractError>;

    /// Tear the surface down. Called exactly once by the compositor.
    fn close(&mut self) {}
}
