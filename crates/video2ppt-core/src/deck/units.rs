/// English Metric Units per inch, the native length unit of OOXML.
pub const EMU_PER_INCH: i64 = 914_400;

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Emu(pub i64);

/// A rectangle on the slide canvas, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: Emu,
    pub y: Emu,
    pub w: Emu,
    pub h: Emu,
}

/// Slide size shared by every slide in a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: Emu,
    pub height: Emu,
}

impl Canvas {
    /// 10 x 7.5 in, 4:3.
    pub const STANDARD: Canvas = Canvas {
        width: Emu(10 * EMU_PER_INCH),
        height: Emu(15 * EMU_PER_INCH / 2),
    };

    /// Edge-to-edge placement covering the whole canvas.
    pub fn full_bleed(self) -> Placement {
        Placement {
            x: Emu(0),
            y: Emu(0),
            w: self.width,
            h: self.height,
        }
    }
}
