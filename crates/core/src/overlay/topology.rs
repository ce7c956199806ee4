//! Connectivity of the standard 68-point facial landmark layout.

/// Consecutive landmark indices `start..=end` joined into a polyline,
/// optionally closed back to `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub closed: bool,
}

impl Chain {
    const fn open(name: &'static str, start: usize, end: usize) -> Self {
        Self {
            name,
            start,
            end,
            closed: false,
        }
    }

    const fn closed(name: &'static str, start: usize, end: usize) -> Self {
        Self {
            name,
            start,
            end,
            closed: true,
        }
    }

    /// Index pairs of the chain's line segments.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let closing = self.closed.then_some((self.end, self.start));
        (self.start + 1..=self.end)
            .map(|i| (i - 1, i))
            .chain(closing)
    }
}

pub static FACE_68_CHAINS: [Chain; 9] = [
    Chain::open("jaw", 0, 16),
    Chain::open("right_brow", 17, 21),
    Chain::open("left_brow", 22, 26),
    Chain::open("nose_bridge", 27, 30),
    Chain::closed("nose_base", 30, 35),
    Chain::closed("right_eye", 36, 41),
    Chain::closed("left_eye", 42, 47),
    Chain::closed("outer_mouth", 48, 59),
    Chain::closed("inner_mouth", 60, 67),
];

pub fn face_68_segments() -> impl Iterator<Item = (usize, usize)> {
    FACE_68_CHAINS.iter().flat_map(|c| c.segments())
}
