#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteState {
    #[default]
    Closed,
    Open,
}

impl PaletteState {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}
