//! Source position types used by diagnostics

/// Line number in a source file
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Line(pub u32);

/// Column index within a line in a source file
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Column(pub u32);

impl Line {
    /// Line number of the start of a file
    pub fn first() -> Line {
        Line(1)
    }

    /// Move to the next line
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

impl Column {
    /// Column number of the start of a line
    pub fn first() -> Column {
        Column(1)
    }

    /// Move to the next column
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
