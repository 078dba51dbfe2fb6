use std::fmt::Display;

/// Half-open byte range `[start, end)` into the program source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SrcSpan {
    pub start: u32,
    pub end: u32,
}

impl SrcSpan {
	pub fn from(start: u32, end: u32) -> Self {
		Self { start, end }
	}

	/// Span covering both `self` and `other`.
	pub fn to(self, other: SrcSpan) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	pub fn len(&self) -> u32 {
		self.end.saturating_sub(self.start)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Display for SrcSpan {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}..{}", self.start, self.end)
	}
}
