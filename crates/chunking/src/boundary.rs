/// Character-indexed view over a borrowed string.
///
/// Positions are counted in `char`s; `offsets` maps each position to its byte
/// offset so slices always land on code point boundaries.
pub(crate) struct CharView<'a> {
    text: &'a str,
    offsets: Vec<usize>,
}

impl<'a> CharView<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let offsets = text.char_indices().map(|(offset, _)| offset).collect();
        Self { text, offsets }
    }

    pub(crate) fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Slices `[start, end)` in character positions, clamped to the text.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }

    /// Last ASCII space in the inclusive position range `[lo, hi]`.
    ///
    /// `hi` past the end of the text searches from the final character.
    pub(crate) fn last_space_between(&self, lo: usize, hi: usize) -> Option<usize> {
        let hi = hi.min(self.len().checked_sub(1)?);
        if lo > hi {
            return None;
        }

        let bytes = self.text.as_bytes();
        (lo..=hi).rev().find(|&pos| bytes[self.offsets[pos]] == b' ')
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.offsets.get(pos).copied().unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_last_space_in_range() {
        let view = CharView::new("ab cd ef");
        assert_eq!(view.last_space_between(0, 7), Some(5));
        assert_eq!(view.last_space_between(0, 4), Some(2));
        assert_eq!(view.last_space_between(3, 4), None);
        assert_eq!(view.last_space_between(0, 99), Some(5));
    }

    #[test]
    fn empty_and_inverted_ranges() {
        assert_eq!(CharView::new("").last_space_between(0, 10), None);
        assert_eq!(CharView::new("a b").last_space_between(5, 2), None);
    }

    #[test]
    fn slices_by_characters() {
        let view = CharView::new("héllo wörld");
        assert_eq!(view.len(), 11);
        assert_eq!(view.slice(0, 5), "héllo");
        assert_eq!(view.slice(6, 50), "wörld");
        assert_eq!(view.last_space_between(0, 10), Some(5));
    }

    #[test]
    fn ignores_non_ascii_whitespace() {
        let view = CharView::new("a\u{00a0}b\tc");
        assert_eq!(view.last_space_between(0, 4), None);
    }
}
