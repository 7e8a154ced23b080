//! Length-bounded segmentation of plain text for a translation backend with a
//! per-request character ceiling.
//!
//! Lengths are counted in `char`s. Segments are contiguous slices of the input,
//! so concatenating them in order always reproduces it exactly.

/// A contiguous slice of the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    /// Byte offset of `text` within the input.
    pub offset: usize,
    pub text: &'a str,
}

impl TextSegment<'_> {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits `text` into ordered segments of at most `max_len` characters.
///
/// Packing prefers newline boundaries, then sentence boundaries (a run of
/// `.`, `!` or `?` followed by whitespace), and finally cuts long runs after
/// the last whitespace that fits, or mid-word when there is none. A `max_len`
/// of zero is treated as one.
pub fn split(text: &str, max_len: usize) -> Vec<TextSegment<'_>> {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        return vec![TextSegment { offset: 0, text }];
    }

    let mut packer = Packer::new(text, max_len);
    for paragraph in text.split_inclusive('\n') {
        if paragraph.chars().count() <= max_len {
            packer.push(paragraph);
            continue;
        }
        for sentence in sentences(paragraph) {
            if sentence.chars().count() <= max_len {
                packer.push(sentence);
            } else {
                for piece in hard_pieces(sentence, max_len) {
                    packer.push(piece);
                }
            }
        }
    }
    packer.finish()
}

/// Greedy accumulator over consecutive slices of `source`.
struct Packer<'a> {
    source: &'a str,
    max_len: usize,
    start: usize,
    end: usize,
    chars: usize,
    segments: Vec<TextSegment<'a>>,
}

impl<'a> Packer<'a> {
    fn new(source: &'a str, max_len: usize) -> Self {
        Self {
            source,
            max_len,
            start: 0,
            end: 0,
            chars: 0,
            segments: Vec::new(),
        }
    }

    /// `unit` must be the slice of `source` immediately following the
    /// previously pushed one.
    fn push(&mut self, unit: &'a str) {
        let unit_chars = unit.chars().count();
        if self.chars > 0 && self.chars + unit_chars > self.max_len {
            self.flush();
        }
        self.end += unit.len();
        self.chars += unit_chars;
    }

    fn flush(&mut self) {
        self.segments.push(TextSegment {
            offset: self.start,
            text: &self.source[self.start..self.end],
        });
        self.start = self.end;
        self.chars = 0;
    }

    fn finish(mut self) -> Vec<TextSegment<'a>> {
        if self.chars > 0 {
            self.flush();
        }
        self.segments
    }
}

fn is_terminal_punctuation(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Splits after each punctuation run that is followed by whitespace (the
/// whitespace stays with the sentence) or by the end of the text.
fn sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_terminal_punctuation(c) {
            continue;
        }
        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if !is_terminal_punctuation(next) {
                break;
            }
            end = next_idx + next.len_utf8();
            chars.next();
        }
        let mut saw_space = false;
        while let Some(&(next_idx, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            end = next_idx + next.len_utf8();
            saw_space = true;
            chars.next();
        }
        if saw_space || end == text.len() {
            pieces.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Cuts a run with no usable sentence boundary into windows of at most
/// `max_len` characters.
fn hard_pieces(text: &str, max_len: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while let Some((limit, _)) = rest.char_indices().nth(max_len) {
        let window = &rest[..limit];
        let cut = window
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, c)| idx + c.len_utf8())
            .unwrap_or(limit);
        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}
