/*!
 * Text chunking engine.
 *
 * Translation backends have per-request character ceilings, so long
 * transcripts are split into ordered chunks before a cascade pass and
 * reassembled after. Splits prefer sentence boundaries, then whitespace,
 * and only hard-cut when a single token exceeds the ceiling; separators
 * stay attached to their chunk. Reassembly concatenates in index order,
 * inserting a single space between outputs that lost their separator.
 */

use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence-ending punctuation (Latin and Devanagari danda) together with
/// any trailing whitespace, kept with the sentence it closes.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?\u{0964}\u{0965}\n]*(?:[.!?\u{0964}\u{0965}\n]+\s*|$)").unwrap());

/// One ordered piece of a larger text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the original text
    pub index: usize,
    /// The chunk's text, trailing separator included
    pub text: String,
}

/// Splits text to fit a character ceiling and reassembles results in order
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    /// Chunker for the given per-chunk character ceiling.
    /// Unreasonably small ceilings are clamped to keep splits meaningful.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars: max_chars.max(16) }
    }

    /// The effective per-chunk ceiling
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into ordered chunks, each at most `max_chars` characters.
    ///
    /// Empty input yields no chunks; input within the ceiling yields exactly
    /// one. Concatenating the chunk texts in index order reproduces the
    /// input byte for byte.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        if text.chars().count() <= self.max_chars {
            return vec![Chunk { index: 0, text: text.to_string() }];
        }

        let mut pieces: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0;

        for segment in self.segments(text) {
            let segment_chars = segment.chars().count();

            if current_chars + segment_chars > self.max_chars && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_chars = 0;
            }

            current.push_str(&segment);
            current_chars += segment_chars;
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk { index, text })
            .collect();

        let total: usize = chunks.iter().map(|c| c.text.len()).sum();
        if total != text.len() {
            error!(
                "Lost text during chunking! Original: {} bytes, after chunking: {} bytes",
                text.len(),
                total
            );
        } else {
            debug!("Split {} chars into {} chunks", text.chars().count(), chunks.len());
        }

        chunks
    }

    /// Join per-chunk outputs back into one text, in chunk-index order.
    /// The caller pairs each output with the index of the chunk it came from.
    ///
    /// Outputs that kept their trailing separator concatenate unchanged;
    /// outputs whose separator did not survive the backend are joined with
    /// a single space so words from adjacent chunks never run together.
    pub fn reassemble(&self, mut outputs: Vec<(usize, String)>) -> String {
        outputs.sort_by_key(|(index, _)| *index);
        let mut combined = String::new();
        for (_, text) in outputs {
            if !combined.is_empty() && !combined.ends_with(char::is_whitespace) {
                combined.push(' ');
            }
            combined.push_str(text.trim_start());
        }
        combined
    }

    /// Cut the text into ceiling-sized segments: sentences first, then
    /// whitespace-delimited words for oversized sentences, then raw
    /// character runs for oversized words.
    fn segments(&self, text: &str) -> Vec<String> {
        let mut segments = Vec::new();

        for sentence in SENTENCE_BOUNDARY.find_iter(text) {
            let sentence = sentence.as_str();
            if sentence.is_empty() {
                continue;
            }

            if sentence.chars().count() <= self.max_chars {
                segments.push(sentence.to_string());
                continue;
            }

            // Sentence alone exceeds the ceiling: fall back to word splits
            for word in split_keeping_whitespace(sentence) {
                if word.chars().count() <= self.max_chars {
                    segments.push(word);
                } else {
                    // Single token exceeds the ceiling: hard character cut
                    let chars: Vec<char> = word.chars().collect();
                    for piece in chars.chunks(self.max_chars) {
                        segments.push(piece.iter().collect());
                    }
                }
            }
        }

        segments
    }
}

/// Split into words with each word's trailing whitespace kept attached,
/// so concatenation reproduces the input.
fn split_keeping_whitespace(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_whitespace = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            in_whitespace = true;
            current.push(ch);
        } else {
            if in_whitespace {
                words.push(std::mem::take(&mut current));
                in_whitespace = false;
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}
