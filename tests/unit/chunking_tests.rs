/*!
 * Tests for the text chunking engine
 */

use vasha::chunking::TextChunker;

/// Test that short text passes through as a single chunk
#[test]
fn test_split_withTextWithinCeiling_shouldReturnOneChunk() {
    let chunker = TextChunker::new(100);
    let chunks = chunker.split("This fits in one request.");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].text, "This fits in one request.");
}

/// Test that empty input yields no chunks
#[test]
fn test_split_withEmptyText_shouldReturnNoChunks() {
    let chunker = TextChunker::new(100);
    assert!(chunker.split("").is_empty());
}

/// Test the sizing over a long sentence-structured text
#[test]
fn test_split_with5000CharsAnd2000Ceiling_shouldYieldThreeChunks() {
    // 100 sentences of exactly 50 characters each
    let sentence = format!("{}. ", "x".repeat(48));
    let text = sentence.repeat(100);
    assert_eq!(text.chars().count(), 5000);

    let chunker = TextChunker::new(2000);
    let chunks = chunker.split(&text);

    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 2000, "chunk {} too large", chunk.index);
    }

    // Indices are contiguous and concatenation reproduces the input
    let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined, text);
}

/// Test the whitespace fallback for a sentence longer than the ceiling
#[test]
fn test_split_withOversizedSentence_shouldFallBackToWordBoundaries() {
    let text = "one two three four five six seven eight nine ten eleven twelve";
    let chunker = TextChunker::new(20);
    let chunks = chunker.split(text);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 20);
        // No word is cut in half: every chunk ends at a boundary
        assert!(chunk.text.ends_with(' ') || text.ends_with(&chunk.text));
    }
    let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined, text);
}

/// Test the hard character cut for a single token over the ceiling
#[test]
fn test_split_withOversizedWord_shouldHardCutWithoutLosingText() {
    let word = "a".repeat(50);
    let chunker = TextChunker::new(16);
    let chunks = chunker.split(&word);

    assert!(chunks.len() >= 3);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 16);
    }
    let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined, word);
}

/// Test Devanagari danda as a sentence boundary
#[test]
fn test_split_withDevanagariText_shouldBreakAtDanda() {
    let text = "पहला वाक्य यहाँ है। दूसरा वाक्य यहाँ है। तीसरा वाक्य यहाँ है। चौथा वाक्य यहाँ है।";
    let per_sentence = text.chars().count() / 4 + 2;
    let chunker = TextChunker::new(per_sentence.max(16));
    let chunks = chunker.split(text);

    assert!(chunks.len() > 1);
    let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined, text);
    // Every chunk but the last closes on a danda (plus optional space)
    for chunk in &chunks[..chunks.len() - 1] {
        assert!(chunk.text.trim_end().ends_with('।'), "chunk {:?}", chunk.text);
    }
}

/// Test reassembly ordering
#[test]
fn test_reassemble_withOutOfOrderOutputs_shouldSortByChunkIndex() {
    let chunker = TextChunker::new(100);
    let outputs = vec![
        (2, "tail".to_string()),
        (0, "head ".to_string()),
        (1, "middle ".to_string()),
    ];

    assert_eq!(chunker.reassemble(outputs), "head middle tail");
}

/// Test the joiner when translated outputs come back without their separators
#[test]
fn test_reassemble_withSeparatorlessOutputs_shouldJoinWithSingleSpaces() {
    let chunker = TextChunker::new(100);
    let outputs = vec![(0, "Hello.".to_string()), (1, "World.".to_string())];

    assert_eq!(chunker.reassemble(outputs), "Hello. World.");
}

/// Test that split-then-reassemble reproduces the input when separators survive
#[test]
fn test_reassemble_withIntactSeparators_shouldReproduceTheInput() {
    let text = "First sentence. Second sentence. Third sentence. ".repeat(5);
    let chunker = TextChunker::new(40);

    let outputs: Vec<(usize, String)> = chunker
        .split(&text)
        .into_iter()
        .map(|chunk| (chunk.index, chunk.text))
        .collect();

    assert_eq!(chunker.reassemble(outputs), text);
}

/// Test the ceiling clamp for degenerate configurations
#[test]
fn test_new_withTinyCeiling_shouldClampToAUsableMinimum() {
    let chunker = TextChunker::new(1);
    assert_eq!(chunker.max_chars(), 16);

    let chunks = chunker.split("tiny ceiling still chunks whole words where it can");
    let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined, "tiny ceiling still chunks whole words where it can");
}
