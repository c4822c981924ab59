//! Sentence-aware, overlapping word-window chunking.
//!
//! A chunk covers at most `size` words. When the window does not reach the
//! end of the text it is shortened to the last sentence end inside it, as
//! long as that still leaves more than `overlap` words, so chunks avoid
//! cutting sentences. The next chunk starts `overlap` words before the
//! previous one ended. Output depends only on the input text and parameters.

use std::ops::Range;

use bizprofile_core::SiteUrl;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub text: String,
    /// Position in the final chunk sequence across all pages.
    pub index: usize,
    /// Page the chunk's first word came from.
    pub source_page: SiteUrl,
}

/// Chunk the concatenated texts of `pages`, in the given order.
#[must_use]
pub fn chunk_pages(pages: &[(SiteUrl, String)], size: usize, overlap: usize) -> Vec<Chunk> {
    let mut words: Vec<&str> = Vec::new();
    let mut owner: Vec<usize> = Vec::new();
    for (page_idx, (_, text)) in pages.iter().enumerate() {
        for word in text.split_whitespace() {
            words.push(word);
            owner.push(page_idx);
        }
    }

    word_spans(&words, size, overlap)
        .into_iter()
        .enumerate()
        .map(|(index, span)| Chunk {
            text: words[span.clone()].join(" "),
            index,
            source_page: pages[owner[span.start]].0.clone(),
        })
        .collect()
}

/// Chunk a single text attributed to `source`.
#[must_use]
pub fn chunk_text(text: &str, source: &SiteUrl, size: usize, overlap: usize) -> Vec<Chunk> {
    chunk_pages(&[(source.clone(), text.to_string())], size, overlap)
}

/// Word index ranges for each chunk.
fn word_spans(words: &[&str], size: usize, overlap: usize) -> Vec<Range<usize>> {
    let n = words.len();
    let size = size.max(1);
    let overlap = overlap.min(size - 1);

    let mut spans = Vec::new();
    let mut start = 0;
    while start < n {
        let hard_end = (start + size).min(n);
        let end = if hard_end < n {
            last_sentence_end(words, start + overlap, hard_end).unwrap_or(hard_end)
        } else {
            n
        };
        spans.push(start..end);
        if end == n {
            break;
        }
        start = end - overlap;
    }
    spans
}

/// Largest `b` in `(lo, hi]` such that word `b - 1` ends a sentence.
fn last_sentence_end(words: &[&str], lo: usize, hi: usize) -> Option<usize> {
    (lo + 1..=hi).rev().find(|&b| ends_sentence(words[b - 1]))
}

fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(['"', '\'', ')', ']', '\u{201d}'])
        .ends_with(['.', '!', '?'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteUrl {
        SiteUrl::parse("https://acme.com").unwrap()
    }

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn thousand_words_size_400_overlap_50_gives_three_chunks() {
        let chunks = chunk_text(&numbered_words(1000), &site(), 400, 50);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].text.starts_with("w0 "));
        assert!(chunks[0].text.ends_with(" w399"));
        assert!(chunks[1].text.starts_with("w350 "));
        assert!(chunks[1].text.ends_with(" w749"));
        assert!(chunks[2].text.starts_with("w700 "));
        assert!(chunks[2].text.ends_with(" w999"));
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "Acme fixes pipes. We serve the whole city! Call today? ".repeat(60);
        let a = chunk_text(&text, &site(), 50, 10);
        let b = chunk_text(&text, &site(), 50, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn prefers_sentence_boundaries() {
        // Five-word sentences; a 12-word window never ends mid-sentence.
        let text = "one two three four five. ".repeat(10);
        let chunks = chunk_text(&text, &site(), 12, 2);
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].text.split_whitespace().count(), 10);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.text.ends_with('.'), "chunk cut mid-sentence: {}", chunk.text);
        }
    }

    #[test]
    fn overlap_repeats_tail_words() {
        let chunks = chunk_text(&numbered_words(30), &site(), 10, 3);
        let first: Vec<&str> = chunks[0].text.split_whitespace().collect();
        let second: Vec<&str> = chunks[1].text.split_whitespace().collect();
        assert_eq!(&first[first.len() - 3..], &second[..3]);
    }

    #[test]
    fn long_sentence_is_hard_cut() {
        let chunks = chunk_text(&numbered_words(25), &site(), 10, 0);
        assert_eq!(
            chunks
                .iter()
                .map(|c| c.text.split_whitespace().count())
                .collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("   ", &site(), 180, 30).is_empty());
    }

    #[test]
    fn chunks_are_attributed_to_their_first_word_page() {
        let about = SiteUrl::parse("https://acme.com/about").unwrap();
        let pages = vec![
            (site(), numbered_words(8)),
            (about.clone(), numbered_words(8)),
        ];
        let chunks = chunk_pages(&pages, 6, 1);
        assert_eq!(chunks[0].source_page, site());
        assert_eq!(chunks.last().unwrap().source_page, about);
        let total_words: usize = chunks.iter().map(|c| c.text.split_whitespace().count()).sum();
        assert!(total_words >= 16);
    }
}
