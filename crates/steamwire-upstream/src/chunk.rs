//! Splitting long text into translation-sized pieces.
//!
//! Cuts prefer paragraph breaks, then sentence ends, then whitespace, and
//! only fall back to a hard cut inside a word. Concatenating every chunk's
//! `body` followed by its `separator` reproduces the input exactly.

/// A piece of text plus the whitespace that followed it in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub body: &'a str,
    pub separator: &'a str,
}

const SENTENCE_ENDS: [&str; 6] = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

/// Split `text` into chunks whose bodies hold at most `max_chars` characters.
pub fn split(text: &str, max_chars: usize) -> Vec<Chunk<'_>> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let rest = &text[start..];
        let limit = byte_offset_of_char(rest, max_chars);
        let cut = if limit >= rest.len() {
            rest.len()
        } else {
            find_cut(&rest[..limit])
        };
        chunks.push(to_chunk(&rest[..cut]));
        start += cut;
    }

    if chunks.is_empty() {
        chunks.push(Chunk {
            body: text,
            separator: "",
        });
    }
    chunks
}

/// Byte offset just past the first `n` chars of `s` (or `s.len()`).
fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Best cut position inside `window`, always greater than zero.
fn find_cut(window: &str) -> usize {
    if let Some(i) = window.rfind("\n\n") {
        if i > 0 {
            return i + 2;
        }
    }

    let sentence = SENTENCE_ENDS
        .iter()
        .filter_map(|p| window.rfind(p).map(|i| i + p.len()))
        .max();
    if let Some(cut) = sentence {
        return cut;
    }

    if let Some((i, ch)) = window
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
    {
        if i > 0 {
            return i + ch.len_utf8();
        }
    }

    window.len()
}

fn to_chunk(segment: &str) -> Chunk<'_> {
    let body = segment.trim_end();
    Chunk {
        body,
        separator: &segment[body.len()..],
    }
}

/// Reassemble translated bodies with the original separators, in order.
pub fn join<S: AsRef<str>>(chunks: &[Chunk<'_>], translated: &[S]) -> String {
    let mut out = String::new();
    for (chunk, text) in chunks.iter().zip(translated) {
        out.push_str(text.as_ref());
        out.push_str(chunk.separator);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[Chunk<'_>]) -> String {
        let bodies: Vec<&str> = chunks.iter().map(|c| c.body).collect();
        join(chunks, &bodies)
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split("Update Released", 1500);
        assert_eq!(
            chunks,
            vec![Chunk {
                body: "Update Released",
                separator: ""
            }]
        );
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = "First paragraph. Still first.\n\nSecond paragraph here.";
        let chunks = split(text, 40);
        assert_eq!(chunks[0].body, "First paragraph. Still first.");
        assert_eq!(chunks[0].separator, "\n\n");
        assert_eq!(chunks[1].body, "Second paragraph here.");
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_falls_back_to_sentence_end() {
        let text = "One two three. Four five six. Seven eight nine.";
        let chunks = split(text, 20);
        assert_eq!(chunks[0].body, "One two three.");
        assert_eq!(chunks[0].separator, " ");
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_hard_cut_without_whitespace() {
        let text = "a".repeat(25);
        let chunks = split(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_bodies_respect_limit_and_round_trip() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua!\n\n\
                    Ut enim ad minim veniam? Quis nostrud exercitation ullamco laboris."
            .repeat(8);
        for max in [7, 16, 50, 120, 333] {
            let chunks = split(&text, max);
            for c in &chunks {
                assert!(c.body.chars().count() <= max, "chunk over {max}: {:?}", c.body);
            }
            assert_eq!(reassemble(&chunks), text);
        }
    }

    #[test]
    fn test_multibyte_text_is_split_on_char_boundaries() {
        let text = "Mise à jour publiée. Événement spécial bientôt. ".repeat(5);
        let chunks = split(&text, 30);
        for c in &chunks {
            assert!(c.body.chars().count() <= 30);
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_empty_text() {
        let chunks = split("", 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].body, "");
    }
}
