//! Text segmentation for speak-by-parts
//!
//! Splits text into fragments that are spoken one backend utterance at a
//! time. Splitting never consumes characters, so the fragments always
//! concatenate back to the input and their offsets can be used to
//! highlight the original text.
//!
//! A boundary sits either right before a newline, or right after a
//! sentence end: at least ten "body" characters, a terminator, then one
//! whitespace character. The ten-character run keeps short clauses and
//! abbreviations such as "Mr. Smith" together.

use std::ops::Range;

/// Minimum run of body characters before a terminator counts as a sentence end
const MIN_BODY_RUN: usize = 10;

/// A `[start, end)` byte range of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
}

impl Fragment {
    /// The slice of `text` this fragment covers
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.range()]
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `text` into ordered fragments.
///
/// Empty input yields one empty fragment; any other input yields only
/// non-empty fragments.
pub fn segment(text: &str) -> Vec<Fragment> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut fragments = Vec::new();
    let mut start = 0;
    // runs[k]: length of the body-character run ending at chars[k]
    let mut runs: Vec<usize> = Vec::with_capacity(chars.len());

    for (i, &(offset, c)) in chars.iter().enumerate() {
        if i > 0 && is_boundary(&chars, &runs, i) {
            fragments.push(Fragment { start, end: offset });
            start = offset;
        }
        let run = if is_body(c) {
            runs.last().copied().unwrap_or(0) + 1
        } else {
            0
        };
        runs.push(run);
    }

    fragments.push(Fragment {
        start,
        end: text.len(),
    });
    fragments
}

/// Split `text` into fragment strings
pub fn split(text: &str) -> Vec<&str> {
    segment(text).iter().map(|f| f.slice(text)).collect()
}

/// Whether a split point sits right before `chars[i]`
fn is_boundary(chars: &[(usize, char)], runs: &[usize], i: usize) -> bool {
    if chars[i].1 == '\n' {
        return true;
    }
    if i < MIN_BODY_RUN + 2 {
        return false;
    }
    is_whitespace(chars[i - 1].1) && is_terminator(chars[i - 2].1) && runs[i - 3] >= MIN_BODY_RUN
}

/// Letters, digits and the light punctuation that can sit inside a sentence.
/// The `[\]^_` and backtick characters between `Z` and `a` count too.
fn is_body(c: char) -> bool {
    matches!(c, 'A'..='z' | '0'..='9' | '\t' | ' ' | ',' | ';' | ':' | '|')
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | ':' | '|')
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(text: &str) -> String {
        split(text).concat()
    }

    #[test]
    fn test_two_sentences() {
        let text = "The quick brown fox jumps. Next sentence here.";
        assert_eq!(
            split(text),
            vec!["The quick brown fox jumps. ", "Next sentence here."]
        );
    }

    #[test]
    fn test_short_clause_not_split() {
        assert_eq!(split("Mr. Smith went to the market."), vec!["Mr. Smith went to the market."]);
        // nine body characters is one short of a sentence
        assert_eq!(split("abcdefghi. next"), vec!["abcdefghi. next"]);
        assert_eq!(split("abcdefghij. next"), vec!["abcdefghij. ", "next"]);
    }

    #[test]
    fn test_split_before_newline() {
        assert_eq!(
            split("line one\nline two\n\nend"),
            vec!["line one", "\nline two", "\n", "\nend"]
        );
    }

    #[test]
    fn test_no_split_at_edges() {
        assert_eq!(split("\nleading newline"), vec!["\nleading newline"]);
        assert_eq!(
            split("A sentence that ends here! "),
            vec!["A sentence that ends here! "]
        );
    }

    #[test]
    fn test_other_terminators() {
        assert_eq!(
            split("Is this really true? Yes."),
            vec!["Is this really true? ", "Yes."]
        );
        assert_eq!(
            split("Ingredients are as follows: flour"),
            vec!["Ingredients are as follows: ", "flour"]
        );
        // the space after a terminator starts a new body run
        assert_eq!(
            split("Is this really true? Yes it is; quite"),
            vec!["Is this really true? ", "Yes it is; ", "quite"]
        );
        assert_eq!(
            split("first column value| second"),
            vec!["first column value| ", "second"]
        );
    }

    #[test]
    fn test_non_ascii_breaks_body_run() {
        // 'é' is not a body character, so only "tait" precedes the period
        assert_eq!(split("Il était. Oui"), vec!["Il était. Oui"]);
    }

    #[test]
    fn test_empty_input() {
        let fragments = segment("");
        assert_eq!(fragments, vec![Fragment { start: 0, end: 0 }]);
        assert!(fragments[0].is_empty());
    }

    #[test]
    fn test_lossless() {
        let samples = [
            "",
            " ",
            "\n\n\n",
            "No boundary at all",
            "Sentence number one is here. Sentence number two is here! And three?",
            "Tabs\tand spaces;  colons: and pipes| everywhere.\r\nWindows line\r\n",
            "Ünïcödé téxt wïth àccents. Ånd mörë sentences follow here. ¿Qué?",
            "Prices went up by $40 today. “Quoted” text ‘here’.\n- bullet\n- bullet",
        ];
        for text in samples {
            assert_eq!(joined(text), text);
            let fragments = segment(text);
            assert_eq!(fragments.first().map(|f| f.start), Some(0));
            assert_eq!(fragments.last().map(|f| f.end), Some(text.len()));
            for pair in fragments.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
                assert!(!pair[0].is_empty());
            }
        }
    }
}
