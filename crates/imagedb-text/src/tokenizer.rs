//! Script-aware tokenizer for metadata text.
//!
//! Latin-like text is split into alphanumeric words. Runs of Han, Kana or
//! Hangul characters carry no word separators, so they are emitted as
//! overlapping bigrams ("红色汽车" -> "红色", "色汽", "汽车"); a lone CJK
//! character becomes a single token.

use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

#[derive(Clone, Default)]
pub struct CjkBigramTokenizer;

pub struct CjkBigramTokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Tokenizer for CjkBigramTokenizer {
    type TokenStream<'a> = CjkBigramTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        CjkBigramTokenStream { tokens: segment(text), cursor: 0 }
    }
}

impl TokenStream for CjkBigramTokenStream {
    fn advance(&mut self) -> bool {
        if self.cursor >= self.tokens.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    fn token(&self) -> &Token {
        &self.tokens[self.cursor - 1]
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.tokens[self.cursor - 1]
    }
}

pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3041..=0x309F      // hiragana
        | 0x30A1..=0x30FA    // katakana, without the ゠ and ・ punctuation
        | 0x30FC..=0x30FF
        | 0x3400..=0x4DBF    // CJK extension A
        | 0x4E00..=0x9FFF    // CJK unified ideographs
        | 0xAC00..=0xD7AF    // hangul syllables
        | 0xF900..=0xFAFF    // CJK compatibility ideographs
        | 0x20000..=0x2FA1F) // supplementary ideographic planes
}

fn segment(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut cjk_run: Vec<(usize, char)> = Vec::new();

    for (offset, c) in text.char_indices() {
        if is_cjk(c) {
            if let Some(start) = word_start.take() {
                push(&mut tokens, text, start, offset);
            }
            cjk_run.push((offset, c));
        } else if c.is_alphanumeric() {
            flush_cjk(&mut tokens, text, &mut cjk_run);
            word_start.get_or_insert(offset);
        } else {
            if let Some(start) = word_start.take() {
                push(&mut tokens, text, start, offset);
            }
            flush_cjk(&mut tokens, text, &mut cjk_run);
        }
    }
    if let Some(start) = word_start {
        push(&mut tokens, text, start, text.len());
    }
    flush_cjk(&mut tokens, text, &mut cjk_run);
    tokens
}

fn flush_cjk(tokens: &mut Vec<Token>, text: &str, run: &mut Vec<(usize, char)>) {
    match run.len() {
        0 => {}
        1 => {
            let (start, c) = run[0];
            push(tokens, text, start, start + c.len_utf8());
        }
        _ => {
            for pair in run.windows(2) {
                let (start, _) = pair[0];
                let (second, c) = pair[1];
                push(tokens, text, start, second + c.len_utf8());
            }
        }
    }
    run.clear();
}

fn push(tokens: &mut Vec<Token>, text: &str, from: usize, to: usize) {
    tokens.push(Token {
        offset_from: from,
        offset_to: to,
        position: tokens.len(),
        text: text[from..to].to_string(),
        position_length: 1,
    });
}
