//! Lazy HTML tokenizer
//!
//! Drives html5ever's tokenizer without a tree builder, so no elements are
//! inserted or moved, and hands its tokens out one at a time. Input is fed
//! in chunks as tokens are pulled; a scan that stops early never tokenizes
//! the rest of the document. Adjacent character tokens are merged into a
//! single text token.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token as Html5Token, TokenSink, TokenSinkResult, TokenizerOpts,
};
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;

/// Bytes handed to html5ever per refill
const CHUNK_LEN: usize = 8 * 1024;

/// A single `key="value"` pair on a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name
    pub key: String,
    /// Value with character references decoded
    pub value: String,
}

/// A start tag with its attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lower-cased element name
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Written as `<name ... />`
    pub self_closing: bool,
}

impl Tag {
    /// Value of the first attribute named `key`
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// One lexical token. End of stream is the iterator returning `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(Tag),
    EndTag(String),
    Text(String),
    Comment(String),
    Doctype(String),
}

impl Token {
    /// Text content, for text tokens only
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Element name, for start and end tags
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag(tag) => Some(&tag.name),
            Self::EndTag(name) => Some(name),
            _ => None,
        }
    }

    /// Attributes of a start tag, empty for every other kind
    #[must_use]
    pub fn attrs(&self) -> &[Attribute] {
        match self {
            Self::StartTag(tag) => &tag.attrs,
            _ => &[],
        }
    }
}

/// Receives html5ever tokens and queues them as [`Token`]s
#[derive(Default)]
struct Collector {
    queue: RefCell<VecDeque<Token>>,
}

impl Collector {
    fn push(&self, token: Token) {
        self.queue.borrow_mut().push_back(token);
    }

    fn push_text(&self, text: &str) {
        let mut queue = self.queue.borrow_mut();
        if let Some(Token::Text(last)) = queue.back_mut() {
            last.push_str(text);
        } else {
            queue.push_back(Token::Text(text.to_string()));
        }
    }
}

impl TokenSink for Collector {
    type Handle = ();

    fn process_token(&self, token: Html5Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Html5Token::CharacterTokens(text) => self.push_text(&text),
            Html5Token::NullCharacterToken => self.push_text("\u{fffd}"),
            Html5Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => {
                    let content = element_content(&tag.name, tag.self_closing);
                    self.push(Token::StartTag(Tag {
                        name: tag.name.to_string(),
                        attrs: tag
                            .attrs
                            .into_iter()
                            .map(|a| Attribute {
                                key: a.name.local.to_string(),
                                value: a.value.to_string(),
                            })
                            .collect(),
                        self_closing: tag.self_closing,
                    }));
                    return content;
                }
                TagKind::EndTag => self.push(Token::EndTag(tag.name.to_string())),
            },
            Html5Token::CommentToken(text) => self.push(Token::Comment(text.to_string())),
            Html5Token::DoctypeToken(doctype) => self.push(Token::Doctype(
                doctype.name.map(|n| n.to_string()).unwrap_or_default(),
            )),
            Html5Token::ParseError(_) | Html5Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Tokenizer state for the body of a freshly opened element. Without a
/// tree builder nobody else switches html5ever into raw text modes.
fn element_content(name: &str, self_closing: bool) -> TokenSinkResult<()> {
    if self_closing {
        return TokenSinkResult::Continue;
    }
    match name {
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

/// Forward-only token stream over one HTML document.
///
/// Build a fresh tokenizer for every message; it cannot be rewound.
pub struct Tokenizer<'a> {
    src: Cow<'a, str>,
    fed: usize,
    input: BufferQueue,
    inner: html5ever::tokenizer::Tokenizer<Collector>,
    ended: bool,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(html: &'a str) -> Self {
        Self::from_cow(Cow::Borrowed(html))
    }

    /// Tokenize bytes, replacing invalid UTF-8 sequences with U+FFFD
    #[must_use]
    pub fn from_bytes(html: &'a [u8]) -> Self {
        Self::from_cow(String::from_utf8_lossy(html))
    }

    fn from_cow(src: Cow<'a, str>) -> Self {
        Self {
            src,
            fed: 0,
            input: BufferQueue::default(),
            inner: html5ever::tokenizer::Tokenizer::new(
                Collector::default(),
                TokenizerOpts::default(),
            ),
            ended: false,
        }
    }

    /// Feed the next chunk, or finish the document once all input is in
    fn refill(&mut self) {
        if self.fed < self.src.len() {
            let end = chunk_end(&self.src, self.fed);
            self.input
                .push_back(StrTendril::from_slice(&self.src[self.fed..end]));
            self.fed = end;
            let _ = self.inner.feed(&self.input);
        } else {
            self.inner.end();
            self.ended = true;
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            {
                let mut queue = self.inner.sink.queue.borrow_mut();
                // Trailing text may still grow with the next chunk
                let ready = self.ended
                    || queue.len() > 1
                    || queue.front().is_some_and(|t| !matches!(t, Token::Text(_)));
                if ready {
                    return queue.pop_front();
                }
            }
            self.refill();
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

impl fmt::Debug for Tokenizer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("len", &self.src.len())
            .field("fed", &self.fed)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

fn chunk_end(src: &str, start: usize) -> usize {
    let mut end = (start + CHUNK_LEN).min(src.len());
    while !src.is_char_boundary(end) {
        end += 1;
    }
    end
}
