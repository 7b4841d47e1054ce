//! Sentence-level annotation layers consumed by the opinion protocol.
//!
//! The upstream pipeline produces tokens, part-of-speech tags, lemmas and two
//! parse renderings per sentence. `Document` holds them as plain owned values
//! so encoders and spans can borrow them without touching the pipeline.

use thiserror::Error;

/// Errors raised while assembling a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The per-token layers of a sentence have different lengths.
    #[error("misaligned layers: {tokens} tokens, {pos_tags} POS tags, {lemmas} lemmas")]
    MisalignedLayers {
        tokens: usize,
        pos_tags: usize,
        lemmas: usize,
    },
}

/// One sentence with its parallel token layers and parse renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    tokens: Vec<String>,
    pos_tags: Vec<String>,
    lemmas: Vec<String>,
    constituency_parse: String,
    dependency_parse: String,
}

impl Sentence {
    /// Create a sentence, checking that tokens, POS tags and lemmas line up.
    ///
    /// A sentence with zero tokens is accepted here; whether it can be sent
    /// anywhere is up to the consumer.
    pub fn new(
        tokens: Vec<String>,
        pos_tags: Vec<String>,
        lemmas: Vec<String>,
        constituency_parse: impl Into<String>,
        dependency_parse: impl Into<String>,
    ) -> Result<Self, DocumentError> {
        if tokens.len() != pos_tags.len() || tokens.len() != lemmas.len() {
            return Err(DocumentError::MisalignedLayers {
                tokens: tokens.len(),
                pos_tags: pos_tags.len(),
                lemmas: lemmas.len(),
            });
        }

        Ok(Self {
            tokens,
            pos_tags,
            lemmas,
            constituency_parse: constituency_parse.into(),
            dependency_parse: dependency_parse.into(),
        })
    }

    /// Build a sentence from whitespace-separated layer strings.
    ///
    /// Convenient for tests and fixtures where each layer is written on one line.
    pub fn from_whitespace(
        tokens: &str,
        pos_tags: &str,
        lemmas: &str,
        constituency_parse: impl Into<String>,
        dependency_parse: impl Into<String>,
    ) -> Result<Self, DocumentError> {
        let split = |s: &str| s.split_whitespace().map(String::from).collect::<Vec<_>>();
        Self::new(
            split(tokens),
            split(pos_tags),
            split(lemmas),
            constituency_parse,
            dependency_parse,
        )
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn pos_tags(&self) -> &[String] {
        &self.pos_tags
    }

    pub fn lemmas(&self) -> &[String] {
        &self.lemmas
    }

    /// Lemma of the token at `token` (0-based).
    pub fn lemma(&self, token: usize) -> Option<&str> {
        self.lemmas.get(token).map(String::as_str)
    }

    /// Phrase-structure rendering, opaque text.
    pub fn constituency_parse(&self) -> &str {
        &self.constituency_parse
    }

    /// Head-modifier rendering, opaque text.
    pub fn dependency_parse(&self) -> &str {
        &self.dependency_parse
    }
}

/// An ordered sequence of annotated sentences.
///
/// Owned by the caller; everything downstream only borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Get the number of sentences in the document.
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Get a reference to a specific sentence.
    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    /// Iterate over all sentences with their indices.
    pub fn sentences_enumerated(&self) -> impl Iterator<Item = (usize, &Sentence)> {
        self.sentences.iter().enumerate()
    }

    /// Number of tokens in a sentence.
    pub fn sentence_len(&self, index: usize) -> Option<usize> {
        self.sentence(index).map(Sentence::len)
    }

    pub fn tokens(&self, sentence: usize) -> Option<&[String]> {
        self.sentence(sentence).map(Sentence::tokens)
    }

    pub fn pos_tags(&self, sentence: usize) -> Option<&[String]> {
        self.sentence(sentence).map(Sentence::pos_tags)
    }

    /// Lemma lookup by sentence and token index.
    pub fn lemma(&self, sentence: usize, token: usize) -> Option<&str> {
        self.sentence(sentence).and_then(|s| s.lemma(token))
    }

    pub fn constituency_parse(&self, sentence: usize) -> Option<&str> {
        self.sentence(sentence).map(Sentence::constituency_parse)
    }

    pub fn dependency_parse(&self, sentence: usize) -> Option<&str> {
        self.sentence(sentence).map(Sentence::dependency_parse)
    }
}

impl From<Vec<Sentence>> for Document {
    fn from(sentences: Vec<Sentence>) -> Self {
        Self::new(sentences)
    }
}
