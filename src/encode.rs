//! Engine message encoding.
//!
//! A message is one block per sentence, each wrapped in marker lines:
//!
//! ```text
//! #begin sentence
//! Sent: The movie was great .
//! POS: DT NN VBD JJ .
//! Lemma: the movie be great .
//! <constituency rendering, one or more lines>
//! <dependency rendering, one or more lines>
//! #end sentence
//! ```
//!
//! Only the prefixed block layout is ever produced.

use layered_opinion_document::{Document, Sentence};
use tracing::debug;

use crate::error::EncodingError;

pub const BEGIN_SENTENCE: &str = "#begin sentence";
pub const END_SENTENCE: &str = "#end sentence";

pub const TOKENS_PREFIX: &str = "Sent: ";
pub const POS_PREFIX: &str = "POS: ";
pub const LEMMA_PREFIX: &str = "Lemma: ";

/// Encode one sentence as a message block (without the marker lines).
///
/// `index` is only used to locate errors.
pub fn encode_sentence(index: usize, sentence: &Sentence) -> Result<String, EncodingError> {
    let mut block = String::new();
    write_sentence(index, sentence, &mut block)?;
    Ok(block)
}

/// Encode a whole document into the single buffer handed to the engine.
///
/// Any sentence error aborts the document; no partial message is returned.
pub fn encode_document(document: &Document) -> Result<String, EncodingError> {
    let mut message = String::new();

    for (index, sentence) in document.sentences_enumerated() {
        message.push_str(BEGIN_SENTENCE);
        message.push('\n');
        write_sentence(index, sentence, &mut message)?;
        message.push_str(END_SENTENCE);
        message.push('\n');
    }

    debug!(
        sentences = document.sentence_count(),
        bytes = message.len(),
        "encoded opinion engine message"
    );
    Ok(message)
}

fn write_sentence(index: usize, sentence: &Sentence, out: &mut String) -> Result<(), EncodingError> {
    if sentence.is_empty() {
        return Err(EncodingError::EmptySentence { sentence: index });
    }

    write_joined(out, TOKENS_PREFIX, index, "token", sentence.tokens())?;
    write_joined(out, POS_PREFIX, index, "POS", sentence.pos_tags())?;
    write_joined(out, LEMMA_PREFIX, index, "lemma", sentence.lemmas())?;
    write_rendering(out, index, "constituency", sentence.constituency_parse())?;
    write_rendering(out, index, "dependency", sentence.dependency_parse())?;

    Ok(())
}

fn write_joined(
    out: &mut String,
    prefix: &str,
    sentence: usize,
    layer: &'static str,
    items: &[String],
) -> Result<(), EncodingError> {
    if let Some((position, item)) = items
        .iter()
        .enumerate()
        .find(|(_, item)| item.is_empty() || item.chars().any(char::is_whitespace))
    {
        return Err(EncodingError::UnsplittableItem {
            sentence,
            layer,
            position,
            item: item.clone(),
        });
    }

    out.push_str(prefix);
    out.push_str(&items.join(" "));
    out.push('\n');
    Ok(())
}

/// Copy an opaque parse rendering, terminating its last line if needed.
fn write_rendering(
    out: &mut String,
    sentence: usize,
    layer: &'static str,
    rendering: &str,
) -> Result<(), EncodingError> {
    if rendering.trim().is_empty() {
        return Err(EncodingError::MissingParse { sentence, layer });
    }

    out.push_str(rendering);
    if !rendering.ends_with('\n') {
        out.push('\n');
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_sentence() -> Sentence {
        Sentence::from_whitespace(
            "The movie was great .",
            "DT NN VBD JJ .",
            "the movie be great .",
            "(ROOT\n  (S (NP (DT The) (NN movie))\n    (VP (VBD was) (ADJP (JJ great)))\n    (. .)))",
            "det(movie-2, The-1)\nnsubj(great-4, movie-2)\ncop(great-4, was-3)\nroot(ROOT-0, great-4)\n",
        )
        .unwrap()
    }

    fn agree_sentence() -> Sentence {
        Sentence::from_whitespace(
            "I agree .",
            "PRP VBP .",
            "I agree .",
            "(ROOT (S (NP (PRP I)) (VP (VBP agree)) (. .)))",
            "nsubj(agree-2, I-1)\nroot(ROOT-0, agree-2)",
        )
        .unwrap()
    }

    #[test]
    fn test_encode_document() {
        let doc = Document::new(vec![movie_sentence(), agree_sentence()]);
        let message = encode_document(&doc).unwrap();

        insta::assert_snapshot!(message.trim_end(), @r###"
        #begin sentence
        Sent: The movie was great .
        POS: DT NN VBD JJ .
        Lemma: the movie be great .
        (ROOT
          (S (NP (DT The) (NN movie))
            (VP (VBD was) (ADJP (JJ great)))
            (. .)))
        det(movie-2, The-1)
        nsubj(great-4, movie-2)
        cop(great-4, was-3)
        root(ROOT-0, great-4)
        #end sentence
        #begin sentence
        Sent: I agree .
        POS: PRP VBP .
        Lemma: I agree .
        (ROOT (S (NP (PRP I)) (VP (VBP agree)) (. .)))
        nsubj(agree-2, I-1)
        root(ROOT-0, agree-2)
        #end sentence
        "###);
    }

    #[test]
    fn test_message_ends_with_newline() {
        let doc = Document::new(vec![agree_sentence()]);
        let message = encode_document(&doc).unwrap();
        assert!(message.ends_with("#end sentence\n"));
        assert!(!message.contains("\n\n"));
    }

    #[test]
    fn test_sentence_block_lines() {
        let block = encode_sentence(0, &agree_sentence()).unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "Sent: I agree .");
        assert_eq!(lines[1], "POS: PRP VBP .");
        assert_eq!(lines[2], "Lemma: I agree .");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_empty_document_encodes_to_empty_message() {
        assert_eq!(encode_document(&Document::default()).unwrap(), "");
    }

    #[test]
    fn test_empty_sentence_aborts_document() {
        let empty = Sentence::new(Vec::new(), Vec::new(), Vec::new(), "(ROOT)", "root").unwrap();
        let doc = Document::new(vec![agree_sentence(), empty]);
        assert_eq!(
            encode_document(&doc).unwrap_err(),
            EncodingError::EmptySentence { sentence: 1 }
        );
    }

    #[test]
    fn test_whitespace_in_token_rejected() {
        let sentence = Sentence::new(
            vec!["New York".into(), "rocks".into()],
            vec!["NNP".into(), "VBZ".into()],
            vec!["new york".into(), "rock".into()],
            "(ROOT)",
            "root(ROOT-0, rocks-2)",
        )
        .unwrap();
        assert_eq!(
            encode_sentence(4, &sentence).unwrap_err(),
            EncodingError::UnsplittableItem {
                sentence: 4,
                layer: "token",
                position: 0,
                item: "New York".into(),
            }
        );
    }

    #[test]
    fn test_empty_lemma_rejected() {
        let sentence = Sentence::new(
            vec!["Yes".into()],
            vec!["UH".into()],
            vec![String::new()],
            "(ROOT)",
            "root(ROOT-0, Yes-1)",
        )
        .unwrap();
        let err = encode_sentence(0, &sentence).unwrap_err();
        assert!(matches!(err, EncodingError::UnsplittableItem { layer: "lemma", .. }));
    }

    #[test]
    fn test_missing_parse_rejected() {
        let sentence = Sentence::from_whitespace("Yes", "UH", "yes", "(ROOT (UH Yes))", "  \n").unwrap();
        assert_eq!(
            encode_sentence(2, &sentence).unwrap_err(),
            EncodingError::MissingParse {
                sentence: 2,
                layer: "dependency",
            }
        );
    }
}
