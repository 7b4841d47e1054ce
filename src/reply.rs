//! Rendering frames back into engine reply text.
//!
//! This is the inverse of [`decode_reply`](crate::decode_reply) and is what
//! [`ScriptedBackend`](crate::ScriptedBackend) users reach for to fake an
//! engine. Opinion types must not contain commas, tabs or newlines.

use std::fmt::{self, Write};

use crate::decode::ResponseGrammar;
use crate::frame::OpinionFrame;

/// Score written for argument records, which the decoder does not interpret.
pub const ARGUMENT_SCORE: &str = "0.0";

/// Render one reply line per frame.
///
/// Flat replies cannot carry arguments, so they are dropped for
/// [`ResponseGrammar::FlatRecord`].
pub fn render_reply(frames: &[OpinionFrame<'_>], grammar: ResponseGrammar) -> String {
    ReplyLines { frames, grammar }.to_string()
}

struct ReplyLines<'a, 'd> {
    frames: &'a [OpinionFrame<'d>],
    grammar: ResponseGrammar,
}

impl fmt::Display for ReplyLines<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in self.frames {
            write_line(f, frame, self.grammar)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, frame: &OpinionFrame<'_>, grammar: ResponseGrammar) -> fmt::Result {
    let span = &frame.expression;
    write!(
        out,
        "{},{},{},{},{}",
        span.sentence(),
        span.start(),
        span.end(),
        frame.opinion_type,
        frame.confidence
    )?;

    if grammar == ResponseGrammar::ExpressionWithArguments {
        for link in &frame.arguments {
            write!(
                out,
                "\t{},{},{},{},{}",
                link.target.sentence(),
                link.target.start(),
                link.target.end(),
                link.role.reply_tag(),
                ARGUMENT_SCORE
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::OpinionRole;
    use layered_opinion_document::{Document, Sentence, TokenSpan};

    fn doc() -> Document {
        Document::new(vec![Sentence::from_whitespace(
            "She praised the plan",
            "PRP VBD DT NN",
            "she praise the plan",
            "(ROOT)",
            "root(ROOT-0, praised-2)",
        )
        .unwrap()])
    }

    #[test]
    fn test_render_expression_reply() {
        let doc = doc();
        let frames = vec![
            OpinionFrame::expression(TokenSpan::new(&doc, 0, 1, 2).unwrap(), "DSE", 0.9)
                .with_argument(OpinionRole::Holder, TokenSpan::new(&doc, 0, 0, 1).unwrap())
                .with_argument(OpinionRole::Target, TokenSpan::new(&doc, 0, 2, 4).unwrap()),
            OpinionFrame::expression(TokenSpan::new(&doc, 0, 3, 4).unwrap(), "ESE", 1.0),
        ];

        assert_eq!(
            render_reply(&frames, ResponseGrammar::ExpressionWithArguments),
            "0,1,2,DSE,0.9\t0,0,1,HolderOf,0.0\t0,2,4,TargetOf,0.0\n0,3,4,ESE,1\n"
        );
    }

    #[test]
    fn test_render_flat_reply_drops_arguments() {
        let doc = doc();
        let frames = vec![
            OpinionFrame::flat(TokenSpan::new(&doc, 0, 1, 2).unwrap(), "DSE", 0.25)
                .with_argument(OpinionRole::Holder, TokenSpan::new(&doc, 0, 0, 1).unwrap()),
        ];
        assert_eq!(render_reply(&frames, ResponseGrammar::FlatRecord), "0,1,2,DSE,0.25\n");
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(render_reply(&[], ResponseGrammar::FlatRecord), "");
    }

    /// Accepts a fixed number of writes, then fails.
    struct ShortWriter {
        writes_left: usize,
        written: String,
    }

    impl Write for ShortWriter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.writes_left == 0 {
                return Err(fmt::Error);
            }
            self.writes_left -= 1;
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_write_line_propagates_writer_errors() {
        let doc = doc();
        let frame = OpinionFrame::expression(TokenSpan::new(&doc, 0, 1, 2).unwrap(), "DSE", 0.9)
            .with_argument(OpinionRole::Holder, TokenSpan::new(&doc, 0, 0, 1).unwrap());

        let mut unlimited = ShortWriter {
            writes_left: usize::MAX,
            written: String::new(),
        };
        write_line(&mut unlimited, &frame, ResponseGrammar::ExpressionWithArguments).unwrap();
        assert_eq!(unlimited.written, "0,1,2,DSE,0.9\t0,0,1,HolderOf,0.0");

        let mut full = ShortWriter {
            writes_left: 0,
            written: String::new(),
        };
        assert_eq!(
            write_line(&mut full, &frame, ResponseGrammar::ExpressionWithArguments),
            Err(fmt::Error)
        );
        assert!(full.written.is_empty());
    }
}
