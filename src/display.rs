//! Box-drawing display of opinion frames under a sentence.
//!
//! ```text
//! I  hate  rainy  days
//!    ╰──╯DSE 0.90
//! ╰Holder(DSE)
//!          ╰─────────╯Target(DSE)
//! ```

use std::fmt::{self, Write};

use layered_opinion_document::Document;
use unicode_width::UnicodeWidthStr;

use crate::frame::OpinionFrame;

const SPACE_PADDING: usize = 2;

/// One underlined token range; `end` is exclusive.
struct Row {
    start: usize,
    end: usize,
    label: String,
}

pub struct FrameDisplay<'d> {
    document: &'d Document,
    sentence: usize,
    rows: Vec<Row>,
}

impl<'d> FrameDisplay<'d> {
    pub fn new(document: &'d Document, sentence: usize) -> Self {
        FrameDisplay {
            document,
            sentence,
            rows: Vec::new(),
        }
    }

    /// Add the parts of a frame that fall in this sentence: the expression,
    /// then each argument in emission order.
    pub fn include(&mut self, frame: &OpinionFrame<'_>) {
        let expression = &frame.expression;
        if expression.sentence() == self.sentence {
            self.rows.push(Row {
                start: expression.start(),
                end: expression.end(),
                label: format!("{} {:.2}", frame.opinion_type, frame.confidence),
            });
        }

        for link in &frame.arguments {
            if link.target.sentence() == self.sentence {
                self.rows.push(Row {
                    start: link.target.start(),
                    end: link.target.end(),
                    label: format!("{}({})", link.role, frame.opinion_type),
                });
            }
        }
    }

    /// Takes self
    pub fn with_frames(mut self, frames: &[OpinionFrame<'_>]) -> Self {
        for frame in frames {
            self.include(frame);
        }
        self
    }
}

impl fmt::Display for FrameDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self.document.tokens(self.sentence).unwrap_or(&[]);

        let mut token_idx_to_start_display_char_idx = Vec::with_capacity(tokens.len());
        let mut token_idx_to_end_display_char_idx = Vec::with_capacity(tokens.len());
        let mut opening_line = String::new();
        for (idx, token) in tokens.iter().enumerate() {
            if idx > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            token_idx_to_start_display_char_idx.push(UnicodeWidthStr::width(opening_line.as_str()));
            opening_line.push_str(token);
            token_idx_to_end_display_char_idx.push(UnicodeWidthStr::width(opening_line.as_str()));
        }

        f.write_str(&opening_line)?;

        for row in &self.rows {
            // rows from a frame over some other document may not fit
            let (start_char_idx, end_char_idx) = match (
                token_idx_to_start_display_char_idx.get(row.start),
                row.end
                    .checked_sub(1)
                    .and_then(|last| token_idx_to_end_display_char_idx.get(last)),
            ) {
                (Some(&start), Some(&end)) if start < end => (start, end),
                _ => continue,
            };

            f.write_char('\n')?;
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            let char_len = end_char_idx - start_char_idx;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }
            if char_len > 1 {
                f.write_char('╯')?;
            }

            f.write_str(&row.label)?;
        }

        Ok(())
    }
}
