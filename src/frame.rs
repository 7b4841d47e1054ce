//! Opinion frames and their assembly into labeled span annotations.

use std::fmt;

use layered_opinion_document::{SpanLink, TokenSpan, TokenSpanLink};
use serde::{Deserialize, Serialize};

/// Argument role of a span linked to an opinion expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpinionRole {
    /// Entity expressing the opinion
    Holder,
    /// Entity the opinion is about
    Target,
}

impl OpinionRole {
    pub const HOLDER_TAG: &'static str = "HolderOf";
    pub const TARGET_TAG: &'static str = "TargetOf";

    /// Match an engine role tag by substring.
    ///
    /// The engine may emit compound tags, so any tag containing `HolderOf`
    /// is a holder and any other tag containing `TargetOf` is a target.
    /// Everything else is not a role this crate knows.
    pub fn from_reply_tag(tag: &str) -> Option<Self> {
        if tag.contains(Self::HOLDER_TAG) {
            Some(OpinionRole::Holder)
        } else if tag.contains(Self::TARGET_TAG) {
            Some(OpinionRole::Target)
        } else {
            None
        }
    }

    /// The canonical tag written for this role in engine replies.
    pub fn reply_tag(self) -> &'static str {
        match self {
            OpinionRole::Holder => Self::HOLDER_TAG,
            OpinionRole::Target => Self::TARGET_TAG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpinionRole::Holder => "Holder",
            OpinionRole::Target => "Target",
        }
    }
}

impl fmt::Display for OpinionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holder or target span attached to an expression.
pub type OpinionArgument<'d> = TokenSpanLink<'d, OpinionRole>;

/// Which reply shape produced a frame; decides how its label is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    /// Expression with decomposed arguments; label is `{type}={text}` plus arguments.
    Expression,
    /// Single flat record; label is the opinion type verbatim.
    Flat,
}

/// One detected opinion expression with its type, confidence and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct OpinionFrame<'d> {
    pub expression: TokenSpan<'d>,
    /// Free-form tag such as `DSE` or `ESE`.
    pub opinion_type: String,
    pub confidence: f64,
    /// Arguments in the order the engine emitted them.
    pub arguments: Vec<OpinionArgument<'d>>,
    pub kind: FrameKind,
}

impl<'d> OpinionFrame<'d> {
    /// Frame for an expression record; arguments are added afterwards.
    pub fn expression(
        expression: TokenSpan<'d>,
        opinion_type: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            expression,
            opinion_type: opinion_type.into(),
            confidence,
            arguments: Vec::new(),
            kind: FrameKind::Expression,
        }
    }

    /// Frame for a flat record, which never carries arguments.
    pub fn flat(expression: TokenSpan<'d>, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            expression,
            opinion_type: label.into(),
            confidence,
            arguments: Vec::new(),
            kind: FrameKind::Flat,
        }
    }

    pub fn push_argument(&mut self, role: OpinionRole, target: TokenSpan<'d>) {
        self.arguments.push(SpanLink::new(role, target));
    }

    pub fn with_argument(mut self, role: OpinionRole, target: TokenSpan<'d>) -> Self {
        self.push_argument(role, target);
        self
    }

    pub fn holders(&self) -> impl Iterator<Item = &TokenSpan<'d>> + '_ {
        self.arguments_with_role(OpinionRole::Holder)
    }

    pub fn targets(&self) -> impl Iterator<Item = &TokenSpan<'d>> + '_ {
        self.arguments_with_role(OpinionRole::Target)
    }

    fn arguments_with_role(&self, role: OpinionRole) -> impl Iterator<Item = &TokenSpan<'d>> + '_ {
        self.arguments
            .iter()
            .filter(move |link| link.role == role)
            .map(|link| &link.target)
    }

    /// Human-readable label handed to the pipeline.
    ///
    /// `DSE=really liked; Holder=The critics; Target=it` for expression
    /// frames, the opinion type verbatim for flat frames.
    pub fn label(&self) -> String {
        match self.kind {
            FrameKind::Flat => self.opinion_type.clone(),
            FrameKind::Expression => {
                let mut label = format!("{}={}", self.opinion_type, self.expression.text());
                for link in &self.arguments {
                    label.push_str("; ");
                    label.push_str(link.role.as_str());
                    label.push('=');
                    label.push_str(&link.target.text());
                }
                label
            }
        }
    }
}

/// The `(span, label, confidence)` triple returned to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanAnnotation<'d> {
    pub span: TokenSpan<'d>,
    pub label: String,
    pub confidence: f64,
}

impl<'d> SpanAnnotation<'d> {
    pub fn into_triple(self) -> (TokenSpan<'d>, String, f64) {
        (self.span, self.label, self.confidence)
    }
}

impl<'d> From<&OpinionFrame<'d>> for SpanAnnotation<'d> {
    fn from(frame: &OpinionFrame<'d>) -> Self {
        Self {
            span: frame.expression,
            label: frame.label(),
            confidence: frame.confidence,
        }
    }
}

/// One annotation per frame, in frame order.
///
/// Frames with identical spans are kept as separate annotations.
pub fn assemble<'d>(frames: &[OpinionFrame<'d>]) -> Vec<SpanAnnotation<'d>> {
    frames.iter().map(SpanAnnotation::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_opinion_document::{Document, Sentence};

    fn doc() -> Document {
        Document::new(vec![Sentence::from_whitespace(
            "The critics really liked it .",
            "DT NNS RB VBD PRP .",
            "the critic really like it .",
            "(ROOT)",
            "root(ROOT-0, liked-4)",
        )
        .unwrap()])
    }

    #[test]
    fn test_role_substring_matching() {
        assert_eq!(OpinionRole::from_reply_tag("HolderOf"), Some(OpinionRole::Holder));
        assert_eq!(OpinionRole::from_reply_tag("TargetOf"), Some(OpinionRole::Target));
        assert_eq!(OpinionRole::from_reply_tag("B-HolderOf-DSE"), Some(OpinionRole::Holder));
        assert_eq!(OpinionRole::from_reply_tag("IsTargetOfDSE"), Some(OpinionRole::Target));
        assert_eq!(OpinionRole::from_reply_tag("holderof"), None);
        assert_eq!(OpinionRole::from_reply_tag("Other"), None);
        // holder wins when both appear
        assert_eq!(OpinionRole::from_reply_tag("TargetOf|HolderOf"), Some(OpinionRole::Holder));
    }

    #[test]
    fn test_expression_label_with_arguments() {
        let doc = doc();
        let frame = OpinionFrame::expression(TokenSpan::new(&doc, 0, 2, 4).unwrap(), "DSE", 0.8)
            .with_argument(OpinionRole::Holder, TokenSpan::new(&doc, 0, 0, 2).unwrap())
            .with_argument(OpinionRole::Target, TokenSpan::new(&doc, 0, 4, 5).unwrap());

        assert_eq!(frame.label(), "DSE=really liked; Holder=The critics; Target=it");
        assert_eq!(frame.holders().count(), 1);
        assert_eq!(frame.targets().next().unwrap().text(), "it");
    }

    #[test]
    fn test_argument_order_preserved_in_label() {
        let doc = doc();
        let frame = OpinionFrame::expression(TokenSpan::new(&doc, 0, 3, 4).unwrap(), "ESE", 0.5)
            .with_argument(OpinionRole::Target, TokenSpan::new(&doc, 0, 4, 5).unwrap())
            .with_argument(OpinionRole::Holder, TokenSpan::new(&doc, 0, 1, 2).unwrap());
        assert_eq!(frame.label(), "ESE=liked; Target=it; Holder=critics");
    }

    #[test]
    fn test_flat_label_is_verbatim() {
        let doc = doc();
        let frame = OpinionFrame::flat(TokenSpan::new(&doc, 0, 3, 4).unwrap(), "ESE", 0.75);
        assert_eq!(frame.label(), "ESE");
    }

    #[test]
    fn test_assemble_keeps_order_and_duplicates() {
        let doc = doc();
        let span = TokenSpan::new(&doc, 0, 3, 4).unwrap();
        let frames = vec![
            OpinionFrame::expression(span, "DSE", 0.9),
            OpinionFrame::expression(TokenSpan::new(&doc, 0, 0, 1).unwrap(), "ESE", 0.1),
            OpinionFrame::expression(span, "DSE", 0.9),
        ];

        let annotations = assemble(&frames);
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[0], annotations[2]);
        assert_eq!(annotations[1].label, "ESE=The");

        let (span_out, label, confidence) = annotations[0].clone().into_triple();
        assert_eq!(span_out, span);
        assert_eq!(label, "DSE=liked");
        assert_eq!(confidence, 0.9);
    }
}
