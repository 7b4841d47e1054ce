mod pipeline;

use layered_opinion_document::{Document, Sentence};

/// Three sentences of varying length with plausible parse renderings.
pub(crate) fn review_document() -> Document {
    Document::new(vec![
        Sentence::from_whitespace(
            "The critics loved the new film",
            "DT NNS VBD DT JJ NN",
            "the critic love the new film",
            "(ROOT (S (NP (DT The) (NNS critics)) (VP (VBD loved) (NP (DT the) (JJ new) (NN film)))))",
            "det(critics-2, The-1)\nnsubj(loved-3, critics-2)\nroot(ROOT-0, loved-3)\ndobj(loved-3, film-6)",
        )
        .unwrap(),
        Sentence::from_whitespace(
            "Boring",
            "JJ",
            "boring",
            "(ROOT (ADJP (JJ Boring)))",
            "root(ROOT-0, Boring-1)",
        )
        .unwrap(),
        Sentence::from_whitespace(
            "I think audiences will disagree",
            "PRP VBP NNS MD VB",
            "I think audience will disagree",
            "(ROOT (S (NP (PRP I)) (VP (VBP think) (SBAR (S (NP (NNS audiences)) (VP (MD will) (VP (VB disagree))))))))",
            "nsubj(think-2, I-1)\nroot(ROOT-0, think-2)\nnsubj(disagree-5, audiences-3)",
        )
        .unwrap(),
    ])
}
