//! Parser for `.opinion` fixture files.
//!
//! ```text
//! # Title
//! grammar: expression-with-arguments
//!
//! ## sentence
//! tokens: I hate rainy days
//! pos: PRP VBP JJ NNS
//! lemmas: I hate rainy day
//! constituency:
//! (ROOT (S (NP (PRP I)) (VP (VBP hate) (NP (JJ rainy) (NNS days)))))
//! dependency:
//! nsubj(hate-2, I-1)
//!
//! ## reply
//! 0,1,2,DSE,0.9<TAB>0,0,1,HolderOf,0.0
//!
//! ## expect
//! > s0[1..2) 0.9 DSE=hate; Holder=I
//! ! diagnostic 3:0
//! ```
//!
//! Reply lines are kept byte for byte apart from leading and trailing blank
//! lines, so reply line numbers count from the first non-blank line.

use layered_opinion::ResponseGrammar;

use crate::errors::{SpecError, SpecResult};
use crate::fixture::{Expectation, OpinionFixture, SentenceSpec};

enum Section {
    Header,
    Sentence,
    Reply,
    Expect,
}

#[derive(Clone, Copy)]
enum Rendering {
    Constituency,
    Dependency,
}

/// Accumulates one `## sentence` block.
struct SentenceBuilder {
    source_line: usize,
    tokens: Option<String>,
    pos: Option<String>,
    lemmas: Option<String>,
    constituency: Option<Vec<String>>,
    dependency: Option<Vec<String>>,
    open: Option<Rendering>,
}

impl SentenceBuilder {
    fn new(source_line: usize) -> Self {
        Self {
            source_line,
            tokens: None,
            pos: None,
            lemmas: None,
            constituency: None,
            dependency: None,
            open: None,
        }
    }

    fn feed(&mut self, raw: &str, trimmed: &str, line: usize) -> SpecResult<()> {
        if let Some(value) = trimmed.strip_prefix("tokens:") {
            self.tokens = Some(value.trim().to_string());
            self.open = None;
        } else if let Some(value) = trimmed.strip_prefix("pos:") {
            self.pos = Some(value.trim().to_string());
            self.open = None;
        } else if let Some(value) = trimmed.strip_prefix("lemmas:") {
            self.lemmas = Some(value.trim().to_string());
            self.open = None;
        } else if let Some(value) = trimmed.strip_prefix("constituency:") {
            self.constituency = Some(first_rendering_line(value));
            self.open = Some(Rendering::Constituency);
        } else if let Some(value) = trimmed.strip_prefix("dependency:") {
            self.dependency = Some(first_rendering_line(value));
            self.open = Some(Rendering::Dependency);
        } else {
            let lines = match self.open {
                Some(Rendering::Constituency) => self.constituency.as_mut(),
                Some(Rendering::Dependency) => self.dependency.as_mut(),
                None => None,
            };
            match lines {
                Some(lines) => lines.push(raw.trim_end().to_string()),
                None => {
                    return Err(SpecError::Parse {
                        line,
                        message: format!("expected a sentence field, found: {}", trimmed),
                    })
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> SpecResult<SentenceSpec> {
        let line = self.source_line;
        let missing = |field: &str| SpecError::Parse {
            line,
            message: format!("sentence is missing `{}`", field),
        };

        Ok(SentenceSpec {
            tokens: self.tokens.ok_or_else(|| missing("tokens:"))?,
            pos: self.pos.ok_or_else(|| missing("pos:"))?,
            lemmas: self.lemmas.ok_or_else(|| missing("lemmas:"))?,
            constituency: self
                .constituency
                .ok_or_else(|| missing("constituency:"))?
                .join("\n"),
            dependency: self
                .dependency
                .ok_or_else(|| missing("dependency:"))?
                .join("\n"),
            source_line: line,
        })
    }
}

fn first_rendering_line(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

/// Parse a full `.opinion` fixture file.
pub fn parse_fixture(input: &str) -> SpecResult<OpinionFixture> {
    let mut fixture = OpinionFixture::empty();
    let mut section = Section::Header;
    let mut sentence: Option<SentenceBuilder> = None;
    let mut reply_lines: Vec<&str> = Vec::new();
    let mut saw_reply = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_num = idx + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = raw.trim();

        if let Some(header) = trimmed.strip_prefix("## ") {
            if let Some(builder) = sentence.take() {
                fixture.sentences.push(builder.finish()?);
            }
            section = match header.trim() {
                "sentence" => {
                    sentence = Some(SentenceBuilder::new(line_num));
                    Section::Sentence
                }
                "reply" if saw_reply => {
                    return Err(SpecError::Parse {
                        line: line_num,
                        message: "duplicate `## reply` section".to_string(),
                    })
                }
                "reply" => {
                    saw_reply = true;
                    Section::Reply
                }
                "expect" => Section::Expect,
                other => {
                    return Err(SpecError::Parse {
                        line: line_num,
                        message: format!("unknown section: {}", other),
                    })
                }
            };
            continue;
        }

        if let Section::Reply = section {
            reply_lines.push(raw);
            continue;
        }

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        match section {
            Section::Header => parse_header_line(&mut fixture, trimmed, line_num)?,
            Section::Sentence => {
                if let Some(builder) = sentence.as_mut() {
                    builder.feed(raw, trimmed, line_num)?;
                }
            }
            Section::Expect => parse_expect_line(&mut fixture, trimmed, line_num)?,
            Section::Reply => {}
        }
    }

    if let Some(builder) = sentence.take() {
        fixture.sentences.push(builder.finish()?);
    }

    let first = reply_lines.iter().position(|l| !l.trim().is_empty());
    let last = reply_lines.iter().rposition(|l| !l.trim().is_empty());
    if let (Some(first), Some(last)) = (first, last) {
        fixture.reply = reply_lines[first..=last].join("\n");
        fixture.reply.push('\n');
    }

    Ok(fixture)
}

fn parse_header_line(fixture: &mut OpinionFixture, trimmed: &str, line: usize) -> SpecResult<()> {
    if let Some(title) = trimmed.strip_prefix("# ") {
        if fixture.title.is_none() {
            fixture.title = Some(title.trim().to_string());
        }
        return Ok(());
    }

    if let Some(name) = trimmed.strip_prefix("grammar:") {
        fixture.grammar = name.parse::<ResponseGrammar>().map_err(|e| SpecError::Parse {
            line,
            message: e.to_string(),
        })?;
        return Ok(());
    }

    Err(SpecError::Parse {
        line,
        message: format!("unexpected line before the first section: {}", trimmed),
    })
}

fn parse_expect_line(fixture: &mut OpinionFixture, trimmed: &str, line: usize) -> SpecResult<()> {
    if let Some(body) = trimmed.strip_prefix("> ") {
        fixture.expectations.push(parse_expectation(body.trim(), line)?);
        return Ok(());
    }

    if let Some(body) = trimmed.strip_prefix("! ") {
        let body = body.trim();
        if body == "out-of-range" {
            fixture.expect_out_of_range = true;
            return Ok(());
        }
        if let Some(position) = body.strip_prefix("diagnostic ") {
            fixture.diagnostics.push(parse_diagnostic(position.trim(), line)?);
            return Ok(());
        }
    }

    Err(SpecError::Parse {
        line,
        message: format!("expected `> ` or `! ` expectation, found: {}", trimmed),
    })
}

/// Parse `s{sentence}[{start}..{end}) {score} {label}`.
fn parse_expectation(body: &str, line: usize) -> SpecResult<Expectation> {
    let err = |message: &str| SpecError::Parse {
        line,
        message: format!("{}: {}", message, body),
    };

    let (span, rest) = body.split_once(' ').ok_or_else(|| err("expected span, score and label"))?;
    let (score, label) = rest
        .trim_start()
        .split_once(' ')
        .ok_or_else(|| err("expected score and label"))?;

    let (sentence, range) = span
        .strip_prefix('s')
        .and_then(|s| s.split_once('['))
        .ok_or_else(|| err("expected span like s0[1..2)"))?;
    let (start, end) = range
        .strip_suffix(')')
        .and_then(|r| r.split_once(".."))
        .ok_or_else(|| err("expected span like s0[1..2)"))?;

    let index = |value: &str| value.parse::<usize>().map_err(|_| err("invalid span index"));

    Ok(Expectation {
        sentence: index(sentence)?,
        start: index(start)?,
        end: index(end)?,
        confidence: score.parse::<f64>().map_err(|_| err("invalid score"))?,
        label: label.trim().to_string(),
        source_line: line,
    })
}

/// Parse `{line}:{field}`.
fn parse_diagnostic(position: &str, line: usize) -> SpecResult<(usize, usize)> {
    let parsed = position
        .split_once(':')
        .and_then(|(l, f)| Some((l.parse::<usize>().ok()?, f.parse::<usize>().ok()?)));

    parsed.ok_or_else(|| SpecError::Parse {
        line,
        message: format!("expected diagnostic position like 3:0, found: {}", position),
    })
}
