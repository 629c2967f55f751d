//! Terminal output for chat turns.
//!
//! Assistant replies are markdown; they are flattened into [`Line`]s of typed
//! [`Span`]s first and only then written with crossterm, so the layout can be
//! checked without a terminal.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use leetcoach_core::{Sender, Turn};

use crate::theme::{Palette, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Plain,
    Strong,
    Emphasis,
    Code,
    Heading,
    Bullet,
    CodeBlock,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub kind: SpanKind,
}

impl Span {
    fn new(text: impl Into<String>, kind: SpanKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

pub type Line = Vec<Span>;

/// Text of a line without styling.
pub fn plain_text(line: &Line) -> String {
    line.iter().map(|span| span.text.as_str()).collect()
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line>,
    current: Line,
    strong: usize,
    emphasis: usize,
    heading: bool,
    code_block: bool,
    lists: Vec<Option<u64>>,
}

impl LineBuilder {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(Vec::new());
        }
    }

    fn text_kind(&self) -> SpanKind {
        if self.heading {
            SpanKind::Heading
        } else if self.strong > 0 {
            SpanKind::Strong
        } else if self.emphasis > 0 {
            SpanKind::Emphasis
        } else {
            SpanKind::Plain
        }
    }

    fn push(&mut self, text: &str, kind: SpanKind) {
        // Adjacent runs of the same kind merge.
        match self.current.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(text),
            _ => self.current.push(Span::new(text, kind)),
        }
    }

    fn start_item(&mut self) {
        self.flush();
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{n}. ");
                *n += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        self.current
            .push(Span::new(format!("{}{marker}", "  ".repeat(depth)), SpanKind::Bullet));
    }

    fn finish(mut self) -> Vec<Line> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Flatten markdown into styled lines. Blocks are separated by one empty line.
pub fn markdown_lines(markdown: &str) -> Vec<Line> {
    let mut b = LineBuilder::default();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                b.blank();
                b.heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                b.heading = false;
                b.blank();
            }
            Event::End(TagEnd::Paragraph) => {
                if b.lists.is_empty() {
                    b.blank();
                } else {
                    b.flush();
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                b.flush();
                b.code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                b.code_block = false;
                b.blank();
            }
            Event::Start(Tag::List(start)) => {
                b.flush();
                b.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                b.lists.pop();
                if b.lists.is_empty() {
                    b.blank();
                }
            }
            Event::Start(Tag::Item) => b.start_item(),
            Event::End(TagEnd::Item) => b.flush(),
            Event::Start(Tag::Strong) => b.strong += 1,
            Event::End(TagEnd::Strong) => b.strong = b.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => b.emphasis += 1,
            Event::End(TagEnd::Emphasis) => b.emphasis = b.emphasis.saturating_sub(1),
            Event::Code(code) => b.push(&code, SpanKind::Code),
            Event::Text(text) => {
                if b.code_block {
                    for line in text.lines() {
                        b.current.push(Span::new(line, SpanKind::CodeBlock));
                        b.flush();
                    }
                } else {
                    let kind = b.text_kind();
                    b.push(&text, kind);
                }
            }
            Event::SoftBreak => {
                let kind = b.text_kind();
                b.push(" ", kind);
            }
            Event::HardBreak => b.flush(),
            Event::Rule => {
                b.flush();
                b.current.push(Span::new("─".repeat(24), SpanKind::Rule));
                b.blank();
            }
            _ => {}
        }
    }

    b.finish()
}

pub fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Assistant => "Guide",
        Sender::System => "Info",
    }
}

pub fn write_lines(out: &mut impl Write, lines: &[Line], palette: &Palette) -> io::Result<()> {
    for line in lines {
        for span in line {
            let (color, attribute) = match span.kind {
                SpanKind::Plain => (palette.fg, None),
                SpanKind::Strong => (palette.fg, Some(Attribute::Bold)),
                SpanKind::Emphasis => (palette.fg, Some(Attribute::Italic)),
                SpanKind::Code => (palette.code_fg, None),
                SpanKind::Heading => (palette.accent, Some(Attribute::Bold)),
                SpanKind::Bullet => (palette.accent, None),
                SpanKind::CodeBlock => (palette.code_fg, None),
                SpanKind::Rule => (palette.muted, None),
            };
            if span.kind == SpanKind::CodeBlock {
                queue!(out, Print("    "))?;
            }
            queue!(out, SetForegroundColor(color))?;
            if let Some(attribute) = attribute {
                queue!(out, SetAttribute(attribute))?;
            }
            queue!(out, Print(&span.text), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        queue!(out, Print("\n"))?;
    }
    Ok(())
}

/// Write one turn: a colored header with the time, then the body.
pub fn write_turn(out: &mut impl Write, turn: &Turn, theme: Theme) -> io::Result<()> {
    let palette = theme.palette();

    queue!(
        out,
        SetForegroundColor(palette.sender_color(turn.sender())),
        SetAttribute(Attribute::Bold),
        Print(sender_label(turn.sender())),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(palette.muted),
        Print(format!(" · {}\n", turn.time_label())),
        ResetColor
    )?;

    let body = match turn.sender() {
        Sender::Assistant => markdown_lines(turn.text()),
        Sender::User | Sender::System => turn
            .text()
            .lines()
            .map(|line| vec![Span::new(line, SpanKind::Plain)])
            .collect(),
    };
    write_lines(out, &body, &palette)?;
    queue!(out, Print("\n"))?;
    out.flush()
}

pub fn write_notice(out: &mut impl Write, text: &str, theme: Theme) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(theme.palette().muted),
        Print(text),
        Print("\n"),
        ResetColor
    )?;
    out.flush()
}

pub fn write_error(out: &mut impl Write, text: &str, theme: Theme) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(theme.palette().error),
        Print(text),
        Print("\n"),
        ResetColor
    )?;
    out.flush()
}
