//! reStructuredText renderer.
//!
//! Parses the subset of reStructuredText used in package descriptions and
//! reports problems as docutils-style system messages:
//!
//! ```text
//! <string>:2: (WARNING/2) Title underline too short.
//! ```
//!
//! Messages at or above the report level are written to the warning sink.
//! The first message at or above the halt level aborts rendering, and the
//! renderer returns `None`. Both levels default to [`Level::Warning`], so any
//! warning makes the description unrenderable.

mod block;
mod inline;

use std::collections::HashSet;
use std::fmt;

use crate::{RenderParams, Renderer, WarningSink};

/// Name of the source reported in system messages.
const SOURCE: &str = "<string>";

/// System message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Severe = 4,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Severe => "SEVERE",
        }
    }
}

/// A diagnostic produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemMessage {
    /// 1-based source line.
    pub line: usize,
    pub level: Level,
    pub message: String,
    /// Source excerpt shown under the message.
    pub excerpt: Option<String>,
}

impl fmt::Display for SystemMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: ({}/{}) {}",
            SOURCE,
            self.line,
            self.level.name(),
            self.level as u8,
            self.message
        )?;
        if let Some(excerpt) = &self.excerpt {
            write!(f, "\n\n{}", excerpt)?;
        }
        Ok(())
    }
}

/// Parsing stopped at a message at or above the halt level.
#[derive(Debug)]
pub(crate) struct Halt;

/// Renderer for `text/x-rst`, also the default for undeclared content.
#[derive(Debug, Clone, Copy)]
pub struct RstRenderer {
    report_level: Level,
    halt_level: Level,
}

impl Default for RstRenderer {
    fn default() -> Self {
        Self {
            report_level: Level::Warning,
            halt_level: Level::Warning,
        }
    }
}

impl RstRenderer {
    /// Lowest level written to the warning sink.
    pub fn with_report_level(mut self, level: Level) -> Self {
        self.report_level = level;
        self
    }

    /// Lowest level that aborts rendering.
    pub fn with_halt_level(mut self, level: Level) -> Self {
        self.halt_level = level;
        self
    }
}

impl Renderer for RstRenderer {
    fn render(
        &self,
        source: &str,
        _params: &RenderParams,
        stream: &mut dyn WarningSink,
    ) -> Option<String> {
        let lines = block::Line::split(source);
        let mut ctx = Context::new(stream, self.report_level, self.halt_level);
        let mut html = String::new();

        ctx.body(&lines, false, &mut html).ok()?;
        ctx.resolve().ok()?;

        // A document with nothing visible is not a rendered description.
        if html.trim().is_empty() {
            return None;
        }
        Some(html)
    }
}

/// Parser state shared by the block and inline passes.
pub(crate) struct Context<'s> {
    stream: &'s mut dyn WarningSink,
    report_level: Level,
    halt_level: Level,
    /// Adornment styles in order of first use; index + 1 is the level.
    title_styles: Vec<block::Adornment>,
    section_level: usize,
    targets: HashSet<String>,
    explicit_targets: HashSet<String>,
    substitutions: HashSet<String>,
    references: Vec<(usize, String)>,
    substitution_refs: Vec<(usize, String)>,
}

impl<'s> Context<'s> {
    fn new(stream: &'s mut dyn WarningSink, report_level: Level, halt_level: Level) -> Self {
        Self {
            stream,
            report_level,
            halt_level,
            title_styles: Vec::new(),
            section_level: 0,
            targets: HashSet::new(),
            explicit_targets: HashSet::new(),
            substitutions: HashSet::new(),
            references: Vec::new(),
            substitution_refs: Vec::new(),
        }
    }

    fn report(
        &mut self,
        line: usize,
        level: Level,
        message: impl Into<String>,
    ) -> Result<(), Halt> {
        self.report_with(line, level, message, None)
    }

    fn report_with(
        &mut self,
        line: usize,
        level: Level,
        message: impl Into<String>,
        excerpt: Option<String>,
    ) -> Result<(), Halt> {
        let msg = SystemMessage {
            line,
            level,
            message: message.into(),
            excerpt,
        };
        if level >= self.report_level {
            self.stream.write(&format!("{}\n", msg));
        }
        if level >= self.halt_level {
            return Err(Halt);
        }
        Ok(())
    }

    /// Check references collected during parsing against known targets.
    fn resolve(&mut self) -> Result<(), Halt> {
        let references = std::mem::take(&mut self.references);
        for (line, name) in references {
            if !self.targets.contains(&name) {
                self.report(line, Level::Error, format!("Unknown target name: \"{}\".", name))?;
            }
        }

        let substitution_refs = std::mem::take(&mut self.substitution_refs);
        for (line, name) in substitution_refs {
            if !self.substitutions.contains(&name) {
                self.report(
                    line,
                    Level::Error,
                    format!("Undefined substitution referenced: \"{}\".", name),
                )?;
            }
        }
        Ok(())
    }

    fn add_target(&mut self, line: usize, name: &str, explicit: bool) -> Result<(), Halt> {
        let name = normalize_name(name);
        if explicit && !self.explicit_targets.insert(name.clone()) {
            self.report(
                line,
                Level::Warning,
                format!("Duplicate explicit target name: \"{}\".", name),
            )?;
        }
        self.targets.insert(name);
        Ok(())
    }
}

/// Reference names compare case-insensitively with whitespace collapsed.
pub(crate) fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
