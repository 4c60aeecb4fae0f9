//! Warning capture for renderer diagnostics.

use std::fmt;
use std::sync::OnceLock;

use distcheck_render::WarningSink;
use regex_lite::Regex;

/// Docutils-style system message: `<string>:2: (WARNING/2) text`.
const REPORT_PATTERN: &str = r"(?s)^<string>:(?P<line>\d*): \((?P<level>\w+)/\d+\) (?P<message>.*)";

fn report_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REPORT_PATTERN).ok()).as_ref()
}

/// Buffer that receives renderer diagnostics, rewriting system messages
/// into `line N: Level: message` form.
#[derive(Debug, Default, Clone)]
pub struct WarningStream {
    output: String,
}

impl WarningStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, in write order.
    pub fn contents(&self) -> &str {
        &self.output
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }
}

impl WarningSink for WarningStream {
    fn write(&mut self, text: &str) {
        let Some(caps) = report_re().and_then(|re| re.captures(text)) else {
            self.output.push_str(text);
            return;
        };

        let line = caps.name("line").map_or("", |m| m.as_str());
        let level = caps.name("level").map_or("", |m| m.as_str());
        let message = caps
            .name("message")
            .map_or("", |m| m.as_str())
            .trim_end_matches(|c| c == '\r' || c == '\n');

        self.output
            .push_str(&format!("line {}: {}: {}\n", line, capitalize(level), message));
    }
}

impl fmt::Display for WarningStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

/// `WARNING` -> `Warning`.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
