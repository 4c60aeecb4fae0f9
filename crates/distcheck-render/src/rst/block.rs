//! Block-level structure: sections, paragraphs, lists, literal blocks and
//! explicit markup.

use super::{normalize_name, Context, Halt, Level};
use crate::html::escape;

/// Characters that may form section adornments and transitions.
const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Directives whose content is parsed as body elements.
const BODY_DIRECTIVES: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
    "admonition",
    "topic",
    "sidebar",
    "container",
    "compound",
    "epigraph",
    "highlights",
    "pull-quote",
];

/// Directives whose argument is a title rather than content.
const TITLED_DIRECTIVES: &[&str] = &["admonition", "topic", "sidebar"];

/// Directives whose content is shown verbatim.
const LITERAL_DIRECTIVES: &[&str] = &["code", "code-block", "sourcecode", "parsed-literal", "math"];

/// Directives that are recognized but produce nothing checked here.
const OTHER_DIRECTIVES: &[&str] = &[
    "image",
    "figure",
    "rubric",
    "contents",
    "sectnum",
    "section-numbering",
    "header",
    "footer",
    "table",
    "csv-table",
    "list-table",
    "line-block",
    "class",
    "role",
    "default-role",
    "title",
    "meta",
    "replace",
    "unicode",
    "date",
    "target-notes",
];

/// Directives refused for untrusted input.
const DISABLED_DIRECTIVES: &[&str] = &["raw", "include"];

/// One source line with tabs expanded and trailing whitespace removed.
#[derive(Debug, Clone)]
pub(crate) struct Line {
    /// 1-based line number in the original source.
    pub no: usize,
    pub text: String,
}

impl Line {
    pub(crate) fn split(source: &str) -> Vec<Line> {
        source
            .lines()
            .enumerate()
            .map(|(i, raw)| Line {
                no: i + 1,
                text: expand_tabs(raw).trim_end().to_string(),
            })
            .collect()
    }

    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    fn indent(&self) -> usize {
        self.text.bytes().take_while(|&b| b == b' ').count()
    }

    /// Remove up to `n` leading spaces.
    fn dedented(&self, n: usize) -> Line {
        let cut = self.indent().min(n);
        Line {
            no: self.no,
            text: self.text[cut..].to_string(),
        }
    }
}

/// Section title style: optional overline character plus underline character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Adornment {
    over: Option<char>,
    under: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Enumerated,
}

impl ListKind {
    fn marker_width(&self, text: &str) -> Option<usize> {
        match self {
            ListKind::Bullet => bullet_width(text),
            ListKind::Enumerated => enumerator_width(text),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ListKind::Bullet => "Bullet list",
            ListKind::Enumerated => "Enumerated list",
        }
    }
}

impl Context<'_> {
    /// Parse a sequence of body elements. `nested` is set inside block
    /// quotes, list items and directive content, where titles are not
    /// allowed.
    pub(crate) fn body(
        &mut self,
        lines: &[Line],
        nested: bool,
        out: &mut String,
    ) -> Result<(), Halt> {
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if line.is_blank() {
                i += 1;
                continue;
            }

            i = if line.indent() > 0 {
                self.block_quote(lines, i, out)?
            } else if is_explicit_start(&line.text) {
                self.explicit(lines, i, out)?
            } else if line.text.starts_with(">>>") {
                self.doctest(lines, i, out)
            } else if bullet_width(&line.text).is_some() {
                self.list(lines, i, ListKind::Bullet, out)?
            } else if enumerator_width(&line.text).is_some() && starts_enumerated_list(lines, i) {
                self.list(lines, i, ListKind::Enumerated, out)?
            } else if let Some(next) = self.title(lines, i, nested, out)? {
                next
            } else if line.text == "|" || line.text.starts_with("| ") {
                self.line_block(lines, i, out)?
            } else {
                self.paragraph(lines, i, out)?
            };
        }
        Ok(())
    }

    fn block_quote(
        &mut self,
        lines: &[Line],
        start: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let end = indented_end(lines, start, 1);
        let inner = dedent(&lines[start..end]);
        out.push_str("<blockquote>\n");
        self.body(&inner, true, out)?;
        out.push_str("</blockquote>\n");
        self.check_unindent(lines, end, "Block quote")?;
        Ok(end)
    }

    /// Warn when an indented construct is followed directly by unindented
    /// text.
    fn check_unindent(&mut self, lines: &[Line], end: usize, construct: &str) -> Result<(), Halt> {
        if end > 0 && end < lines.len() && !lines[end - 1].is_blank() {
            self.report(
                lines[end].no,
                Level::Warning,
                format!("{} ends without a blank line; unexpected unindent.", construct),
            )?;
        }
        Ok(())
    }

    fn title(
        &mut self,
        lines: &[Line],
        start: usize,
        nested: bool,
        out: &mut String,
    ) -> Result<Option<usize>, Halt> {
        let line = &lines[start];
        if let Some(ch) = adornment_char(&line.text) {
            return self.overline_title(lines, start, ch, nested, out);
        }

        let Some(next) = lines.get(start + 1) else {
            return Ok(None);
        };
        let Some(ch) = adornment_char(&next.text) else {
            return Ok(None);
        };

        let title = line.text.as_str();
        let underline_len = next.text.chars().count();
        if underline_len < title.chars().count() {
            // Too short to be meant as an underline: ordinary text.
            if underline_len < 4 {
                return Ok(None);
            }
            self.report_with(
                next.no,
                Level::Warning,
                "Title underline too short.",
                Some(format!("{}\n{}", title, next.text)),
            )?;
        }

        let style = Adornment { over: None, under: ch };
        self.section(style, title, line.no, nested, out)?;
        Ok(Some(start + 2))
    }

    fn overline_title(
        &mut self,
        lines: &[Line],
        start: usize,
        ch: char,
        nested: bool,
        out: &mut String,
    ) -> Result<Option<usize>, Halt> {
        let over = &lines[start];
        let over_len = over.text.chars().count();
        if over_len < 4 {
            return Ok(None);
        }

        let Some(title_line) = lines.get(start + 1).filter(|l| !l.is_blank()) else {
            out.push_str("<hr />\n");
            return Ok(Some(start + 1));
        };
        let title = title_line.text.trim();

        let under = lines.get(start + 2).filter(|l| adornment_char(&l.text).is_some());
        let Some(under) = under else {
            self.report_with(
                over.no,
                Level::Severe,
                "Missing matching underline for section title overline.",
                Some(format!("{}\n{}", over.text, title_line.text)),
            )?;
            return Ok(Some(start + 2));
        };

        if under.text != over.text {
            self.report_with(
                over.no,
                Level::Severe,
                "Title overline & underline mismatch.",
                Some(format!("{}\n{}\n{}", over.text, title_line.text, under.text)),
            )?;
            return Ok(Some(start + 3));
        }

        if title.chars().count() > over_len {
            self.report_with(
                over.no,
                Level::Warning,
                "Title overline too short.",
                Some(format!("{}\n{}\n{}", over.text, title_line.text, under.text)),
            )?;
        }

        let style = Adornment {
            over: Some(ch),
            under: ch,
        };
        self.section(style, title, title_line.no, nested, out)?;
        Ok(Some(start + 3))
    }

    fn section(
        &mut self,
        style: Adornment,
        title: &str,
        line: usize,
        nested: bool,
        out: &mut String,
    ) -> Result<(), Halt> {
        if nested {
            return self.report(line, Level::Severe, "Unexpected section title.");
        }

        let known = self.title_styles.iter().position(|s| *s == style);
        let level = match known {
            Some(idx) if idx < self.section_level + 1 => idx + 1,
            None if self.title_styles.len() == self.section_level => {
                self.title_styles.push(style);
                self.title_styles.len()
            }
            _ => {
                return self.report_with(
                    line,
                    Level::Severe,
                    "Title level inconsistent:",
                    Some(title.to_string()),
                );
            }
        };
        self.section_level = level;
        self.add_target(line, title, false)?;

        let html = self.inline(title, line)?;
        let tag = (level + 1).min(6);
        out.push_str(&format!("<h{0}>{1}</h{0}>\n", tag, html));
        Ok(())
    }

    fn paragraph(&mut self, lines: &[Line], start: usize, out: &mut String) -> Result<usize, Halt> {
        let mut end = start + 1;
        while end < lines.len() && !lines[end].is_blank() && lines[end].indent() == 0 {
            end += 1;
        }

        if let Some(next) = lines.get(end).filter(|l| !l.is_blank()) {
            // A single line followed by an indented block is a definition.
            if end - start == 1 {
                return self.definition(lines, start, out);
            }
            self.report(next.no, Level::Error, "Unexpected indentation.")?;
        }

        let text = join_text(&lines[start..end]);
        let (text, expects_literal) = split_literal_marker(&text);
        if !text.is_empty() {
            let html = self.inline(&text, lines[start].no)?;
            out.push_str(&format!("<p>{}</p>\n", html));
        }

        if expects_literal {
            return self.literal_block(lines, end, out);
        }
        Ok(end)
    }

    fn literal_block(
        &mut self,
        lines: &[Line],
        from: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let mut start = from;
        while start < lines.len() && lines[start].is_blank() {
            start += 1;
        }

        if start >= lines.len() || lines[start].indent() == 0 {
            let line = lines
                .get(start)
                .or_else(|| lines.last())
                .map_or(1, |l| l.no);
            self.report(line, Level::Warning, "Literal block expected; none found.")?;
            return Ok(from);
        }

        let end = indented_end(lines, start, 1);
        let block = dedent(&lines[start..end]);
        out.push_str(&format!("<pre>{}</pre>\n", escape(join_text(&block).trim_end())));
        self.check_unindent(lines, end, "Literal block")?;
        Ok(end)
    }

    fn definition(
        &mut self,
        lines: &[Line],
        start: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let term = &lines[start];
        let end = indented_end(lines, start + 1, 1);
        let body = dedent(&lines[start + 1..end]);

        let term_html = self.inline(&term.text, term.no)?;
        out.push_str(&format!("<dl>\n<dt>{}</dt>\n<dd>\n", term_html));
        self.body(&body, true, out)?;
        out.push_str("</dd>\n</dl>\n");
        self.check_unindent(lines, end, "Definition list")?;
        Ok(end)
    }

    fn list(
        &mut self,
        lines: &[Line],
        start: usize,
        kind: ListKind,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let (open, close) = match kind {
            ListKind::Bullet => ("<ul>\n", "</ul>\n"),
            ListKind::Enumerated => ("<ol>\n", "</ol>\n"),
        };
        out.push_str(open);

        let mut i = start;
        loop {
            let line = &lines[i];
            let width = kind.marker_width(&line.text).unwrap_or(0);
            let end = indented_end(lines, i + 1, 1);

            let mut item = vec![Line {
                no: line.no,
                text: line.text[width..].to_string(),
            }];
            item.extend(lines[i + 1..end].iter().map(|l| l.dedented(width)));

            out.push_str("<li>");
            self.body(&item, true, out)?;
            out.push_str("</li>\n");

            match lines.get(end) {
                Some(next) if kind.marker_width(&next.text).is_some() => i = end,
                _ => {
                    out.push_str(close);
                    self.check_unindent(lines, end, kind.name())?;
                    return Ok(end);
                }
            }
        }
    }

    fn line_block(
        &mut self,
        lines: &[Line],
        start: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let mut end = start;
        out.push_str("<div class=\"line-block\">\n");
        while end < lines.len() && !lines[end].is_blank() {
            let line = &lines[end];
            let text = line
                .text
                .strip_prefix('|')
                .map(str::trim_start)
                .unwrap_or_else(|| line.text.trim_start());
            let html = self.inline(text, line.no)?;
            out.push_str(&format!("<div class=\"line\">{}</div>\n", html));
            end += 1;
        }
        out.push_str("</div>\n");
        Ok(end)
    }

    fn doctest(&mut self, lines: &[Line], start: usize, out: &mut String) -> usize {
        let mut end = start;
        while end < lines.len() && !lines[end].is_blank() {
            end += 1;
        }
        out.push_str(&format!(
            "<pre class=\"doctest\">{}</pre>\n",
            escape(&join_text(&lines[start..end]))
        ));
        end
    }

    fn explicit(&mut self, lines: &[Line], start: usize, out: &mut String) -> Result<usize, Halt> {
        let first = &lines[start];
        let end = indented_end(lines, start + 1, 1);
        let body = &lines[start + 1..end];

        if !first.text.starts_with("__ ") {
            let rest = first.text[2..].trim_start();
            if let Some(marker) = rest.strip_prefix('_') {
                self.target(first.no, marker)?;
            } else if let Some(marker) = rest.strip_prefix('[') {
                self.footnote(first, marker, body, out)?;
            } else if let Some(marker) = rest.strip_prefix('|') {
                self.substitution_definition(first, marker, body)?;
            } else if let Some((name, arg)) = split_directive(rest) {
                self.directive(first, name, arg, body, out)?;
            }
            // Anything else is a comment.
        }

        let continues = lines.get(end).map_or(false, |l| is_explicit_start(&l.text));
        if !continues {
            self.check_unindent(lines, end, "Explicit markup")?;
        }
        Ok(end)
    }

    fn target(&mut self, line: usize, marker: &str) -> Result<(), Halt> {
        // `.. __: uri` is an anonymous target.
        if marker.starts_with("_:") {
            return Ok(());
        }
        let name = match marker.strip_prefix('`') {
            Some(quoted) => quoted.split_once("`:").map(|(name, _)| name),
            None => marker
                .find(": ")
                .map(|idx| &marker[..idx])
                .or_else(|| marker.strip_suffix(':')),
        };
        match name {
            Some(name) if !name.trim().is_empty() => self.add_target(line, name, true),
            _ => Ok(()),
        }
    }

    fn footnote(
        &mut self,
        first: &Line,
        marker: &str,
        body: &[Line],
        out: &mut String,
    ) -> Result<(), Halt> {
        let Some((label, text)) = marker.split_once(']') else {
            return Ok(());
        };
        self.targets.insert(normalize_name(label));

        let mut content = vec![Line {
            no: first.no,
            text: text.trim().to_string(),
        }];
        content.extend(dedent(body));
        out.push_str(&format!("<div class=\"footnote\" id=\"{}\">\n", escape(label)));
        self.body(&content, true, out)?;
        out.push_str("</div>\n");
        Ok(())
    }

    fn substitution_definition(
        &mut self,
        first: &Line,
        marker: &str,
        body: &[Line],
    ) -> Result<(), Halt> {
        let Some((name, rest)) = marker.split_once('|') else {
            return Ok(());
        };
        self.substitutions.insert(normalize_name(name));

        if let Some((directive, _)) = split_directive(rest.trim_start()) {
            if !is_known_directive(directive) {
                self.report_with(
                    first.no,
                    Level::Error,
                    format!("Unknown directive type \"{}\".", directive),
                    Some(excerpt(first, body)),
                )?;
            }
        }
        Ok(())
    }

    fn directive(
        &mut self,
        first: &Line,
        name: &str,
        arg: &str,
        body: &[Line],
        out: &mut String,
    ) -> Result<(), Halt> {
        let key = name.to_ascii_lowercase();
        let key = key.as_str();

        if DISABLED_DIRECTIVES.contains(&key) {
            let message = format!("\"{}\" directive disabled.", key);
            return self.report(first.no, Level::Warning, message);
        }

        let content = directive_content(body);
        if BODY_DIRECTIVES.contains(&key) {
            out.push_str(&format!("<div class=\"admonition {}\">\n", key));
            let mut lines = Vec::new();
            if TITLED_DIRECTIVES.contains(&key) {
                if !arg.is_empty() {
                    let title = self.inline(arg, first.no)?;
                    out.push_str(&format!("<p class=\"admonition-title\">{}</p>\n", title));
                }
            } else if !arg.is_empty() {
                lines.push(Line {
                    no: first.no,
                    text: arg.to_string(),
                });
            }
            lines.extend(content);
            self.body(&lines, true, out)?;
            out.push_str("</div>\n");
        } else if LITERAL_DIRECTIVES.contains(&key) {
            let class = if arg.is_empty() {
                String::new()
            } else {
                format!(" class=\"code {}\"", escape(arg))
            };
            out.push_str(&format!(
                "<pre{}>{}</pre>\n",
                class,
                escape(join_text(&content).trim_end())
            ));
        } else if key == "image" || key == "figure" {
            out.push_str(&format!("<img src=\"{}\" alt=\"\">\n", escape(arg)));
            if key == "figure" && !content.is_empty() {
                self.body(&content, true, out)?;
            }
        } else if !OTHER_DIRECTIVES.contains(&key) {
            self.report_with(
                first.no,
                Level::Error,
                format!("Unknown directive type \"{}\".", name),
                Some(excerpt(first, body)),
            )?;
        }
        Ok(())
    }
}

fn expand_tabs(raw: &str) -> String {
    if !raw.contains('\t') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 8);
    let mut column = 0;
    for c in raw.chars() {
        if c == '\t' {
            let spaces = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

fn is_explicit_start(text: &str) -> bool {
    text == ".." || text.starts_with(".. ") || text.starts_with("__ ")
}

fn adornment_char(text: &str) -> Option<char> {
    let first = text.chars().next()?;
    if !ADORNMENT_CHARS.contains(first) {
        return None;
    }
    text.chars().all(|c| c == first).then_some(first)
}

fn bullet_width(text: &str) -> Option<usize> {
    let first = text.chars().next()?;
    if !matches!(first, '-' | '+' | '*') {
        return None;
    }
    marker_with_spaces(&text[1..], 1)
}

fn enumerator_width(text: &str) -> Option<usize> {
    let (body, open) = match text.strip_prefix('(') {
        Some(rest) => (rest, 1),
        None => (text, 0),
    };
    let digits = if body.starts_with('#') {
        1
    } else {
        body.bytes().take_while(u8::is_ascii_digit).count()
    };
    if digits == 0 {
        return None;
    }
    let after = &body[digits..];
    let closer = after.chars().next()?;
    let closed = if open == 1 {
        closer == ')'
    } else {
        closer == '.' || closer == ')'
    };
    if !closed {
        return None;
    }
    marker_with_spaces(&after[1..], open + digits + 1)
}

/// Width of a list marker of `marker_len` bytes followed by `rest`.
fn marker_with_spaces(rest: &str, marker_len: usize) -> Option<usize> {
    if rest.is_empty() {
        return Some(marker_len);
    }
    let spaces = rest.len() - rest.trim_start_matches(' ').len();
    (spaces > 0).then_some(marker_len + spaces)
}

/// An enumerator only starts a list when the next line cannot continue a
/// paragraph.
fn starts_enumerated_list(lines: &[Line], start: usize) -> bool {
    match lines.get(start + 1) {
        None => true,
        Some(next) => {
            next.is_blank() || next.indent() > 0 || enumerator_width(&next.text).is_some()
        }
    }
}

/// End (exclusive) of the run of blank lines and lines indented by at least
/// `min_indent`, starting at `from`.
fn indented_end(lines: &[Line], from: usize, min_indent: usize) -> usize {
    let mut end = from;
    while end < lines.len() && (lines[end].is_blank() || lines[end].indent() >= min_indent) {
        end += 1;
    }
    end
}

fn dedent(lines: &[Line]) -> Vec<Line> {
    let min = lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(Line::indent)
        .min()
        .unwrap_or(0);
    lines.iter().map(|l| l.dedented(min)).collect()
}

/// Directive content without the leading option list.
fn directive_content(body: &[Line]) -> Vec<Line> {
    let lines = dedent(body);
    let skip = lines
        .iter()
        .take_while(|l| l.text.starts_with(':'))
        .count();
    lines.into_iter().skip(skip).collect()
}

fn join_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn excerpt(first: &Line, body: &[Line]) -> String {
    let mut text = first.text.clone();
    for line in body {
        text.push('\n');
        text.push_str(&line.text);
    }
    text.trim_end().to_string()
}

/// Strip a trailing `::` literal marker, returning the remaining text.
fn split_literal_marker(text: &str) -> (String, bool) {
    if text == "::" {
        return (String::new(), true);
    }
    match text.strip_suffix("::") {
        Some(rest) if rest.ends_with(char::is_whitespace) => (rest.trim_end().to_string(), true),
        Some(rest) => (format!("{}:", rest), true),
        None => (text.to_string(), false),
    }
}

/// Split `name:: argument` into its parts.
fn split_directive(text: &str) -> Option<(&str, &str)> {
    let idx = text.find("::")?;
    let name = &text[..idx];
    let rest = &text[idx + 2..];
    let valid_name = name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | ':'));
    if !valid_name || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    Some((name, rest.trim()))
}

fn is_known_directive(name: &str) -> bool {
    let key = name.to_ascii_lowercase();
    let key = key.as_str();
    BODY_DIRECTIVES.contains(&key)
        || LITERAL_DIRECTIVES.contains(&key)
        || OTHER_DIRECTIVES.contains(&key)
        || DISABLED_DIRECTIVES.contains(&key)
}
