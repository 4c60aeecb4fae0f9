//! Inline markup: emphasis, literals, interpreted text, references and
//! substitutions.

use super::{normalize_name, Context, Halt, Level};
use crate::html::escape;

/// Characters allowed immediately before an inline start-string.
const START_PRECEDERS: &[char] = &['-', ':', '/', '\'', '"', '<', '(', '[', '{'];

/// Characters allowed immediately after an inline end-string.
const END_FOLLOWERS: &[char] = &[
    '-', '.', ',', ':', ';', '!', '?', '\\', '/', '\'', '"', ')', ']', '}', '>',
];

const URI_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "mailto:"];

const KNOWN_ROLES: &[&str] = &[
    "emphasis",
    "strong",
    "literal",
    "code",
    "math",
    "sub",
    "subscript",
    "sup",
    "superscript",
    "title-reference",
    "title",
    "t",
    "abbreviation",
    "ab",
    "acronym",
    "ac",
    "pep-reference",
    "pep",
    "rfc-reference",
    "rfc",
];

impl Context<'_> {
    /// Render inline markup in `text`, which starts on source line `line`.
    pub(crate) fn inline(&mut self, text: &str, line: usize) -> Result<String, Halt> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                if let Some(&next) = chars.get(i + 1) {
                    if !next.is_whitespace() {
                        push_escaped(&mut out, next);
                    }
                }
                i += 2;
                continue;
            }

            if at(&chars, i, "``") && can_start(&chars, i, 2) {
                i = self.literal(&chars, i, line, &mut out)?;
            } else if at(&chars, i, "**") && can_start(&chars, i, 2) {
                i = self.delimited(&chars, i, "**", "strong", line, &mut out)?;
            } else if c == '*' && can_start(&chars, i, 1) {
                i = self.delimited(&chars, i, "*", "emphasis", line, &mut out)?;
            } else if at(&chars, i, "_`") && can_start(&chars, i, 2) {
                i = self.inline_target(&chars, i, line, &mut out)?;
            } else if c == '`' && can_start(&chars, i, 1) {
                i = self.interpreted(&chars, i, None, line, &mut out)?;
            } else if c == '|' && can_start(&chars, i, 1) {
                i = self.substitution(&chars, i, line, &mut out)?;
            } else if let Some(next) = self.role(&chars, i, line, &mut out)? {
                i = next;
            } else if starts_uri(&chars, i) {
                i = standalone_uri(&chars, i, &mut out);
            } else if c.is_alphanumeric() && (i == 0 || !chars[i - 1].is_alphanumeric()) {
                i = self.word(&chars, i, line, &mut out);
            } else {
                push_escaped(&mut out, c);
                i += 1;
            }
        }
        Ok(out)
    }

    fn literal(
        &mut self,
        chars: &[char],
        i: usize,
        line: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        match find_end(chars, i + 2, "``", false, false) {
            Some(end) => {
                let inner: String = chars[i + 2..end].iter().collect();
                out.push_str(&format!("<code>{}</code>", escape(&inner)));
                Ok(end + 2)
            }
            None => {
                self.unterminated(line, "literal")?;
                out.push_str("``");
                Ok(i + 2)
            }
        }
    }

    fn delimited(
        &mut self,
        chars: &[char],
        i: usize,
        marker: &str,
        kind: &str,
        line: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let len = marker.len();
        match find_end(chars, i + len, marker, false, true) {
            Some(end) => {
                let inner: String = chars[i + len..end].iter().collect();
                let tag = if kind == "strong" { "strong" } else { "em" };
                out.push_str(&format!("<{0}>{1}</{0}>", tag, escape(&inner)));
                Ok(end + len)
            }
            None => {
                self.unterminated(line, kind)?;
                out.push_str(marker);
                Ok(i + len)
            }
        }
    }

    fn inline_target(
        &mut self,
        chars: &[char],
        i: usize,
        line: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        match find_end(chars, i + 2, "`", false, true) {
            Some(end) => {
                let name: String = chars[i + 2..end].iter().collect();
                self.add_target(line, &name, true)?;
                out.push_str(&format!("<span id=\"{}\">{}</span>", slug(&name), escape(&name)));
                Ok(end + 1)
            }
            None => {
                self.unterminated(line, "target")?;
                out.push_str("_`");
                Ok(i + 2)
            }
        }
    }

    /// Backquoted text starting at `i`: a phrase reference when followed by
    /// `_`, otherwise interpreted text with an optional role.
    fn interpreted(
        &mut self,
        chars: &[char],
        i: usize,
        role: Option<String>,
        line: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        let Some(end) = find_end(chars, i + 1, "`", true, true) else {
            self.unterminated(line, "interpreted text or phrase reference")?;
            out.push('`');
            return Ok(i + 1);
        };
        let inner: String = chars[i + 1..end].iter().collect();
        let underscores = trailing_underscores(chars, end + 1);
        let next = end + 1 + underscores;

        if role.is_none() && underscores > 0 {
            match embedded_uri(&inner) {
                Some((label, uri)) => {
                    if underscores == 1 {
                        self.add_target(line, label, false)?;
                    }
                    out.push_str(&format!("<a href=\"{}\">{}</a>", escape(uri), escape(label)));
                }
                None => {
                    if underscores == 1 {
                        self.references.push((line, normalize_name(&inner)));
                    }
                    out.push_str(&format!("<a href=\"#{}\">{}</a>", slug(&inner), escape(&inner)));
                }
            }
            return Ok(next);
        }

        let text = escape(&inner);
        let html = match role.as_deref() {
            None | Some("title-reference") | Some("title") | Some("t") => {
                format!("<cite>{}</cite>", text)
            }
            Some("emphasis") => format!("<em>{}</em>", text),
            Some("strong") => format!("<strong>{}</strong>", text),
            Some("literal") | Some("code") => format!("<code>{}</code>", text),
            Some("sub") | Some("subscript") => format!("<sub>{}</sub>", text),
            Some("sup") | Some("superscript") => format!("<sup>{}</sup>", text),
            Some(other) => format!("<span class=\"{}\">{}</span>", escape(other), text),
        };
        out.push_str(&html);
        Ok(end + 1)
    }

    /// A `:role:` prefix at `i` followed by backquoted text.
    fn role(
        &mut self,
        chars: &[char],
        i: usize,
        line: usize,
        out: &mut String,
    ) -> Result<Option<usize>, Halt> {
        if chars[i] != ':' || !can_start(chars, i, 1) {
            return Ok(None);
        }
        let mut k = i + 1;
        while k < chars.len() {
            let c = chars[k];
            let inner_colon = c == ':' && chars.get(k + 1).map_or(false, |n| n.is_alphanumeric());
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') || inner_colon {
                k += 1;
            } else {
                break;
            }
        }
        if k == i + 1 || !at(chars, k, ":`") {
            return Ok(None);
        }

        let name = chars[i + 1..k].iter().collect::<String>().to_lowercase();
        if !KNOWN_ROLES.contains(&name.as_str()) {
            let message = format!("Unknown interpreted text role \"{}\".", name);
            self.report(line, Level::Error, message)?;
        }
        self.interpreted(chars, k + 1, Some(name), line, out).map(Some)
    }

    fn substitution(
        &mut self,
        chars: &[char],
        i: usize,
        line: usize,
        out: &mut String,
    ) -> Result<usize, Halt> {
        match find_end(chars, i + 1, "|", true, true) {
            Some(end) => {
                let name: String = chars[i + 1..end].iter().collect();
                self.substitution_refs.push((line, normalize_name(&name)));
                out.push_str(&escape(&name));
                Ok(end + 1 + trailing_underscores(chars, end + 1))
            }
            None => {
                self.unterminated(line, "substitution_reference")?;
                out.push('|');
                Ok(i + 1)
            }
        }
    }

    /// A plain word, which is a reference when it ends in `_`.
    fn word(&mut self, chars: &[char], i: usize, line: usize, out: &mut String) -> usize {
        let mut k = i + 1;
        while k < chars.len() {
            let c = chars[k];
            if c.is_alphanumeric() {
                k += 1;
            } else if matches!(c, '-' | '.' | '_' | '+' | ':')
                && chars.get(k + 1).map_or(false, |n| n.is_alphanumeric())
            {
                k += 2;
            } else {
                break;
            }
        }
        let word: String = chars[i..k].iter().collect();

        let underscores = trailing_underscores(chars, k);
        let bounded =
            i == 0 || chars[i - 1].is_whitespace() || START_PRECEDERS.contains(&chars[i - 1]);
        let closed = chars
            .get(k + underscores)
            .map_or(true, |c| c.is_whitespace() || END_FOLLOWERS.contains(c));
        if underscores > 0 && bounded && closed {
            if underscores == 1 {
                self.references.push((line, normalize_name(&word)));
            }
            out.push_str(&format!("<a href=\"#{}\">{}</a>", slug(&word), escape(&word)));
            return k + underscores;
        }

        out.push_str(&escape(&word));
        k
    }

    fn unterminated(&mut self, line: usize, kind: &str) -> Result<(), Halt> {
        self.report(
            line,
            Level::Warning,
            format!("Inline {} start-string without end-string.", kind),
        )
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        _ => out.push(c),
    }
}

fn at(chars: &[char], pos: usize, pattern: &str) -> bool {
    pattern
        .chars()
        .enumerate()
        .all(|(n, p)| chars.get(pos + n) == Some(&p))
}

/// Whether a start-string of `len` chars at `pos` opens inline markup.
fn can_start(chars: &[char], pos: usize, len: usize) -> bool {
    let prev = pos.checked_sub(1).map(|p| chars[p]);
    let prev_ok = prev.map_or(true, |p| p.is_whitespace() || START_PRECEDERS.contains(&p));
    let Some(&next) = chars.get(pos + len) else {
        return false;
    };
    if next.is_whitespace() {
        return false;
    }
    let enclosed = matches!(
        (prev, next),
        (Some('\''), '\'')
            | (Some('"'), '"')
            | (Some('('), ')')
            | (Some('['), ']')
            | (Some('{'), '}')
            | (Some('<'), '>')
    );
    prev_ok && !enclosed
}

/// Whether an end-string of `len` chars at `pos` closes inline markup.
fn can_end(chars: &[char], pos: usize, len: usize, allow_suffix: bool) -> bool {
    if pos == 0 || chars[pos - 1].is_whitespace() {
        return false;
    }
    match chars.get(pos + len) {
        None => true,
        Some(c) => c.is_whitespace() || END_FOLLOWERS.contains(c) || (allow_suffix && *c == '_'),
    }
}

/// Position of the first valid end-string at or after `from`, with at
/// least one char of content.
fn find_end(
    chars: &[char],
    from: usize,
    end: &str,
    allow_suffix: bool,
    escapes: bool,
) -> Option<usize> {
    let len = end.chars().count();
    let mut k = from;
    while k < chars.len() {
        if escapes && chars[k] == '\\' {
            k += 2;
            continue;
        }
        if k > from && at(chars, k, end) && can_end(chars, k, len, allow_suffix) {
            return Some(k);
        }
        k += 1;
    }
    None
}

fn trailing_underscores(chars: &[char], from: usize) -> usize {
    chars[from.min(chars.len())..]
        .iter()
        .take(2)
        .take_while(|&&c| c == '_')
        .count()
}

fn starts_uri(chars: &[char], i: usize) -> bool {
    if i > 0 && chars[i - 1].is_alphanumeric() {
        return false;
    }
    URI_PREFIXES.iter().any(|prefix| {
        prefix
            .chars()
            .enumerate()
            .all(|(n, p)| chars.get(i + n).map_or(false, |c| c.to_ascii_lowercase() == p))
    })
}

fn standalone_uri(chars: &[char], i: usize, out: &mut String) -> usize {
    let mut end = i;
    while end < chars.len()
        && !chars[end].is_whitespace()
        && !matches!(chars[end], '<' | '>' | '"')
    {
        end += 1;
    }
    while end > i && matches!(chars[end - 1], '.' | ',' | ';' | ':' | '!' | '?' | ')' | '\'') {
        end -= 1;
    }
    let uri: String = chars[i..end].iter().collect();
    let uri = escape(&uri);
    out.push_str(&format!("<a href=\"{0}\">{0}</a>", uri));
    end
}

/// Split `label <uri>` into its parts.
fn embedded_uri(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_suffix('>')?;
    let open = body.rfind('<')?;
    let uri = &body[open + 1..];
    if uri.is_empty() {
        return None;
    }
    let label = body[..open].trim();
    Some((if label.is_empty() { uri } else { label }, uri))
}

fn slug(name: &str) -> String {
    normalize_name(name).replace(' ', "-")
}
