/*!
`format.rs`

Human-output formatting for the shell and vault views.

  - StyleOptions::detect() - NO_COLOR / NO_EMOJI / COLUMNS aware
  - color(role, text, &style)
  - emoji(tag, &style)
  - panel(title, lines, &style) - boxed block for help / answers
  - table(headers, rows, &style) - plain padded columns with greedy shrink
  - truncate_ellipsis(s, max_chars)

Returns formatted strings; never prints. JSON output paths must not use
these helpers so machine output stays clean.
*/

use std::borrow::Cow;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    /// Best-effort detection: COLUMNS env clamped to a sane range, colors
    /// and emoji on unless NO_COLOR / NO_EMOJI are set.
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color / Emoji                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    /// Prompt / headers.
    Primary,
    /// Mode indicator.
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        "spark" => "✨",
        "vault" => "📜",
        "key" => "🔑",
        _ => "",
    }
}

/* -------------------------------------------------------------------------- */
/* Panel                                                                      */
/* -------------------------------------------------------------------------- */

/// Boxed block: a colored title row and a body, used for the help panel
/// and `/ask` answers. Body lines wrap to the terminal width.
pub fn panel(title: &str, lines: &[String], style: &StyleOptions) -> String {
    let inner_width = style.term_width.saturating_sub(4).max(20);

    let mut body: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() {
            body.push(String::new());
            continue;
        }
        body.extend(wrap_text(line, inner_width));
    }

    let content_width = body
        .iter()
        .map(|l| display_width(l))
        .chain(std::iter::once(display_width(title)))
        .max()
        .unwrap_or(0)
        .min(inner_width);

    let mut out = String::new();
    out.push_str(&format!("┌─{}─┐\n", "─".repeat(content_width)));
    out.push_str(&format!(
        "│ {}{} │\n",
        color(Role::Primary, title, style),
        " ".repeat(content_width.saturating_sub(display_width(title)))
    ));
    out.push_str(&format!("├─{}─┤\n", "─".repeat(content_width)));
    for line in &body {
        out.push_str(&format!(
            "│ {line}{} │\n",
            " ".repeat(content_width.saturating_sub(display_width(line)))
        ));
    }
    out.push_str(&format!("└─{}─┘", "─".repeat(content_width)));
    out
}

/* -------------------------------------------------------------------------- */
/* Table                                                                      */
/* -------------------------------------------------------------------------- */

/// Padded-column table with a dashed header separator. When the natural
/// width exceeds the terminal, the widest columns are shrunk first and
/// their cells truncated with an ellipsis.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // Greedy shrink from the widest column until the row fits.
    let gap = 2;
    let min_col = 4;
    let mut total: usize = widths.iter().sum::<usize>() + (cols - 1) * gap;
    while total > style.term_width {
        let (idx, &w) = match widths.iter().enumerate().max_by_key(|(_, w)| **w) {
            Some(pair) => pair,
            None => break,
        };
        if w <= min_col {
            break;
        }
        let shrink = (w - min_col).min(total - style.term_width);
        widths[idx] -= shrink;
        total -= shrink;
    }

    let mut out = String::new();
    for (i, h) in headers.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&color(Role::Accent, fit(h, widths[i]), style));
    }
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&color(Role::Dim, sep.join("  "), style));

    for row in rows {
        out.push('\n');
        for c in 0..cols {
            if c > 0 {
                out.push_str("  ");
            }
            let raw = row.get(c).map(String::as_str).unwrap_or("");
            out.push_str(&fit(raw, widths[c]));
        }
    }
    out
}

/// Pad or ellipsis-truncate a cell to an exact display width.
fn fit(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    let truncated = truncate_ellipsis(s, width);
    let pad = width.saturating_sub(display_width(&truncated));
    format!("{truncated}{}", " ".repeat(pad))
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 1 {
        return "…".into();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        if !current.is_empty() && display_width(&current) + word.chars().count() + 1 > max_width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for esc in chars.by_ref() {
                if esc.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
