//! Reindenting formatter applied to every generated QML file.

const INDENT: &str = "    ";

/// Pure text-to-text formatting pass consumed by the transformer.
pub trait Formatter {
    fn format(&self, text: &str) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> String,
{
    fn format(&self, text: &str) -> String {
        self(text)
    }
}

/// Re-indents QML by brace/bracket depth and collapses runs of blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct QmlFormatter;

impl Formatter for QmlFormatter {
    fn format(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut depth: usize = 0;
        let mut previous_blank = true;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                if !previous_blank {
                    out.push('\n');
                }
                previous_blank = true;
                continue;
            }

            let (opens, closes, leading_closes) = scan_delimiters(line);
            let indent = depth.saturating_sub(leading_closes);
            for _ in 0..indent {
                out.push_str(INDENT);
            }
            out.push_str(line);
            out.push('\n');
            previous_blank = false;

            depth = (depth + opens).saturating_sub(closes);
        }

        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}

/// Count `{`/`[` and `}`/`]` outside string literals, plus how many closers
/// lead the line.
fn scan_delimiters(line: &str) -> (usize, usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut leading = 0;
    let mut seen_other = false;
    let mut in_string = false;
    let mut escaped = false;

    for c in line.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                seen_other = true;
            }
            '{' | '[' => {
                opens += 1;
                seen_other = true;
            }
            '}' | ']' => {
                closes += 1;
                if !seen_other {
                    leading += 1;
                }
            }
            c if c.is_whitespace() || c == ',' => {}
            _ => seen_other = true,
        }
    }
    (opens, closes, leading)
}
