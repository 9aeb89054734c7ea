//! Line breaking helpers used by cells.
//!
//! The functions take a `measure` closure returning the width of a string in
//! millimetres so they stay independent of the surface that provides metrics.

/// One line produced by [`wrap_lines`].
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Set on the last line before an explicit newline or the end of the text.
    pub ends_paragraph: bool,
}

/// Greedy word wrap of `text` into lines no wider than `max_width`.
///
/// Explicit newlines start new lines.  Words wider than a whole line are broken
/// at character boundaries.  The result always holds at least one line.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    wrap_lines(text, max_width, measure)
        .into_iter()
        .map(|line| line.text)
        .collect()
}

/// Same as [`wrap_text`], keeping track of where each paragraph ends.
pub fn wrap_lines<F>(text: &str, max_width: f64, measure: F) -> Vec<WrappedLine>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let space_width = measure(" ");
    fn push(lines: &mut Vec<WrappedLine>, text: String, ends_paragraph: bool) {
        lines.push(WrappedLine {
            text,
            ends_paragraph,
        });
    }

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = measure(word);

            if word_width > max_width {
                if !current.is_empty() {
                    push(&mut lines, std::mem::take(&mut current), false);
                }
                let mut chunk = String::new();
                let mut chunk_width = 0.0;
                for ch in word.chars() {
                    let ch_width = measure(ch.encode_utf8(&mut [0; 4]));
                    if chunk_width + ch_width > max_width && !chunk.is_empty() {
                        push(&mut lines, std::mem::take(&mut chunk), false);
                        chunk_width = 0.0;
                    }
                    chunk.push(ch);
                    chunk_width += ch_width;
                }
                current = chunk;
                current_width = chunk_width;
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + space_width + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space_width + word_width;
            } else {
                let full = std::mem::replace(&mut current, word.to_string());
                push(&mut lines, full, false);
                current_width = word_width;
            }
        }

        push(&mut lines, current, true);
    }

    lines
}

/// Cuts `text` so that it is no wider than `max_width`.
pub fn truncate_to_width<F>(text: &str, max_width: f64, measure: F) -> String
where
    F: Fn(&str) -> f64,
{
    if measure(text) <= max_width {
        return text.to_string();
    }

    let mut truncated = String::new();
    for ch in text.chars() {
        truncated.push(ch);
        if measure(&truncated) > max_width {
            truncated.pop();
            break;
        }
    }
    truncated
}

/// Extra space to add to each inter-word gap so `line` spans `max_width`.
///
/// Returns `None` for lines without gaps or lines that already overflow.
pub fn justify_gap<F>(line: &str, max_width: f64, measure: F) -> Option<f64>
where
    F: Fn(&str) -> f64,
{
    let gaps = line.split_whitespace().count().checked_sub(1)?;
    if gaps == 0 {
        return None;
    }
    let slack = max_width - measure(line);
    if slack <= 0.0 {
        return None;
    }
    Some(slack / gaps as f64)
}
