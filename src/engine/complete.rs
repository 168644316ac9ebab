use super::host::{Decision, TextHost};

/// Closing half for characters that auto-complete to a pair.
pub fn closing_pair(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '{' => Some('}'),
        '[' => Some(']'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '`' => Some('`'),
        _ => None,
    }
}

/// Completion for `ch`, given the character typed before it.
///
/// `>` is left to [`complete_html_tag`] because it needs the line text.
pub fn complete_char(ch: char, last: char) -> Option<Decision> {
    if let Some(close) = closing_pair(ch) {
        return Some(Decision::insert_back(format!("{ch}{close}"), 1));
    }
    if ch == '*' && last == '/' {
        return Some(Decision::insert_back("*  */", 3));
    }
    None
}

/// Close the HTML tag the caret is in, as `>` is typed.
///
/// Scans back along the current line for `<`. A `/` first means a closing or
/// self-closing tag, and no `<` at all means there is nothing to close.
pub fn complete_html_tag(host: &impl TextHost) -> Decision {
    let (line_start, x) = host.caret_column();
    let line: Vec<char> = host.line(host.line_of(line_start)).chars().collect();
    let x = x.min(line.len());

    let mut open = None;
    for i in (0..x).rev() {
        match line[i] {
            '/' => return Decision::NotHandled,
            '<' => {
                open = Some(i);
                break;
            }
            _ => {}
        }
    }

    let Some(open) = open else {
        return Decision::NotHandled;
    };

    let name: String = line[open + 1..x].iter().collect();
    let back = name.chars().count() + 3;
    Decision::insert_back(format!("></{name}>"), back)
}
