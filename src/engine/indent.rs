use super::host::TextHost;

/// Count of leading space characters in `line`.
///
/// Tabs are not indentation here: only `' '` counts.
pub fn indent_of(line: &str) -> usize {
    line.chars().take_while(|&ch| ch == ' ').count()
}

/// Indent of the line holding the start of the selection.
pub fn current_line_indent(host: &impl TextHost) -> usize {
    let row = host.line_of(host.selection().start);
    indent_of(&host.line(row))
}
