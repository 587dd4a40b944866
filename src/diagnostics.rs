// ABOUTME: Source-excerpt-plus-caret rendering shared by every pipeline stage's errors

/// Renders `message` together with the offending line of `source` and a
/// caret under `column`, e.g.:
///
/// ```text
/// [line 3] Error: Unexpected character '@'.
///   var x = @;
///           ^
/// ```
pub fn render(source: &str, line: usize, column: usize, message: &str) -> String {
    let excerpt = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let caret_pos = column.saturating_sub(1);
    let caret = " ".repeat(caret_pos) + "^";
    format!("[line {line}] Error: {message}\n  {excerpt}\n  {caret}")
}
