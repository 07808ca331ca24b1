//! Whole-line span replacement used by live execution.

use crate::core::LineSpan;
use crate::errors::ExecutionError;

/// Replace the lines of `span` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub span: LineSpan,
    /// Replacement text, lines separated by `\n`, without a trailing terminator.
    pub replacement: String,
}

impl LineEdit {
    pub fn new(span: LineSpan, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

/// Apply all `edits` to `source` or none of them.
///
/// Spans must lie inside the source and must not overlap. The source's line
/// terminator style is used for inserted lines, and each replaced block keeps
/// the terminator of its last original line, so a missing final newline stays
/// missing.
pub fn apply_line_edits(source: &str, edits: &[LineEdit]) -> Result<String, ExecutionError> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let eol = if source.contains("\r\n") { "\r\n" } else { "\n" };

    let mut ordered: Vec<&LineEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.span.start_line, edit.span.end_line));

    for edit in &ordered {
        let LineSpan {
            start_line,
            end_line,
        } = edit.span;
        if start_line == 0 || end_line > lines.len() {
            return Err(ExecutionError::SpanOutOfRange {
                start: start_line,
                end: end_line,
                lines: lines.len(),
            });
        }
    }
    for pair in ordered.windows(2) {
        let (first, second) = (pair[0].span, pair[1].span);
        if first.overlaps(&second) {
            return Err(ExecutionError::OverlappingFixes {
                first_start: first.start_line,
                first_end: first.end_line,
                second_start: second.start_line,
                second_end: second.end_line,
            });
        }
    }

    // Bottom-up keeps earlier line numbers valid while splicing.
    let mut output: Vec<String> = lines.iter().map(|line| (*line).to_string()).collect();
    for edit in ordered.iter().rev() {
        let start = edit.span.start_line - 1;
        let end = edit.span.end_line;
        let terminator = terminator_of(lines[end - 1]);
        let block = render_block(&edit.replacement, eol, terminator);
        output.splice(start..end, block);
    }

    Ok(output.concat())
}

fn terminator_of(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

fn render_block(replacement: &str, eol: &str, terminator: &str) -> Vec<String> {
    if replacement.is_empty() {
        return Vec::new();
    }
    let parts: Vec<&str> = replacement.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let last = parts.len() - 1;
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            let end = if idx == last { terminator } else { eol };
            format!("{part}{end}")
        })
        .collect()
}
