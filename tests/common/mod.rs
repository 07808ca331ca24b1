// Test utilities for refactor-advisor integration tests
#![allow(dead_code)]

/// Apply a unified diff produced by `refactor_advisor::diff` to `original`,
/// the way `patch` would.
pub fn apply_unified_diff(original: &str, diff: &str) -> String {
    let source: Vec<&str> = original.split_inclusive('\n').collect();
    let mut output: Vec<String> = Vec::new();
    let mut cursor = 0;
    let mut last_op = ' ';

    for line in diff.split_inclusive('\n') {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            continue;
        }
        if let Some(header) = line.strip_prefix("@@ -") {
            let (old_start, old_len) = parse_range(header);
            let copy_until = if old_len == 0 { old_start } else { old_start - 1 };
            while cursor < copy_until {
                output.push(source[cursor].to_string());
                cursor += 1;
            }
            continue;
        }
        if line.starts_with('\\') {
            // "\ No newline at end of file" applies to the previous line.
            if last_op != '-' {
                if let Some(prev) = output.last_mut() {
                    if prev.ends_with('\n') {
                        prev.pop();
                    }
                }
            }
            continue;
        }

        let (op, content) = line.split_at(1);
        match op {
            " " => {
                output.push(content.to_string());
                cursor += 1;
            }
            "-" => cursor += 1,
            "+" => output.push(content.to_string()),
            other => panic!("unexpected diff line prefix {other:?}"),
        }
        last_op = op.chars().next().unwrap_or(' ');
    }

    while cursor < source.len() {
        output.push(source[cursor].to_string());
        cursor += 1;
    }
    output.concat()
}

/// `start[,len]` of the old side of a hunk header.
fn parse_range(header: &str) -> (usize, usize) {
    let old = header.split_whitespace().next().unwrap();
    match old.split_once(',') {
        Some((start, len)) => (start.parse().unwrap(), len.parse().unwrap()),
        None => (old.parse().unwrap(), 1),
    }
}

pub const UNDOCUMENTED: &str = "def calculate(x, y):\n    return x * y + 10\n";

pub const STRING_BUILDER: &str = "\
def render(items: list) -> str:
    \"\"\"Render items.\"\"\"
    out = \"\"
    for item in items:
        out += str(item)
    return out
";
