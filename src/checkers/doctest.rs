//! Structure of interactive Python examples.
//!
//! Only the example layout is validated: prompts, indentation and `doctest:` option
//! comments. The code behind the prompts is neither run nor parsed.

use crate::diagnostic::Diagnostic;
use crate::text::expand_tabs;
use regex::Regex;
use std::sync::LazyLock;

const NAME: &str = "<string>";

static PS1_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( *)>>>").unwrap());
static PS2_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ *\.\.\.").unwrap());
static OPTION_DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)#\s*doctest:\s*([^\n'"]*)$"#).unwrap());
static BLANK_OR_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ *(#.*)?$").unwrap());
static LEADING_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^line ([0-9]+)").unwrap());

const OPTION_FLAGS: [&str; 11] = [
    "DONT_ACCEPT_TRUE_FOR_1",
    "DONT_ACCEPT_BLANKLINE",
    "NORMALIZE_WHITESPACE",
    "ELLIPSIS",
    "SKIP",
    "IGNORE_EXCEPTION_DETAIL",
    "REPORT_UDIFF",
    "REPORT_CDIFF",
    "REPORT_NDIFF",
    "REPORT_ONLY_FIRST_FAILURE",
    "FAIL_FAST",
];

/// Check the layout of the examples in `code`. At most one problem is reported.
pub fn check(code: &str) -> Vec<Diagnostic> {
    let Err(message) = parse_examples(code) else {
        return Vec::new();
    };
    let Some(line) = LEADING_LINE_REGEX
        .captures(&message)
        .and_then(|captures| captures[1].parse().ok())
    else {
        return Vec::new();
    };
    vec![Diagnostic::new(line, message)]
}

/// Python's `repr()` of a string.
fn python_repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut repr = String::with_capacity(text.len() + 2);
    repr.push(quote);
    for c in text.chars() {
        match c {
            '\\' => repr.push_str("\\\\"),
            '\n' => repr.push_str("\\n"),
            '\r' => repr.push_str("\\r"),
            '\t' => repr.push_str("\\t"),
            c if c == quote => {
                repr.push('\\');
                repr.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => repr.push_str(&format!("\\x{:02x}", c as u32)),
            c => repr.push(c),
        }
    }
    repr.push(quote);
    repr
}

fn skip_chars(line: &str, count: usize) -> &str {
    line.char_indices().nth(count).map_or("", |(index, _)| &line[index..])
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ')
}

fn check_prefix(lines: &[&str], prefix: &str, first_line: usize) -> Result<(), String> {
    for (index, line) in lines.iter().enumerate() {
        if !line.is_empty() && !line.starts_with(prefix) {
            return Err(format!(
                "line {} of the docstring for {NAME} has inconsistent leading whitespace: {}",
                first_line + index + 1,
                python_repr(line)
            ));
        }
    }
    Ok(())
}

fn check_prompt_blank(lines: &[&str], indent: usize, first_line: usize) -> Result<(), String> {
    for (index, line) in lines.iter().enumerate() {
        let Some(after_prompt) = line.chars().nth(indent + 3) else {
            continue;
        };
        if after_prompt != ' ' {
            let prompt: String = line.chars().skip(indent).take(3).collect();
            return Err(format!(
                "line {} of the docstring for {NAME} lacks blank after {prompt}: {}",
                first_line + index + 1,
                python_repr(line)
            ));
        }
    }
    Ok(())
}

fn check_options(source: &str, first_line: usize) -> Result<(), String> {
    let mut has_options = false;
    for captures in OPTION_DIRECTIVE_REGEX.captures_iter(source) {
        for option in captures[1].replace(',', " ").split_whitespace() {
            let valid = (option.starts_with('+') || option.starts_with('-')) && OPTION_FLAGS.contains(&&option[1..]);
            if !valid {
                return Err(format!(
                    "line {} of the doctest for {NAME} has an invalid option: {}",
                    first_line + 1,
                    python_repr(option)
                ));
            }
            has_options = true;
        }
    }
    if has_options && BLANK_OR_COMMENT_REGEX.is_match(source) {
        return Err(format!(
            "line {first_line} of the doctest for {NAME} has an option directive on a line with no example: {}",
            python_repr(source)
        ));
    }
    Ok(())
}

/// Walk every example, returning the first layout error.
fn parse_examples(code: &str) -> Result<(), String> {
    let expanded = expand_tabs(code);
    let raw_lines: Vec<&str> = expanded.split('\n').collect();
    let min_indent = raw_lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_spaces(line))
        .min()
        .unwrap_or(0);
    let lines: Vec<&str> = raw_lines.iter().map(|line| skip_chars(line, min_indent)).collect();

    let mut index = 0;
    while index < lines.len() {
        let Some(captures) = PS1_REGEX.captures(lines[index]) else {
            index += 1;
            continue;
        };
        let first_line = index;
        let indent = captures[1].len();

        let mut end = index + 1;
        while end < lines.len() && PS2_REGEX.is_match(lines[end]) {
            end += 1;
        }
        let source_lines = &lines[index..end];

        let want_start = end;
        while end < lines.len() && !is_blank(lines[end]) && !PS1_REGEX.is_match(lines[end]) {
            end += 1;
        }
        let want_lines = &lines[want_start..end];

        check_prompt_blank(source_lines, indent, first_line)?;
        check_prefix(&source_lines[1..], &format!("{}.", " ".repeat(indent)), first_line)?;
        check_prefix(want_lines, &" ".repeat(indent), first_line + source_lines.len())?;

        let source = source_lines
            .iter()
            .map(|line| skip_chars(line, indent + 4))
            .collect::<Vec<_>>()
            .join("\n");
        check_options(&source, first_line)?;

        index = end;
    }
    Ok(())
}
