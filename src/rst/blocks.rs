//! Block-level parsing.
//!
//! The parser works on tab-expanded, right-trimmed lines. Nested bodies (block quotes,
//! list items, directive content) are re-parsed from dedented copies of their lines,
//! keeping the original line numbers.

use super::ParserSettings;
use super::directives::{CODE_OPTIONS, CodeStyle, DirectiveKind, DirectiveSpec, DirectiveTable};
use super::nodes::{Container, ContainerKind, Document, DoctestBlock, LiteralBlock, Node, Paragraph, Section};
use super::reporter::Reporter;
use crate::text::{expand_tabs, normalize_name};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([-*+•‣⁃])(?: +|$)").unwrap());
static ENUMERATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\((?:[0-9]+|[A-Za-z]|[ivxlcdmIVXLCDM]+|#)\)|(?:[0-9]+|[A-Za-z]|[ivxlcdmIVXLCDM]+|#)[.)])(?: +|$)",
    )
    .unwrap()
});
pub(super) static FIELD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:\s](?:[^:]*[^:\s])?):(?: +|$)").unwrap());
static DOCTEST_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>>>(?: |$)").unwrap());
static LINE_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|(?: +|$)").unwrap());
static GRID_TABLE_TOP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+-[-+]+-\+$").unwrap());
static GRID_TABLE_BORDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[-=+]+\+$").unwrap());
static SIMPLE_TABLE_BORDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^=+(?: +=+)+$").unwrap());
static DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\. +([A-Za-z0-9]+(?:[-._+:][A-Za-z0-9]+)*) ?::(?: +|$)").unwrap());
static SUBSTITUTION_DEFINITION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\. +\|([^|\s](?:[^|]*[^|\s])?)\| +([A-Za-z0-9]+(?:[-._+:][A-Za-z0-9]+)*) ?::(?: +|$)").unwrap()
});
static FOOTNOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.\. +\[([^\]\s]+)\](?: +|$)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    pub(super) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub(super) fn indent(&self) -> usize {
        self.text.bytes().take_while(|b| *b == b' ').count()
    }

    fn tail(&self, offset: usize) -> Line {
        Line {
            number: self.number,
            text: self.text.get(offset..).unwrap_or_default().to_string(),
        }
    }
}

pub(super) fn split_lines(source: &str) -> Vec<Line> {
    source
        .lines()
        .enumerate()
        .map(|(index, text)| Line {
            number: index + 1,
            text: expand_tabs(text).trim_end().to_string(),
        })
        .collect()
}

fn join_lines(lines: &[Line]) -> String {
    lines.iter().map(|line| line.text.as_str()).collect::<Vec<_>>().join("\n")
}

fn shift(lines: &[Line], columns: usize) -> Vec<Line> {
    lines.iter().map(|line| line.tail(columns.min(line.indent()))).collect()
}

fn dedent(lines: &[Line]) -> Vec<Line> {
    let indent = lines
        .iter()
        .filter(|line| !line.is_blank())
        .map(Line::indent)
        .min()
        .unwrap_or(0);
    shift(lines, indent)
}

fn trim_blank_end(lines: &[Line]) -> &[Line] {
    let end = lines.iter().rposition(|line| !line.is_blank()).map_or(0, |last| last + 1);
    &lines[..end]
}

/// First line at or after `from` that is neither blank nor indented.
fn indented_end(lines: &[Line], from: usize) -> usize {
    lines
        .iter()
        .skip(from)
        .position(|line| !line.is_blank() && line.indent() == 0)
        .map_or(lines.len(), |offset| from + offset)
}

fn text_block_end(lines: &[Line], from: usize) -> usize {
    lines
        .iter()
        .skip(from)
        .position(Line::is_blank)
        .map_or(lines.len(), |offset| from + offset)
}

fn skip_blank(lines: &[Line], from: usize) -> usize {
    lines
        .iter()
        .skip(from)
        .position(|line| !line.is_blank())
        .map_or(lines.len(), |offset| from + offset)
}

fn ends_with_blank(lines: &[Line], end: usize) -> bool {
    end >= lines.len() || end == 0 || lines[end - 1].is_blank()
}

/// Marker line remainder plus the following lines dedented by their common indent.
fn first_known_indented(lines: &[Line], start: usize, offset: usize, end: usize) -> Vec<Line> {
    std::iter::once(lines[start].tail(offset))
        .chain(dedent(&lines[start + 1..end]))
        .collect()
}

/// Marker line remainder plus the following lines shifted left by the marker width.
fn known_indented(lines: &[Line], start: usize, offset: usize, end: usize) -> Vec<Line> {
    std::iter::once(lines[start].tail(offset))
        .chain(shift(&lines[start + 1..end], offset))
        .collect()
}

fn adornment(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let first = chars.next()?;
    (ADORNMENT_CHARS.contains(first) && chars.all(|c| c == first)).then_some(first)
}

fn bullet(text: &str) -> Option<(char, usize)> {
    let captures = BULLET_REGEX.captures(text)?;
    let marker = captures[1].chars().next()?;
    Some((marker, captures.get(0)?.end()))
}

fn is_explicit_start(text: &str) -> bool {
    text == ".." || text.starts_with(".. ") || text == "__" || text.starts_with("__ ")
}

fn is_body_start(text: &str) -> bool {
    BULLET_REGEX.is_match(text)
        || ENUMERATOR_REGEX.is_match(text)
        || FIELD_REGEX.is_match(text)
        || DOCTEST_REGEX.is_match(text)
        || LINE_BLOCK_REGEX.is_match(text)
        || GRID_TABLE_TOP_REGEX.is_match(text)
        || SIMPLE_TABLE_BORDER_REGEX.is_match(text)
        || is_explicit_start(text)
        || adornment(text).is_some()
}

fn starts_definition(lines: &[Line], index: usize) -> bool {
    lines
        .get(index + 1)
        .is_some_and(|next| !next.is_blank() && next.indent() > 0)
}

fn enumerated_item_follows(lines: &[Line], index: usize) -> bool {
    lines
        .get(index + 1)
        .is_none_or(|next| next.is_blank() || next.indent() > 0 || ENUMERATOR_REGEX.is_match(&next.text))
}

/// Adornment style of a section title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TitleStyle {
    overline: bool,
    adornment: char,
}

/// A reference waiting for the end of the document to be resolved.
#[derive(Debug, Clone)]
pub(super) struct Pending {
    pub name: String,
    pub line: usize,
}

pub(super) struct Parser<'s> {
    pub(super) directives: &'s DirectiveTable,
    pub(super) ignored_substitutions: &'s BTreeSet<String>,
    pub(super) reporter: Reporter,
    title_styles: Vec<TitleStyle>,
    section_level: usize,
    pub(super) custom_roles: HashSet<String>,
    pub(super) targets: HashSet<String>,
    pub(super) substitutions: HashSet<String>,
    pub(super) pending_references: Vec<Pending>,
    pub(super) pending_substitutions: Vec<Pending>,
}

/// Directive arguments, options and content after splitting the directive block.
#[derive(Debug, Default)]
struct DirectiveBlock {
    arguments: Vec<String>,
    options: Vec<(String, String)>,
    content: Vec<Line>,
}

impl DirectiveBlock {
    fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value.as_str())
    }
}

fn parse_directive_block(
    mut indented: Vec<Line>,
    spec: DirectiveSpec,
    allowed_options: Option<&[&str]>,
) -> Result<DirectiveBlock, String> {
    if indented.first().is_some_and(Line::is_blank) {
        indented.remove(0);
    }
    while indented.last().is_some_and(Line::is_blank) {
        indented.pop();
    }

    let (split, mut arg_block, mut content) =
        if !indented.is_empty() && (spec.takes_arguments() || spec.has_options) {
            let split = indented.iter().position(Line::is_blank).unwrap_or(indented.len());
            let content = indented.get(split + 1..).map(<[Line]>::to_vec).unwrap_or_default();
            (split, indented[..split].to_vec(), content)
        } else {
            (indented.len(), Vec::new(), indented.clone())
        };

    let mut options = Vec::new();
    if spec.has_options
        && let Some(first_option) = arg_block.iter().position(|line| FIELD_REGEX.is_match(&line.text))
    {
        options = parse_options(&arg_block[first_option..], allowed_options)?;
        arg_block.truncate(first_option);
    }

    if !arg_block.is_empty() && !spec.takes_arguments() {
        arg_block.extend_from_slice(&indented[split..]);
        content = std::mem::take(&mut arg_block);
    }
    while content.first().is_some_and(Line::is_blank) {
        content.remove(0);
    }

    let arguments = if spec.takes_arguments() {
        parse_arguments(&arg_block, spec)?
    } else {
        Vec::new()
    };
    Ok(DirectiveBlock {
        arguments,
        options,
        content,
    })
}

fn parse_options(lines: &[Line], allowed: Option<&[&str]>) -> Result<Vec<(String, String)>, String> {
    let mut options: Vec<(String, String)> = Vec::new();
    for line in lines {
        if let Some(captures) = FIELD_REGEX.captures(&line.text) {
            let name = captures[1].to_lowercase();
            if let Some(allowed) = allowed
                && !allowed.contains(&name.as_str())
            {
                return Err(format!("unknown option: \"{name}\""));
            }
            let value_start = captures.get(0).map_or(line.text.len(), |m| m.end());
            options.push((name, line.text[value_start..].trim().to_string()));
        } else if let Some((_, value)) = options.last_mut() {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(line.text.trim());
        }
    }
    Ok(options)
}

fn parse_arguments(arg_block: &[Line], spec: DirectiveSpec) -> Result<Vec<String>, String> {
    let text = join_lines(arg_block);
    let arguments: Vec<&str> = text.split_whitespace().collect();
    let allowed = spec.required_arguments + spec.optional_arguments;
    if arguments.len() < spec.required_arguments {
        return Err(format!(
            "{} argument(s) required, {} supplied",
            spec.required_arguments,
            arguments.len()
        ));
    }
    if arguments.len() > allowed {
        if spec.final_argument_whitespace && allowed > 0 {
            return Ok(split_arguments(&text, allowed));
        }
        return Err(format!(
            "maximum {allowed} argument(s) allowed, {} supplied",
            arguments.len()
        ));
    }
    Ok(arguments.into_iter().map(str::to_string).collect())
}

/// Split into at most `count` arguments, the last one keeping its inner whitespace.
fn split_arguments(text: &str, count: usize) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut rest = text.trim_start();
    while arguments.len() + 1 < count {
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                arguments.push(head.to_string());
                rest = tail.trim_start();
            }
            None => break,
        }
    }
    if !rest.is_empty() {
        arguments.push(rest.to_string());
    }
    arguments
}

/// Name declared by a hyperlink target, given the text after `.. _`. `None` for anonymous targets.
fn target_name(rest: &str) -> Option<String> {
    if rest.starts_with('_') {
        return None;
    }
    if let Some(quoted) = rest.strip_prefix('`') {
        let (name, _) = quoted.split_once("`:")?;
        return Some(name.to_string());
    }
    let mut previous = None;
    for (index, c) in rest.char_indices() {
        if c == ':' && previous != Some('\\') {
            let after = rest[index + 1..].chars().next();
            if after.is_none_or(char::is_whitespace) {
                return Some(rest[..index].replace("\\:", ":"));
            }
        }
        previous = Some(c);
    }
    None
}

impl<'s> Parser<'s> {
    pub(super) fn new(settings: &ParserSettings<'s>) -> Self {
        Self {
            directives: settings.directives,
            ignored_substitutions: settings.ignored_substitutions,
            reporter: Reporter::new(settings.source_path, settings.report_level),
            title_styles: Vec::new(),
            section_level: 0,
            custom_roles: HashSet::new(),
            targets: HashSet::new(),
            substitutions: HashSet::new(),
            pending_references: Vec::new(),
            pending_substitutions: Vec::new(),
        }
    }

    pub(super) fn parse_document(mut self, source: &str) -> (Document, Reporter) {
        let lines = split_lines(source);
        let children = self.parse_body(&lines, false);
        self.resolve_references();
        (Document { children }, self.reporter)
    }

    /// Parse a sequence of body elements. Section titles are only allowed at the top level.
    pub(super) fn parse_body(&mut self, lines: &[Line], nested: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut index = 0;
        while index < lines.len() {
            index = if lines[index].is_blank() {
                index + 1
            } else {
                self.body_element(lines, index, nested, &mut nodes)
            };
        }
        nodes
    }

    fn body_element(&mut self, lines: &[Line], index: usize, nested: bool, nodes: &mut Vec<Node>) -> usize {
        let text = lines[index].text.as_str();
        if lines[index].indent() > 0 {
            return self.block_quote(lines, index, nodes);
        }
        if let Some((marker, _)) = bullet(text) {
            return self.list(lines, index, ContainerKind::ListItem, "Bullet list", nodes, |text| {
                bullet(text).filter(|(c, _)| *c == marker).map(|(_, offset)| (offset, true))
            });
        }
        if ENUMERATOR_REGEX.is_match(text) && enumerated_item_follows(lines, index) {
            return self.list(lines, index, ContainerKind::ListItem, "Enumerated list", nodes, |text| {
                ENUMERATOR_REGEX.find(text).map(|m| (m.end(), true))
            });
        }
        if FIELD_REGEX.is_match(text) {
            return self.list(lines, index, ContainerKind::FieldBody, "Field list", nodes, |text| {
                FIELD_REGEX.find(text).map(|m| (m.end(), false))
            });
        }
        if DOCTEST_REGEX.is_match(text) {
            return self.doctest_block(lines, index, nodes);
        }
        if LINE_BLOCK_REGEX.is_match(text) {
            return self.line_block(lines, index, nodes);
        }
        if GRID_TABLE_TOP_REGEX.is_match(text) {
            return self.grid_table(lines, index, nodes);
        }
        if SIMPLE_TABLE_BORDER_REGEX.is_match(text) {
            return self.simple_table(lines, index, nodes);
        }
        if is_explicit_start(text) {
            return self.explicit_markup(lines, index, nodes);
        }
        if let Some(next) = self.adornment_line(lines, index, nested, nodes) {
            return next;
        }
        self.text_block(lines, index, nested, nodes)
    }

    fn unindent_warning(&mut self, lines: &[Line], end: usize, construct: &str) {
        if !ends_with_blank(lines, end) {
            self.reporter.warning(
                lines[end].number,
                format!("{construct} ends without a blank line; unexpected unindent."),
            );
        }
    }

    fn block_quote(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let end = indented_end(lines, start);
        let body = dedent(&lines[start..end]);
        let children = self.parse_body(&body, true);
        nodes.push(Node::Container(Container {
            kind: ContainerKind::BlockQuote,
            line: lines[start].number,
            children,
        }));
        self.unindent_warning(lines, end, "Block quote");
        end
    }

    /// Parse consecutive list items. `item` returns the marker width of a line that continues
    /// the list, and whether continuation lines are shifted by exactly that width.
    fn list<F>(
        &mut self,
        lines: &[Line],
        start: usize,
        kind: ContainerKind,
        construct: &str,
        nodes: &mut Vec<Node>,
        item: F,
    ) -> usize
    where
        F: Fn(&str) -> Option<(usize, bool)>,
    {
        let mut index = start;
        let mut end = start + 1;
        while index < lines.len() {
            let Some((offset, known_indent)) = item(&lines[index].text) else {
                break;
            };
            end = indented_end(lines, index + 1);
            let has_text = lines[index].text.len() > offset;
            let body = if known_indent && has_text {
                known_indented(lines, index, offset, end)
            } else {
                first_known_indented(lines, index, offset, end)
            };
            let children = self.parse_body(&body, true);
            nodes.push(Node::Container(Container {
                kind: kind.clone(),
                line: lines[index].number,
                children,
            }));
            index = skip_blank(lines, end);
        }
        self.unindent_warning(lines, end, construct);
        end
    }

    fn doctest_block(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let end = text_block_end(lines, start);
        nodes.push(Node::DoctestBlock(DoctestBlock {
            text: join_lines(&lines[start..end]),
            line: lines[end - 1].number,
        }));
        end
    }

    fn line_block(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let mut end = start;
        while end < lines.len()
            && !lines[end].is_blank()
            && (LINE_BLOCK_REGEX.is_match(&lines[end].text) || lines[end].indent() > 0)
        {
            end += 1;
        }
        for line in &lines[start..end] {
            let text = line.text.trim_start();
            let content = text.strip_prefix('|').unwrap_or(text).trim();
            self.scan_inline(content, line.number);
        }
        nodes.push(Node::LineBlock {
            line: lines[start].number,
        });
        if !ends_with_blank(lines, end) {
            self.reporter
                .warning(lines[end].number, "Line block ends without a blank line.");
        }
        end
    }

    fn grid_table(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let end = text_block_end(lines, start);
        let rows = &lines[start..end];
        let width = rows[0].text.width();
        let well_formed = rows.len() >= 3
            && GRID_TABLE_BORDER_REGEX.is_match(&rows[rows.len() - 1].text)
            && rows.iter().all(|row| {
                let text = row.text.as_str();
                (text.starts_with('+') || text.starts_with('|'))
                    && (text.ends_with('+') || text.ends_with('|'))
                    && text.width() == width
            });
        if !well_formed {
            self.reporter.error(lines[start].number, "Malformed table.");
            return end;
        }
        for row in rows.iter().filter(|row| row.text.starts_with('|')) {
            for cell in row.text.split('|').map(str::trim).filter(|cell| !cell.is_empty()) {
                self.scan_inline(cell, row.number);
            }
        }
        nodes.push(Node::Table {
            line: lines[start].number,
        });
        end
    }

    fn simple_table(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let bottom = (start + 1..lines.len()).find(|&index| {
            SIMPLE_TABLE_BORDER_REGEX.is_match(&lines[index].text)
                && lines.get(index + 1).is_none_or(Line::is_blank)
        });
        let Some(bottom) = bottom else {
            self.reporter.error(lines[start].number, "Malformed table.");
            return text_block_end(lines, start);
        };
        for row in &lines[start + 1..bottom] {
            if !row.is_blank() && !SIMPLE_TABLE_BORDER_REGEX.is_match(&row.text) && adornment(&row.text).is_none() {
                self.scan_inline(&row.text, row.number);
            }
        }
        nodes.push(Node::Table {
            line: lines[start].number,
        });
        bottom + 1
    }

    fn explicit_markup(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let end = indented_end(lines, start + 1);
        let text = lines[start].text.as_str();
        let line = lines[start].number;
        if let Some(captures) = SUBSTITUTION_DEFINITION_REGEX.captures(text) {
            self.substitution_definition(&captures[1], &captures[2], line, nodes);
        } else if let Some(captures) = DIRECTIVE_REGEX.captures(text) {
            let offset = captures.get(0).map_or(text.len(), |m| m.end());
            self.directive(lines, start, end, &captures[1], offset, nodes);
        } else if let Some(captures) = FOOTNOTE_REGEX.captures(text) {
            let label = &captures[1];
            let is_footnote =
                label.starts_with('#') || label == "*" || label.chars().all(|c| c.is_ascii_digit());
            if !is_footnote {
                self.targets.insert(normalize_name(label));
            } else if let Some(name) = label.strip_prefix('#').filter(|name| !name.is_empty()) {
                self.targets.insert(normalize_name(name));
            }
            let offset = captures.get(0).map_or(text.len(), |m| m.end());
            let body = first_known_indented(lines, start, offset, end);
            let children = self.parse_body(&body, true);
            nodes.push(Node::Container(Container {
                kind: ContainerKind::Footnote,
                line,
                children,
            }));
        } else if let Some(rest) = text.strip_prefix(".. _") {
            if let Some(name) = target_name(rest) {
                self.targets.insert(normalize_name(&name));
            }
            nodes.push(Node::Target { line });
        } else if text.starts_with("__") {
            nodes.push(Node::Target { line });
        } else {
            nodes.push(Node::Comment { line });
        }

        if !ends_with_blank(lines, end) && !is_explicit_start(&lines[end].text) {
            self.reporter.warning(
                lines[end].number,
                "Explicit markup ends without a blank line; unexpected unindent.",
            );
        }
        end
    }

    fn unknown_directive(&mut self, name: &str, line: usize) {
        self.reporter.info(
            line,
            format!(
                "No directive entry for \"{name}\" in module \"docutils.parsers.rst.languages.en\". \
                 Trying \"{name}\" as canonical directive name."
            ),
        );
        self.reporter.error(line, format!("Unknown directive type \"{name}\"."));
    }

    fn substitution_definition(&mut self, name: &str, directive: &str, line: usize, nodes: &mut Vec<Node>) {
        self.substitutions.insert(normalize_name(name));
        if self.directives.directive(directive).0 == DirectiveKind::Unknown {
            self.unknown_directive(directive, line);
        }
        nodes.push(Node::SubstitutionDefinition {
            name: name.to_string(),
            line,
        });
    }

    fn directive(
        &mut self,
        lines: &[Line],
        start: usize,
        end: usize,
        name: &str,
        offset: usize,
        nodes: &mut Vec<Node>,
    ) {
        let line = lines[start].number;
        let (kind, spec) = self.directives.directive(name);
        log::trace!("[rstcheck-parser] Directive \"{name}\" at line {line} resolved to {kind:?}");
        match kind {
            DirectiveKind::Ignored => return,
            DirectiveKind::Unknown => {
                self.unknown_directive(name, line);
                return;
            }
            _ => {}
        }

        let allowed_options = matches!(kind, DirectiveKind::Code(_)).then_some(CODE_OPTIONS);
        let indented = first_known_indented(lines, start, offset, end);
        let block = match parse_directive_block(indented, spec, allowed_options) {
            Ok(block) => block,
            Err(detail) => {
                self.reporter
                    .error(line, format!("Error in \"{name}\" directive: {detail}."));
                return;
            }
        };
        if let Some(target) = block.option("name") {
            self.targets.insert(normalize_name(target));
        }

        match kind {
            DirectiveKind::Code(style) => {
                let anchor = lines[end - 1].number;
                nodes.push(Node::LiteralBlock(code_block(style, block, line, anchor)));
            }
            DirectiveKind::Body => {
                let children = self.parse_body(&block.content, true);
                nodes.push(Node::Container(Container {
                    kind: ContainerKind::Directive(name.to_lowercase()),
                    line,
                    children,
                }));
            }
            DirectiveKind::Role => {
                if let Some(role) = block.arguments.first().and_then(|argument| argument.split('(').next()) {
                    self.custom_roles.insert(role.trim().to_lowercase());
                }
                nodes.push(Node::Directive {
                    name: name.to_lowercase(),
                    line,
                });
            }
            DirectiveKind::Opaque | DirectiveKind::Ignored | DirectiveKind::Unknown => {
                nodes.push(Node::Directive {
                    name: name.to_lowercase(),
                    line,
                });
            }
        }
    }

    /// A line made only of punctuation: a transition or the overline of a section title.
    fn adornment_line(&mut self, lines: &[Line], start: usize, nested: bool, nodes: &mut Vec<Node>) -> Option<usize> {
        let overline = &lines[start];
        let marker = adornment(&overline.text)?;
        let overline_length = overline.text.chars().count();
        let short = overline_length < 4;

        let Some(title) = lines.get(start + 1).filter(|line| !line.is_blank()) else {
            if short {
                return None;
            }
            nodes.push(Node::Transition { line: overline.number });
            return Some(start + 1);
        };

        if adornment(&title.text).is_some() {
            if short {
                return None;
            }
            self.reporter
                .error(overline.number, "Invalid section title or transition marker.");
            return Some(start + 2);
        }

        let underline = lines.get(start + 2);
        let problem = match underline {
            None => Some(("Incomplete section title.", start + 2)),
            Some(underline) if adornment(&underline.text).is_none() => {
                Some(("Missing matching underline for section title overline.", start + 3))
            }
            Some(underline) if underline.text != overline.text => {
                Some(("Title overline & underline mismatch.", start + 3))
            }
            Some(_) => None,
        };
        if let Some((message, next)) = problem {
            if short {
                self.short_overline(overline.number, nested);
                return None;
            }
            self.reporter.severe(overline.number, message);
            return Some(next);
        }

        let title_text = title.text.trim();
        if title_text.width() > overline_length {
            if short {
                self.short_overline(overline.number, nested);
                return None;
            }
            self.reporter.warning(overline.number, "Title overline too short.");
        }
        let style = TitleStyle {
            overline: true,
            adornment: marker,
        };
        let underline_line = lines[start + 2].number;
        self.section(title_text, style, title.number, underline_line, nested, nodes);
        Some(start + 3)
    }

    fn short_overline(&mut self, line: usize, nested: bool) {
        if !nested {
            self.reporter.info(
                line,
                "Possible incomplete section title. \
                 Treating the overline as ordinary text because it's so short.",
            );
        }
    }

    fn text_block(&mut self, lines: &[Line], start: usize, nested: bool, nodes: &mut Vec<Node>) -> usize {
        if let Some(next) = self.underlined_title(lines, start, nested, nodes) {
            return next;
        }
        if starts_definition(lines, start) {
            return self.definition_list(lines, start, nodes);
        }
        self.paragraph(lines, start, nodes)
    }

    fn underlined_title(&mut self, lines: &[Line], start: usize, nested: bool, nodes: &mut Vec<Node>) -> Option<usize> {
        let title = &lines[start];
        let underline = lines.get(start + 1)?;
        let marker = adornment(&underline.text)?;
        let underline_length = underline.text.chars().count();
        if title.text.width() > underline_length {
            if underline_length < 4 {
                if !nested {
                    self.reporter.info(
                        underline.number,
                        "Possible title underline, too short for the title. \
                         Treating it as ordinary text because it's so short.",
                    );
                }
                return None;
            }
            self.reporter.warning(underline.number, "Title underline too short.");
        }
        let style = TitleStyle {
            overline: false,
            adornment: marker,
        };
        self.section(&title.text, style, title.number, underline.number, nested, nodes);
        Some(start + 2)
    }

    fn section(
        &mut self,
        title: &str,
        style: TitleStyle,
        title_line: usize,
        underline_line: usize,
        nested: bool,
        nodes: &mut Vec<Node>,
    ) {
        if nested {
            self.reporter.severe(underline_line, "Unexpected section title.");
            return;
        }
        let level = match self.title_styles.iter().position(|known| *known == style) {
            Some(position) if position <= self.section_level => position + 1,
            Some(_) => {
                self.reporter.severe(title_line, "Title level inconsistent:");
                return;
            }
            None if self.title_styles.len() == self.section_level => {
                self.title_styles.push(style);
                self.title_styles.len()
            }
            None => {
                self.reporter.severe(title_line, "Title level inconsistent:");
                return;
            }
        };
        self.section_level = level;
        self.scan_inline(title, title_line);
        self.targets.insert(normalize_name(title));
        nodes.push(Node::Section(Section {
            title: title.to_string(),
            level,
            line: title_line,
        }));
    }

    fn definition_list(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let mut index = start;
        let mut end;
        loop {
            let term = &lines[index];
            if term.text.ends_with("::") {
                self.reporter.info(
                    term.number + 1,
                    "Blank line missing before literal block (after the \"::\")? \
                     Interpreted as a definition list item.",
                );
            }
            self.scan_inline(&term.text, term.number);
            end = indented_end(lines, index + 1);
            let body = dedent(&lines[index + 1..end]);
            let children = self.parse_body(&body, true);
            nodes.push(Node::Container(Container {
                kind: ContainerKind::Definition,
                line: term.number,
                children,
            }));
            let next = skip_blank(lines, end);
            if next < lines.len() && !is_body_start(&lines[next].text) && starts_definition(lines, next) {
                index = next;
            } else {
                break;
            }
        }
        self.unindent_warning(lines, end, "Definition list");
        end
    }

    fn paragraph(&mut self, lines: &[Line], start: usize, nodes: &mut Vec<Node>) -> usize {
        let end = (start + 1..lines.len())
            .find(|&index| lines[index].is_blank() || lines[index].indent() > 0)
            .unwrap_or(lines.len());
        let line = lines[start].number;
        let text = join_lines(&lines[start..end]);
        self.scan_inline(&text, line);
        let literal_next = text.ends_with("::");
        nodes.push(Node::Paragraph(Paragraph { text, line }));
        if end < lines.len() && !lines[end].is_blank() {
            self.reporter.error(lines[end].number, "Unexpected indentation.");
        }
        if literal_next {
            return self.literal_block(lines, end, nodes);
        }
        end
    }

    /// The literal block announced by a paragraph ending in `::`.
    fn literal_block(&mut self, lines: &[Line], from: usize, nodes: &mut Vec<Node>) -> usize {
        let start = skip_blank(lines, from);
        let Some(first) = lines.get(start) else {
            if let Some(last) = lines.last() {
                self.reporter
                    .warning(last.number, "Literal block expected; none found.");
            }
            return start;
        };

        if first.indent() > 0 {
            let end = indented_end(lines, start);
            let body = dedent(trim_blank_end(&lines[start..end]));
            nodes.push(Node::LiteralBlock(LiteralBlock {
                text: join_lines(&body),
                language: None,
                classes: Vec::new(),
                line: first.number,
                attributes: Vec::new(),
            }));
            self.unindent_warning(lines, end, "Literal block");
            return end;
        }

        let quote = first.text.chars().next().filter(|c| ADORNMENT_CHARS.contains(*c));
        match quote {
            Some(quote) if !is_explicit_start(&first.text) => {
                let end = (start..lines.len())
                    .find(|&index| !lines[index].text.starts_with(quote))
                    .unwrap_or(lines.len());
                nodes.push(Node::LiteralBlock(LiteralBlock {
                    text: join_lines(&lines[start..end]),
                    language: None,
                    classes: Vec::new(),
                    line: first.number,
                    attributes: Vec::new(),
                }));
                end
            }
            _ => {
                self.reporter
                    .warning(first.number, "Literal block expected; none found.");
                start
            }
        }
    }
}

/// Build the literal block a code directive produces.
fn code_block(style: CodeStyle, block: DirectiveBlock, directive_line: usize, extent_line: usize) -> LiteralBlock {
    let text = join_lines(&block.content);
    let language = block.arguments.first().cloned().unwrap_or_default();
    let class_values: Vec<String> = block
        .option("class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    match style {
        CodeStyle::Literal => LiteralBlock {
            text,
            language: Some(language),
            classes: std::iter::once("code-block".to_string()).chain(class_values).collect(),
            line: extent_line,
            attributes: vec!["classes", "language"],
        },
        CodeStyle::Extension => {
            let mut attributes = vec!["xml:space", "force", "language", "highlight_args"];
            if block.option("linenos").is_some() || block.option("lineno-start").is_some() {
                attributes.push("linenos");
            }
            if block.option("name").is_some() {
                attributes.push("names");
            }
            if !class_values.is_empty() {
                attributes.push("classes");
            }
            LiteralBlock {
                text,
                language: Some(language),
                classes: class_values,
                line: directive_line,
                attributes,
            }
        }
        CodeStyle::Classes => {
            let mut classes = vec!["code".to_string()];
            if !language.is_empty() {
                classes.push(language);
            }
            classes.extend(class_values);
            LiteralBlock {
                text,
                language: None,
                classes,
                line: extent_line,
                attributes: vec!["classes"],
            }
        }
    }
}
