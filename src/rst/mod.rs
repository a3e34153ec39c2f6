//! Structural validation for reStructuredText long descriptions.
//!
//! Package indexes render RST descriptions with docutils; a description
//! that docutils rejects renders as an error page or plain text. This
//! module reimplements the checks that trip up real-world descriptions,
//! collecting diagnostics into a list instead of aborting, so the markup
//! check can report all of them at once.
//!
//! Diagnostics use the docutils message format
//! (`<string>:LINE: (SEVERITY/N) message`) so the output reads the same
//! as what the index's renderer would say.
//!
//! What is validated: section title underlines, literal block markers,
//! directive names, inline markup balance, link and footnote reference
//! resolution, and substitution references. Directive bodies and literal
//! blocks are exempt, as docutils does not treat their content as body
//! text either.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Diagnostic severity, mirroring the docutils levels that matter here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// docutils level 2
    Warning,
    /// docutils level 3
    Error,
}

impl Severity {
    /// The docutils label for this severity.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// The docutils numeric level for this severity.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Warning => 2,
            Self::Error => 3,
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<string>:{}: ({}/{}) {}",
            self.line,
            self.severity.label(),
            self.severity.level(),
            self.message
        )
    }
}

/// Directives docutils itself understands. Anything else (including
/// Sphinx-only directives like `toctree`) fails on a bare index renderer.
const KNOWN_DIRECTIVES: &[&str] = &[
    "admonition",
    "attention",
    "caution",
    "class",
    "code",
    "compound",
    "container",
    "contents",
    "csv-table",
    "danger",
    "date",
    "default-role",
    "epigraph",
    "error",
    "figure",
    "footer",
    "header",
    "highlights",
    "hint",
    "image",
    "important",
    "include",
    "line-block",
    "list-table",
    "math",
    "meta",
    "note",
    "parsed-literal",
    "pull-quote",
    "raw",
    "replace",
    "role",
    "rubric",
    "sectnum",
    "section-numbering",
    "sidebar",
    "table",
    "target-notes",
    "tip",
    "title",
    "topic",
    "unicode",
    "warning",
];

/// Validate RST source, returning every diagnostic found.
///
/// An empty vector means the source would render cleanly. Never panics
/// and never errors; malformed input only ever produces diagnostics.
#[must_use]
pub fn validate(source: &str) -> Vec<Diagnostic> {
    Validator::new(source).run()
}

struct Validator<'a> {
    lines: Vec<&'a str>,
    exempt: Vec<bool>,
    diagnostics: Vec<Diagnostic>,
    targets: HashSet<String>,
    footnotes: HashSet<String>,
    substitutions: HashSet<String>,
    references: Vec<(usize, String)>,
    footnote_refs: Vec<(usize, String)>,
    substitution_refs: Vec<(usize, String)>,
}

impl<'a> Validator<'a> {
    fn new(source: &'a str) -> Self {
        let lines: Vec<&str> = source
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        let exempt = vec![false; lines.len()];
        Self {
            lines,
            exempt,
            diagnostics: Vec::new(),
            targets: HashSet::new(),
            footnotes: HashSet::new(),
            substitutions: HashSet::new(),
            references: Vec::new(),
            footnote_refs: Vec::new(),
            substitution_refs: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Diagnostic> {
        self.mark_blocks();
        self.check_section_underlines();
        self.scan_paragraphs();
        self.resolve_references();
        self.diagnostics.sort_by_key(|d| d.line);
        self.diagnostics
    }

    fn warn(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            severity: Severity::Error,
            message: message.into(),
        });
    }

    /// First pass: walk explicit-markup constructs (directives, targets,
    /// footnotes, substitution definitions, comments) and literal blocks,
    /// registering names and exempting their bodies from later passes.
    fn mark_blocks(&mut self) {
        let mut i = 0;
        while i < self.lines.len() {
            let line = self.lines[i];
            let stripped = line.trim_start();
            if stripped.is_empty() {
                i += 1;
                continue;
            }
            let ind = indent_of(line);

            if let Some(rest) = explicit_markup_body(stripped) {
                self.classify_explicit(rest, i + 1);
                self.exempt[i] = true;
                i = self.exempt_indented(i, ind);
                continue;
            }

            if line.trim_end().ends_with("::") {
                i = self.consume_literal_block(i, ind);
                continue;
            }

            i += 1;
        }
    }

    /// Handle the body of a `.. ` construct: register what it defines and
    /// flag unknown directives.
    fn classify_explicit(&mut self, body: &str, line: usize) {
        if let Some(rest) = body.strip_prefix('|') {
            // Substitution definition: `.. |name| directive:: ...`
            if let Some((name, def)) = rest.split_once('|') {
                self.substitutions.insert(normalize_name(name));
                let def = def.trim_start();
                if let Some(directive) = directive_name(def) {
                    self.check_directive(&directive, line);
                }
            }
            return;
        }

        if let Some(rest) = body.strip_prefix('_') {
            // Hyperlink target: `.. _name: url` or `.. _\`phrase\`: url`
            let name = if let Some(quoted) = rest.strip_prefix('`') {
                quoted.split('`').next().unwrap_or("")
            } else {
                rest.split(':').next().unwrap_or("")
            };
            if !name.is_empty() {
                self.targets.insert(normalize_name(name));
            }
            return;
        }

        if let Some(rest) = body.strip_prefix('[') {
            // Footnote or citation: `.. [label] text`
            if let Some(label) = rest.split(']').next() {
                let label = label.trim_start_matches('#');
                if !label.is_empty() {
                    self.footnotes.insert(normalize_name(label));
                }
            }
            return;
        }

        if let Some(directive) = directive_name(body) {
            self.check_directive(&directive, line);
            return;
        }
        // Anything else after `.. ` is a comment.
    }

    fn check_directive(&mut self, name: &str, line: usize) {
        let lowered = name.to_ascii_lowercase();
        if !KNOWN_DIRECTIVES.contains(&lowered.as_str()) {
            self.error(line, format!("Unknown directive type \"{name}\"."));
        }
    }

    /// Exempt the indented block following line `i`, returning the index
    /// of the first line after the block.
    fn exempt_indented(&mut self, i: usize, ind: usize) -> usize {
        let mut j = i + 1;
        while j < self.lines.len() {
            let l = self.lines[j];
            if l.trim().is_empty() {
                // May be internal; only exempt if the block continues.
                if let Some(next) = self.next_nonblank(j) {
                    if indent_of(self.lines[next]) > ind {
                        self.exempt[j] = true;
                        j += 1;
                        continue;
                    }
                }
                break;
            }
            if indent_of(l) <= ind {
                break;
            }
            self.exempt[j] = true;
            j += 1;
        }
        j
    }

    /// Handle a `::` literal block marker at line `i`.
    fn consume_literal_block(&mut self, i: usize, ind: usize) -> usize {
        match self.next_nonblank(i) {
            None => {
                self.error(
                    self.lines.len(),
                    "Literal block expected; none found.".to_string(),
                );
                self.lines.len()
            }
            Some(j) if indent_of(self.lines[j]) <= ind => {
                self.error(j + 1, "Literal block expected; none found.".to_string());
                i + 1
            }
            Some(j) => {
                // Exempt the indented block.
                let mut k = j;
                while k < self.lines.len() {
                    let l = self.lines[k];
                    if l.trim().is_empty() {
                        match self.next_nonblank(k) {
                            Some(n) if indent_of(self.lines[n]) > ind => {
                                self.exempt[k] = true;
                                k += 1;
                            }
                            _ => break,
                        }
                        continue;
                    }
                    if indent_of(l) <= ind {
                        break;
                    }
                    self.exempt[k] = true;
                    k += 1;
                }
                k
            }
        }
    }

    fn next_nonblank(&self, from: usize) -> Option<usize> {
        (from + 1..self.lines.len()).find(|&j| !self.lines[j].trim().is_empty())
    }

    /// Flag section underlines shorter than their title and register
    /// section titles as implicit link targets.
    fn check_section_underlines(&mut self) {
        for i in 1..self.lines.len() {
            if self.exempt[i] || self.exempt[i - 1] {
                continue;
            }
            let cur = self.lines[i];
            let prev = self.lines[i - 1];
            if prev.trim().is_empty() || !is_adornment_line(cur) || is_adornment_line(prev) {
                continue;
            }
            if indent_of(cur) != 0 || indent_of(prev) != 0 {
                continue;
            }
            let title = prev.trim_end();
            self.targets.insert(normalize_name(title));
            if cur.trim_end().len() < title.len() {
                self.warn(i + 1, "Title underline too short.".to_string());
            }
        }
    }

    /// Group contiguous body lines into paragraphs and run the inline
    /// markup and reference scans on each.
    fn scan_paragraphs(&mut self) {
        let mut i = 0;
        while i < self.lines.len() {
            if self.exempt[i]
                || self.lines[i].trim().is_empty()
                || is_adornment_line(self.lines[i])
            {
                i += 1;
                continue;
            }
            let start = i;
            let mut text = String::new();
            while i < self.lines.len()
                && !self.exempt[i]
                && !self.lines[i].trim().is_empty()
                && !is_adornment_line(self.lines[i])
            {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(self.lines[i]);
                i += 1;
            }
            self.scan_inline(&text, start + 1);
            self.collect_word_references(&text, start + 1);
        }
    }

    /// Scan a paragraph for inline markup spans, recording unbalanced
    /// start-strings and phrase references.
    fn scan_inline(&mut self, text: &str, start_line: usize) {
        let chars: Vec<char> = text.chars().collect();
        let mut line = start_line;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match c {
                '\n' => {
                    line += 1;
                    i += 1;
                }
                '\\' => {
                    i += 2;
                }
                '*' | '`' => {
                    let len = if i + 1 < chars.len() && chars[i + 1] == c {
                        2
                    } else {
                        1
                    };
                    if !opener_ok(&chars, i, len) {
                        i += len;
                        continue;
                    }
                    match find_closer(&chars, i + len, c, len) {
                        Some(end) => {
                            if c == '`' && len == 1 {
                                let after = end + 1;
                                if after < chars.len() && chars[after] == '_' {
                                    let anonymous =
                                        after + 1 < chars.len() && chars[after + 1] == '_';
                                    if !anonymous {
                                        let inner: String = chars[i + 1..end].iter().collect();
                                        self.record_phrase_reference(&inner, line);
                                    }
                                }
                            }
                            line += chars[i..=end].iter().filter(|&&ch| ch == '\n').count();
                            i = end + len;
                        }
                        None => {
                            self.warn(
                                line,
                                format!(
                                    "Inline {} start-string without end-string.",
                                    span_kind(c, len)
                                ),
                            );
                            i += len;
                        }
                    }
                }
                '|' => {
                    if let Some(end) = find_substitution_end(&chars, i) {
                        let inner: String = chars[i + 1..end].iter().collect();
                        self.substitution_refs.push((line, normalize_name(&inner)));
                        i = end + 1;
                    } else {
                        i += 1;
                    }
                }
                '[' => {
                    if let Some((label, end)) = footnote_reference(&chars, i) {
                        // Auto-numbered and auto-symbol footnotes resolve
                        // positionally; only named labels need a target.
                        if !label.is_empty() {
                            self.footnote_refs.push((line, label));
                        }
                        i = end;
                    } else {
                        i += 1;
                    }
                }
                _ => {
                    i += 1;
                }
            }
        }
    }

    /// A phrase reference either names another target or, with an
    /// embedded URI (`\`text <uri>\`_`), defines its own.
    fn record_phrase_reference(&mut self, inner: &str, line: usize) {
        let trimmed = inner.trim();
        if trimmed.ends_with('>') {
            if let Some((name, _uri)) = trimmed.rsplit_once('<') {
                let name = name.trim();
                if !name.is_empty() {
                    self.targets.insert(normalize_name(name));
                }
                return;
            }
        }
        self.references.push((line, normalize_name(inner)));
    }

    /// Record `name_` style simple references.
    fn collect_word_references(&mut self, text: &str, start_line: usize) {
        for m in word_reference_re().find_iter(text) {
            let matched = m.as_str();
            if matched.ends_with("__") {
                continue; // anonymous
            }
            let before = text[..m.start()].chars().last();
            if let Some(b) = before {
                if b == '\\' || !(b.is_whitespace() || is_open_punct(b)) {
                    continue;
                }
            }
            let after = text[m.end()..].chars().next();
            if let Some(a) = after {
                if !(a.is_whitespace() || is_close_punct(a)) {
                    continue;
                }
            }
            let name = matched.trim_end_matches('_');
            let line = start_line + text[..m.start()].matches('\n').count();
            self.references.push((line, normalize_name(name)));
        }
    }

    fn resolve_references(&mut self) {
        let refs = std::mem::take(&mut self.references);
        for (line, name) in refs {
            if !self.targets.contains(&name) {
                self.error(line, format!("Unknown target name: \"{name}\"."));
            }
        }

        let foot_refs = std::mem::take(&mut self.footnote_refs);
        for (line, label) in foot_refs {
            if !self.footnotes.contains(&label) {
                self.error(line, format!("Unknown target name: \"{label}\"."));
            }
        }

        let sub_refs = std::mem::take(&mut self.substitution_refs);
        for (line, name) in sub_refs {
            if !self.substitutions.contains(&name) {
                self.error(line, format!("Undefined substitution referenced: \"{name}\"."));
            }
        }
    }
}

/// The text after `.. `, when a line opens an explicit markup block.
fn explicit_markup_body(stripped: &str) -> Option<&str> {
    let rest = stripped.strip_prefix("..")?;
    if rest.is_empty() {
        return Some("");
    }
    // `..x` is plain text; `.. x` and `..` open explicit markup.
    if rest.starts_with(' ') || rest.starts_with('\t') {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Extract `name` from a `name:: arguments` directive head.
fn directive_name(body: &str) -> Option<String> {
    let re = directive_re();
    re.captures(body)
        .map(|caps| caps[1].to_string())
}

fn directive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z][\w-]*)\s*::(?:\s|$)").expect("directive head regex"))
}

fn word_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9](?:[A-Za-z0-9]|[-_.:+][A-Za-z0-9])*__?").expect("word ref regex")
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// A line made of one repeated adornment character, e.g. `=====`.
fn is_adornment_line(line: &str) -> bool {
    let trimmed = line.trim_end();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_punctuation() {
        return false;
    }
    trimmed.len() >= 2 && chars.all(|c| c == first)
}

fn is_open_punct(c: char) -> bool {
    matches!(c, '\'' | '"' | '(' | '[' | '{' | '<' | '-' | '/' | ':')
}

fn is_close_punct(c: char) -> bool {
    matches!(
        c,
        ',' | '.' | ';' | ':' | '!' | '?' | '"' | '\'' | ')' | ']' | '}' | '>' | '-' | '/'
    )
}

/// Whether position `i` can start an inline span of `len` delimiter chars.
fn opener_ok(chars: &[char], i: usize, len: usize) -> bool {
    if i > 0 {
        let prev = chars[i - 1];
        if !(prev.is_whitespace() || is_open_punct(prev)) {
            return false;
        }
    }
    match chars.get(i + len) {
        Some(next) => !next.is_whitespace() && *next != chars[i],
        None => false,
    }
}

/// Find the end-string for a span opened at `from - len`.
fn find_closer(chars: &[char], from: usize, c: char, len: usize) -> Option<usize> {
    let mut j = from + 1;
    while j < chars.len() {
        if chars[j] == c
            && (len == 1 || (j + 1 < chars.len() && chars[j + 1] == c))
            && !chars[j - 1].is_whitespace()
        {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn span_kind(c: char, len: usize) -> &'static str {
    match (c, len) {
        ('*', 1) => "emphasis",
        ('*', 2) => "strong",
        ('`', 2) => "literal",
        _ => "interpreted text or phrase reference",
    }
}

/// Substitution references may not start or end with whitespace and stay
/// on one line; this rules out table borders and line blocks.
fn find_substitution_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\n' => return None,
            '|' => {
                if j == start + 1 {
                    return None;
                }
                if chars[start + 1].is_whitespace() || chars[j - 1].is_whitespace() {
                    return None;
                }
                return Some(j);
            }
            _ => j += 1,
        }
    }
    None
}

/// Parse `[label]_` starting at `start`; returns the normalized label and
/// the index just past the trailing underscore.
fn footnote_reference(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut j = start + 1;
    while j < chars.len() && chars[j] != ']' && chars[j] != '\n' {
        j += 1;
    }
    if j >= chars.len() || chars[j] != ']' {
        return None;
    }
    if chars.get(j + 1) != Some(&'_') {
        return None;
    }
    let label: String = chars[start + 1..j].iter().collect();
    let label = label.trim_start_matches(['#', '*']);
    if label.is_empty() {
        return Some((String::new(), j + 2));
    }
    Some((normalize_name(label), j + 2))
}

/// docutils-style reference name normalization: case-folded, internal
/// whitespace collapsed.
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
