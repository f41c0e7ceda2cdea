//! Docstring handling for tool descriptions.
//!
//! Tool docs follow the Google layout: free text first, then sections such as
//! `Args:` whose indented entries read `name (type): text`.

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(Args|Arguments|Parameters|Params|Keyword Args|Returns|Return|Yields|Raises|Example|Examples|Note|Notes):\s*$",
    )
    .expect("section header pattern is valid")
});

static ARG_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*{0,2}[A-Za-z_][A-Za-z0-9_]*)\s*(?:\(([^)]*)\))?\s*:\s*(.*)$")
        .expect("argument entry pattern is valid")
});

/// Pieces of a parsed docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocstring {
    /// Summary line plus extended description, without any section.
    pub description: String,
    /// `(name, description)` pairs from the `Args:` section, in order.
    pub params: Vec<(String, String)>,
}

impl ParsedDocstring {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_str())
    }
}

/// Dedent a docstring: the first line is stripped, the common indentation of the
/// remaining lines is removed, and leading/trailing blank lines are dropped.
pub fn clean_doc(doc: &str) -> String {
    let expanded = doc.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.trim().is_empty() {
                line.trim_start()
            } else {
                &line[margin.min(indent_of(line))..]
            }
        })
        .map(str::trim_end)
        .collect();

    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Description,
    Args,
    Other,
}

/// Parse a docstring into its description and per-argument docs.
///
/// Fails with a message when an `Args:` entry does not have the `name: text` shape.
pub fn parse_docstring(doc: &str) -> Result<ParsedDocstring, String> {
    let cleaned = clean_doc(doc);
    let mut description: Vec<&str> = Vec::new();
    let mut params: Vec<(String, String)> = Vec::new();
    let mut section = Section::Description;
    let mut entry_indent: Option<usize> = None;

    for line in cleaned.lines() {
        let trimmed = line.trim();
        let indent = indent_of(line);

        if indent == 0 {
            if let Some(caps) = SECTION_HEADER.captures(trimmed) {
                section = match &caps[1] {
                    "Args" | "Arguments" | "Parameters" | "Params" | "Keyword Args" => {
                        Section::Args
                    }
                    _ => Section::Other,
                };
                entry_indent = None;
                continue;
            }
            if section != Section::Description && !trimmed.is_empty() {
                // Unindented text closes the section.
                section = Section::Description;
            }
        }

        match section {
            Section::Description => description.push(line),
            Section::Other => {}
            Section::Args => {
                if trimmed.is_empty() {
                    continue;
                }
                let base = *entry_indent.get_or_insert(indent);
                if indent > base {
                    match params.last_mut() {
                        Some((_, text)) => {
                            if !text.is_empty() {
                                text.push(' ');
                            }
                            text.push_str(trimmed);
                        }
                        None => return Err(format!("malformed `Args` entry: `{}`", trimmed)),
                    }
                    continue;
                }
                let caps = ARG_ENTRY
                    .captures(trimmed)
                    .ok_or_else(|| format!("malformed `Args` entry: `{}`", trimmed))?;
                params.push((caps[1].to_string(), caps[3].trim().to_string()));
            }
        }
    }

    Ok(ParsedDocstring {
        description: description.join("\n").trim().to_string(),
        params,
    })
}
