//! Brace templates used by toolkit docstrings.
//!
//! Syntax follows the usual format-string rules: `{name}` is a placeholder, `{{` and `}}`
//! are literal braces, and a placeholder may carry a `!conversion` or `:spec` suffix that is
//! not part of its name.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    /// A doubled brace; holds the brace character it stands for
    Brace(char),
    Placeholder { raw: &'a str, field: &'a str },
}

fn tokenize(template: &str) -> Result<Vec<Segment<'_>>, String> {
    let mut segments = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                if literal_start < i {
                    segments.push(Segment::Literal(&template[literal_start..i]));
                }
                segments.push(Segment::Brace(bytes[i] as char));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                if literal_start < i {
                    segments.push(Segment::Literal(&template[literal_start..i]));
                }
                let close = template[i + 1..]
                    .find('}')
                    .map(|off| i + 1 + off)
                    .ok_or_else(|| format!("unclosed '{{' in template at byte {}", i))?;
                let raw = &template[i + 1..close];
                if raw.contains('{') {
                    return Err(format!("unexpected '{{' inside placeholder `{}`", raw));
                }
                let field = raw
                    .split(|c: char| c == '!' || c == ':')
                    .next()
                    .unwrap_or_default();
                segments.push(Segment::Placeholder { raw, field });
                i = close + 1;
                literal_start = i;
            }
            b'}' => return Err(format!("single '}}' encountered in template at byte {}", i)),
            _ => i += 1,
        }
    }
    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    Ok(segments)
}

/// Placeholder names in order of first appearance.
pub fn template_variables(template: &str) -> Result<Vec<String>, String> {
    let mut vars: Vec<String> = Vec::new();
    for segment in tokenize(template)? {
        if let Segment::Placeholder { field, .. } = segment {
            if !vars.iter().any(|v| v == field) {
                vars.push(field.to_string());
            }
        }
    }
    Ok(vars)
}

/// Raw text of every placeholder that carries a conversion or format spec, as
/// `(field, raw)` pairs in order of appearance.
pub fn suffixed_placeholders(template: &str) -> Result<Vec<(&str, &str)>, String> {
    Ok(tokenize(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder { raw, field } if raw != field => Some((field, raw)),
            _ => None,
        })
        .collect())
}

/// Double the braces of every placeholder selected by `escape`, so that a following
/// [`render`] pass emits it unchanged as `{name}`.
pub fn escape_placeholders(
    template: &str,
    escape: impl Fn(&str) -> bool,
) -> Result<String, String> {
    let mut out = String::with_capacity(template.len() + 8);
    for segment in tokenize(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Brace(c) => {
                out.push(c);
                out.push(c);
            }
            Segment::Placeholder { raw, field } => {
                if escape(field) {
                    out.push_str("{{");
                    out.push_str(raw);
                    out.push_str("}}");
                } else {
                    out.push('{');
                    out.push_str(raw);
                    out.push('}');
                }
            }
        }
    }
    Ok(out)
}

/// Substitute every placeholder through `lookup` and collapse doubled braces.
pub fn render(template: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    for segment in tokenize(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Brace(c) => out.push(c),
            Segment::Placeholder { field, .. } => match lookup(field) {
                Some(value) => out.push_str(&value),
                None => return Err(format!("no value for template variable `{}`", field)),
            },
        }
    }
    Ok(out)
}
