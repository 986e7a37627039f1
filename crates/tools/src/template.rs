//! `$name` / `${name}` page templates.
//!
//! Placeholder names are ASCII identifiers (`[_A-Za-z][_A-Za-z0-9]*`) and
//! `$$` is a literal dollar sign.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A well-formed placeholder with no value.
    Unknown { name: String, offset: usize },
    /// `$` not followed by `$`, an identifier or a closed `${...}`.
    Malformed { offset: usize },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Unknown { name, offset } => {
                write!(f, "no value for placeholder ${name} at byte {offset}")
            }
            TemplateError::Malformed { offset } => {
                write!(f, "malformed placeholder at byte {offset}")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Dollar,
    Var { name: &'a str, raw: &'a str, offset: usize },
    Invalid { raw: &'a str, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fills every placeholder; unknown names and malformed `$` are errors.
    pub fn substitute(&self, vars: &BTreeMap<&str, &str>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for piece in pieces(&self.source) {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Dollar => out.push('$'),
                Piece::Var { name, offset, .. } => match vars.get(name) {
                    Some(v) => out.push_str(v),
                    None => {
                        return Err(TemplateError::Unknown {
                            name: name.to_string(),
                            offset,
                        });
                    }
                },
                Piece::Invalid { offset, .. } => return Err(TemplateError::Malformed { offset }),
            }
        }
        Ok(out)
    }

    /// Like [`Template::substitute`] but leaves unknown or malformed
    /// placeholders in the output as written.
    pub fn safe_substitute(&self, vars: &BTreeMap<&str, &str>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for piece in pieces(&self.source) {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Dollar => out.push('$'),
                Piece::Var { name, raw, .. } => out.push_str(vars.get(name).copied().unwrap_or(raw)),
                Piece::Invalid { raw, .. } => out.push_str(raw),
            }
        }
        out
    }
}

fn ident_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

fn pieces(src: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = src;
    let mut base = 0;

    while let Some(pos) = rest.find('$') {
        if pos > 0 {
            out.push(Piece::Text(&rest[..pos]));
        }
        let offset = base + pos;
        let after = &rest[pos + 1..];

        let consumed = if after.starts_with('$') {
            out.push(Piece::Dollar);
            2
        } else if let Some(inner) = after.strip_prefix('{') {
            let n = ident_len(inner);
            if n > 0 && inner[n..].starts_with('}') {
                out.push(Piece::Var {
                    name: &inner[..n],
                    raw: &rest[pos..pos + n + 3],
                    offset,
                });
                n + 3
            } else {
                out.push(Piece::Invalid {
                    raw: &rest[pos..pos + 1],
                    offset,
                });
                1
            }
        } else {
            let n = ident_len(after);
            if n > 0 {
                out.push(Piece::Var {
                    name: &after[..n],
                    raw: &rest[pos..pos + n + 1],
                    offset,
                });
                n + 1
            } else {
                out.push(Piece::Invalid {
                    raw: &rest[pos..pos + 1],
                    offset,
                });
                1
            }
        };

        rest = &rest[pos + consumed..];
        base = offset + consumed;
    }
    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }
    out
}
