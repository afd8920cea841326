//! Outline parser for SDK client modules.
//!
//! Only the structure the classifier needs is recovered: top-level classes,
//! the methods defined directly in their bodies, each method's parameter
//! list and docstring. Nested functions, decorators and statements are
//! skipped.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+([A-Za-z_]\w*)\s*[(:]").expect("static regex"));
static DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").expect("static regex"));

/// A method defined directly on a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOutline {
    pub name: String,
    /// Parameter names, with `*`/`**` kept on variadic captures
    pub params: Vec<String>,
    pub doc: Option<String>,
}

impl MethodOutline {
    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }

    /// True when anything beyond `self`/`cls`/variadics is accepted
    pub fn takes_payload(&self) -> bool {
        self.params
            .iter()
            .any(|p| p != "self" && p != "cls" && !p.starts_with('*'))
    }
}

/// A top-level class and its methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOutline {
    pub name: String,
    pub methods: Vec<MethodOutline>,
}

/// Parse a module's source into class outlines
pub fn parse_module(source: &str) -> Result<Vec<ClassOutline>> {
    let lines: Vec<&str> = source.lines().collect();
    let mut classes = Vec::new();
    let mut current: Option<ClassOutline> = None;
    let mut body_indent: Option<usize> = None;
    // Open brackets of a class header split over several lines
    let mut header_depth = 0i32;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }
        let indent = line.len() - trimmed.len();

        if header_depth > 0 {
            header_depth += bracket_delta(trimmed);
            i += 1;
            continue;
        }

        if let Some(quote) = block_string_quote(trimmed) {
            i = skip_block_string(&lines, i, quote)?;
            continue;
        }

        if indent == 0 {
            if let Some(class) = current.take() {
                classes.push(class);
            }
            body_indent = None;
            if let Some(caps) = CLASS_RE.captures(trimmed) {
                current = Some(ClassOutline {
                    name: caps[1].to_string(),
                    methods: Vec::new(),
                });
                header_depth = bracket_delta(trimmed);
            }
            i += 1;
            continue;
        }

        if let Some(class) = current.as_mut() {
            let body = *body_indent.get_or_insert(indent);
            if indent == body {
                if let Some(caps) = DEF_RE.captures(trimmed) {
                    let name = caps[1].to_string();
                    let (params, header_end) = read_params(&lines, i, &name)?;
                    let (doc, next) = read_docstring(&lines, header_end + 1)?;
                    class.methods.push(MethodOutline { name, params, doc });
                    i = next;
                    continue;
                }
            }
        }

        i += 1;
    }

    if let Some(class) = current {
        classes.push(class);
    }
    Ok(classes)
}

/// Opened minus closed brackets on a line, ignoring a trailing comment
fn bracket_delta(trimmed: &str) -> i32 {
    let code = trimmed.split('#').next().unwrap_or("");
    code.chars()
        .map(|c| match c {
            '(' | '[' => 1,
            ')' | ']' => -1,
            _ => 0,
        })
        .sum()
}

/// Triple quote opening a string literal at the start of `trimmed`
fn block_string_quote(trimmed: &str) -> Option<&'static str> {
    let unprefixed = trimmed.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
    if trimmed.len() - unprefixed.len() > 2 {
        return None;
    }
    if unprefixed.starts_with("\"\"\"") {
        Some("\"\"\"")
    } else if unprefixed.starts_with("'''") {
        Some("'''")
    } else {
        None
    }
}

/// Index of the line after the string literal opened on line `start`
fn skip_block_string(lines: &[&str], start: usize, quote: &str) -> Result<usize> {
    let (_, end) = collect_block_string(lines, start, quote)?;
    Ok(end)
}

/// Text of the triple-quoted literal opened on line `start`, and the index after it
fn collect_block_string(lines: &[&str], start: usize, quote: &str) -> Result<(String, usize)> {
    let first = lines[start].trim();
    let open = first.find(quote).unwrap_or(0) + quote.len();
    let rest = &first[open..];

    if let Some(close) = rest.find(quote) {
        return Ok((rest[..close].trim().to_string(), start + 1));
    }

    let mut text = vec![rest.trim()];
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if let Some(close) = line.find(quote) {
            text.push(line[..close].trim());
            let joined = text
                .into_iter()
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Ok((joined, start + offset + 2));
        }
        text.push(line.trim());
    }

    bail!("unterminated string literal starting at line {}", start + 1)
}

/// Parameter names of the `def` on line `start`, and the line its list closes on
fn read_params(lines: &[&str], start: usize, name: &str) -> Result<(Vec<String>, usize)> {
    let first = lines[start];
    let open = match first.find('(') {
        Some(pos) => pos + 1,
        None => bail!("missing parameter list for def {} at line {}", name, start + 1),
    };

    let mut raw = String::new();
    let mut depth = 1usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (offset, line) in lines[start..].iter().enumerate() {
        let text = if offset == 0 { &line[open..] } else { &line[..] };
        for c in text.chars() {
            if let Some(q) = in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    in_string = None;
                }
                raw.push(c);
                continue;
            }
            match c {
                '\'' | '"' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((split_params(&raw), start + offset));
                    }
                }
                _ => {}
            }
            raw.push(c);
        }
        raw.push(' ');
    }

    bail!("unterminated parameter list for def {} at line {}", name, start + 1)
}

/// Split a raw parameter list on top-level commas, keeping only names
fn split_params(raw: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut current = String::new();

    for c in raw.chars() {
        if let Some(q) = in_string {
            if c == q {
                in_string = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '\'' | '"' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                params.extend(param_name(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    params.extend(param_name(&current));
    params
}

/// `name: Type = default` -> `name`; bare `*` and `/` markers -> nothing
fn param_name(param: &str) -> Option<String> {
    let name = param
        .split([':', '='])
        .next()
        .unwrap_or("")
        .trim();
    match name {
        "" | "*" | "/" => None,
        _ => Some(name.to_string()),
    }
}

/// Docstring starting at the first non-empty line at or after `start`
fn read_docstring(lines: &[&str], start: usize) -> Result<(Option<String>, usize)> {
    let Some(offset) = lines[start.min(lines.len())..]
        .iter()
        .position(|l| !l.trim().is_empty())
    else {
        return Ok((None, start));
    };
    let at = start + offset;
    match block_string_quote(lines[at].trim_start()) {
        Some(quote) => {
            let (doc, next) = collect_block_string(lines, at, quote)?;
            Ok((Some(doc), next))
        }
        None => Ok((None, start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_SOURCE: &str = r#"
# coding: utf-8
"""Module docstring
def not_a_method(self):
"""
from oci.base_client import BaseClient


class VirtualNetworkClient(object):
    """
    Use the Core Services API to manage your VCNs.
    """

    def __init__(self, config, **kwargs):
        self.base_client = BaseClient("virtual_network", config)

    def create_vcn(self, create_vcn_details, **kwargs):
        """
        Creates a new virtual cloud network (VCN).
        """
        def inner(x):
            return x
        return self.base_client.call_api(create_vcn_details)

    @staticmethod
    def list_vcns(
        self,
        compartment_id: str,
        limit: int = 10,
        page=None,
        *args,
        **kwargs
    ) -> "Response":
        """Lists the virtual cloud networks (VCNs) in the specified compartment."""
        pass

    def get_config(self, *, key="a,b"):
        return key


def helper():
    pass


class Unrelated:
    def run(cls):
        pass
"#;

    #[test]
    fn test_parse_classes_and_methods() {
        let classes = parse_module(CLIENT_SOURCE).unwrap();
        assert_eq!(classes.len(), 2);
        let vcn = &classes[0];
        assert_eq!(vcn.name, "VirtualNetworkClient");
        let names: Vec<&str> = vcn.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "create_vcn", "list_vcns", "get_config"]);
        assert_eq!(classes[1].name, "Unrelated");
    }

    #[test]
    fn test_params_and_docs() {
        let classes = parse_module(CLIENT_SOURCE).unwrap();
        let methods = &classes[0].methods;

        assert_eq!(methods[1].params, vec!["self", "create_vcn_details", "**kwargs"]);
        assert_eq!(
            methods[1].doc.as_deref(),
            Some("Creates a new virtual cloud network (VCN).")
        );

        assert_eq!(
            methods[2].params,
            vec!["self", "compartment_id", "limit", "page", "*args", "**kwargs"]
        );
        assert_eq!(
            methods[2].doc.as_deref(),
            Some("Lists the virtual cloud networks (VCNs) in the specified compartment.")
        );

        assert_eq!(methods[3].params, vec!["self", "key"]);
        assert_eq!(methods[3].doc, None);
    }

    #[test]
    fn test_takes_payload() {
        let method = |params: &[&str]| MethodOutline {
            name: "m".into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            doc: None,
        };
        assert!(!method(&["self", "**kwargs"]).takes_payload());
        assert!(!method(&["cls", "*args"]).takes_payload());
        assert!(method(&["self", "vcn_id", "**kwargs"]).takes_payload());
    }

    #[test]
    fn test_multi_line_class_header() {
        let source = "class FooClient(\n        BaseClient,\n        Mixin):  # service\n    def get_foo(self, foo_id):\n        pass\n";
        let classes = parse_module(source).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "FooClient");
        let names: Vec<&str> = classes[0].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["get_foo"]);

        let source = "class Marker: pass\nclass BarClient:\n    def list_bars(self):\n        pass\n";
        let classes = parse_module(source).unwrap();
        assert_eq!(classes[1].name, "BarClient");
        assert_eq!(classes[1].methods.len(), 1);
    }

    #[test]
    fn test_unterminated_param_list_is_an_error() {
        let source = "class BrokenClient:\n    def get_thing(self, a,\n";
        let err = parse_module(source).unwrap_err();
        assert!(err.to_string().contains("get_thing"));
    }

    #[test]
    fn test_unterminated_docstring_is_an_error() {
        let source = "class BrokenClient:\n    def get_thing(self):\n        \"\"\"never closed\n";
        assert!(parse_module(source).is_err());
    }
}
