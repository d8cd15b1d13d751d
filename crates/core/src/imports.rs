//! Import tracking for generated Go code.
//!
//! Every type string and call reference the generator emits passes through
//! [`ImportTracker::register`], which parses it into a [`TypeRef`] and
//! remembers the package path it needs. The tracker renders the file's
//! `import` declaration once generation is finished.

use std::collections::BTreeSet;

/// Short package names whose import path is not the name itself, plus the
/// common one-segment packages so lookups stay explicit.
pub const STDLIB_PACKAGES: &[(&str, &str)] = &[
    ("atomic", "sync/atomic"),
    ("base64", "encoding/base64"),
    ("big", "math/big"),
    ("bufio", "bufio"),
    ("bytes", "bytes"),
    ("context", "context"),
    ("csv", "encoding/csv"),
    ("errors", "errors"),
    ("exec", "os/exec"),
    ("filepath", "path/filepath"),
    ("fmt", "fmt"),
    ("hex", "encoding/hex"),
    ("http", "net/http"),
    ("io", "io"),
    ("json", "encoding/json"),
    ("log", "log"),
    ("math", "math"),
    ("md5", "crypto/md5"),
    ("os", "os"),
    ("rand", "math/rand"),
    ("regexp", "regexp"),
    ("sha256", "crypto/sha256"),
    ("signal", "os/signal"),
    ("sort", "sort"),
    ("strconv", "strconv"),
    ("strings", "strings"),
    ("sync", "sync"),
    ("template", "text/template"),
    ("time", "time"),
    ("url", "net/url"),
    ("utf8", "unicode/utf8"),
    ("xml", "encoding/xml"),
];

/// Go's predeclared functions; callable without any import.
pub const GO_BUILTINS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

pub fn stdlib_path(short: &str) -> Option<&'static str> {
    STDLIB_PACKAGES
        .iter()
        .find(|(name, _)| *name == short)
        .map(|(_, path)| *path)
}

pub fn is_builtin(name: &str) -> bool {
    GO_BUILTINS.contains(&name)
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// A parsed type string or call reference.
///
/// `*github.com/acme/models.User` parses to prefix `*`, package path
/// `github.com/acme/models`, package name `models` and bare type `User`,
/// and renders back as `*models.User`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Pointer, slice, array, variadic, channel and map-key decorations,
    /// verbatim.
    pub prefix: String,
    pub package_path: Option<String>,
    pub package_name: Option<String>,
    pub bare_type: String,
}

impl TypeRef {
    pub fn parse(text: &str) -> Result<TypeRef, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty type reference".to_string());
        }
        let (prefix, rest) = split_decorations(text)?;

        if rest.starts_with("func(")
            || rest.starts_with("interface{")
            || rest.starts_with("struct{")
        {
            return Ok(TypeRef {
                prefix: prefix.to_string(),
                package_path: None,
                package_name: None,
                bare_type: rest.to_string(),
            });
        }

        let (dir, tail) = match rest.rfind('/') {
            Some(i) => (&rest[..=i], &rest[i + 1..]),
            None => ("", rest),
        };

        match tail.split_once('.') {
            None if dir.is_empty() => Ok(TypeRef {
                prefix: prefix.to_string(),
                package_path: None,
                package_name: None,
                bare_type: tail.to_string(),
            }),
            None => Err(format!("'{}' names a package path but no symbol", rest)),
            Some((package, symbol)) => {
                if !is_ident(package) || symbol.is_empty() || symbol.contains('.') {
                    return Err("expected format 'package.Symbol'".to_string());
                }
                let path = if dir.is_empty() {
                    stdlib_path(package).unwrap_or(package).to_string()
                } else {
                    format!("{}{}", dir, package)
                };
                Ok(TypeRef {
                    prefix: prefix.to_string(),
                    package_path: Some(path),
                    package_name: Some(package.to_string()),
                    bare_type: symbol.to_string(),
                })
            }
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.package_path.is_some()
    }

    /// The spelling to use in generated code.
    pub fn render(&self) -> String {
        match &self.package_name {
            Some(package) => format!("{}{}.{}", self.prefix, package, self.bare_type),
            None => format!("{}{}", self.prefix, self.bare_type),
        }
    }
}

/// Split leading type decorations from the named type they wrap.
fn split_decorations(text: &str) -> Result<(&str, &str), String> {
    let mut rest = text;
    loop {
        if let Some(r) = rest.strip_prefix('*') {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("...") {
            rest = r;
        } else if let Some(r) = rest
            .strip_prefix("<-chan ")
            .or_else(|| rest.strip_prefix("chan<- "))
            .or_else(|| rest.strip_prefix("chan "))
        {
            rest = r;
        } else if rest.starts_with('[') || rest.starts_with("map[") {
            let open = rest.find('[').unwrap_or(0);
            let close = matching_bracket(rest, open)
                .ok_or_else(|| format!("unbalanced brackets in type '{}'", text))?;
            rest = &rest[close + 1..];
        } else {
            break;
        }
        rest = rest.trim_start();
    }
    if rest.is_empty() {
        return Err(format!("type '{}' has no element type", text));
    }
    Ok((&text[..text.len() - rest.len()], rest))
}

fn matching_bracket(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// The set of package paths a generated file imports.
#[derive(Debug, Clone, Default)]
pub struct ImportTracker {
    paths: BTreeSet<String>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a full import path, as declared in a graph's `imports` list.
    pub fn add_path(&mut self, path: &str) {
        let path = path.trim().trim_matches('"');
        if !path.is_empty() {
            self.paths.insert(path.to_string());
        }
    }

    /// Parse `reference` and record the package it lives in, if any.
    pub fn register(&mut self, reference: &str) -> Result<TypeRef, String> {
        let parsed = TypeRef::parse(reference)?;
        if let Some(path) = &parsed.package_path {
            self.paths.insert(path.clone());
        }
        Ok(parsed)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Render the `import` declaration: nothing, one line, or a group.
    pub fn render(&self) -> String {
        let paths: Vec<&str> = self.paths().collect();
        match paths.as_slice() {
            [] => String::new(),
            [only] => format!("import \"{}\"\n", only),
            _ => {
                let mut out = String::from("import (\n");
                for path in paths {
                    out.push_str(&format!("\t\"{}\"\n", path));
                }
                out.push_str(")\n");
                out
            }
        }
    }
}
