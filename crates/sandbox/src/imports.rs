//! Source validation: import allow/deny lists (§4.4 "Source validation").
//!
//! The allow-list wins ties — a path must be explicitly allowed and not
//! explicitly blocked — but since the two lists are disjoint by
//! construction here, that only matters if a caller edits them by hand.

use nebula_error::SandboxError;

/// Import paths a component source is permitted to reference.
pub const ALLOWED: &[&str] = &[
    "strings", "strconv", "unicode",
    "encoding/json",
    "time",
    "math", "math/rand",
    "sync", "sync/atomic",
    "io", "bufio", "bytes",
    "net/http",
    "text/template", "html/template",
];

/// Import paths a component source is never permitted to reference,
/// regardless of [`ALLOWED`].
pub const BLOCKED: &[&str] = &[
    "os/exec",
    "syscall", "golang.org/x/sys/unix",
    "unsafe",
    "reflect",
    "os", "io/ioutil", "path/filepath",
    "net", "net/rpc",
    "runtime/debug", "runtime/pprof",
];

/// Enumerate `source`'s import paths and reject it if any path is missing
/// from [`ALLOWED`] or present in [`BLOCKED`].
///
/// Import enumeration here is line-oriented rather than a full parse: each
/// line matching `import "path"` or a line inside an `import (...)` block
/// contributes one path. That's enough to enumerate imports without
/// pulling in a full parser for a sandboxed scripting surface.
pub fn validate_source(source: &str) -> Result<(), SandboxError> {
    for path in enumerate_imports(source) {
        if BLOCKED.contains(&path.as_str()) {
            return Err(SandboxError::DisallowedImport { path });
        }
        if !ALLOWED.contains(&path.as_str()) {
            return Err(SandboxError::DisallowedImport { path });
        }
    }
    Ok(())
}

fn enumerate_imports(source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut in_block = false;
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("import (") {
            in_block = true;
            if let Some(path) = extract_quoted(rest) {
                imports.push(path);
            }
            continue;
        }
        if in_block {
            if trimmed == ")" {
                in_block = false;
                continue;
            }
            if let Some(path) = extract_quoted(trimmed) {
                imports.push(path);
            }
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("import ") {
            if let Some(path) = extract_quoted(rest) {
                imports.push(path);
            }
        }
    }
    imports
}

fn extract_quoted(s: &str) -> Option<String> {
    let start = s.find('"')?;
    let rest = &s[start + 1..];
    let end = rest.find('"')?;
    Some(rest[..end].to_owned())
}
