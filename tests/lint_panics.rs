//! Lint: no panicking shortcuts in library code.
//!
//! Every operation reports failure through `GameResult`, and corrupt storage
//! falls back to defaults. `.unwrap()`, `.expect(..)`, `panic!` and
//! `unreachable!` are only allowed inside `#[cfg(test)]` modules.
//!
//! This test scans every `.rs` file under `src/` and flags such calls that
//! appear before the file's first `#[cfg(test)]` attribute.

use std::fs;
use std::path::Path;

const FORBIDDEN: &[&str] = &[".unwrap()", ".expect(", "panic!(", "unreachable!("];

/// Scan source up to its test module for forbidden calls.
fn find_panics(source: &str) -> Vec<(usize, String)> {
    let mut violations = Vec::new();

    let lines: Vec<&str> = source.lines().collect();
    for (line_num_0, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        // A gated one-line declaration (`#[cfg(test)] mod x;`) is not a test body.
        if trimmed.starts_with("#[cfg(test)]") {
            let gated_decl = lines
                .get(line_num_0 + 1)
                .is_some_and(|next| next.trim_end().ends_with(';'));
            if gated_decl {
                continue;
            }
            break;
        }
        // Skip comments
        if trimmed.starts_with("//") {
            continue;
        }

        if FORBIDDEN.iter().any(|p| line.contains(p)) {
            violations.push((line_num_0 + 1, trimmed.to_string()));
        }
    }

    violations
}

#[test]
fn no_panicking_calls_outside_tests() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut all_violations = Vec::new();

    visit_source_files(&src_dir, &mut all_violations);

    if !all_violations.is_empty() {
        let mut msg = String::from(
            "Found panicking calls in library code.\n\
             Propagate a GameError with `?` or fall back to a default instead.\n\n",
        );
        for (file, line_num, line) in &all_violations {
            msg.push_str(&format!("  {}:{}: {}\n", file, line_num, line));
        }
        panic!("{}", msg);
    }
}

fn visit_source_files(dir: &Path, violations: &mut Vec<(String, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit_source_files(&path, violations);
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            let Ok(source) = fs::read_to_string(&path) else {
                continue;
            };
            let display_path = path.display().to_string();
            for (line_num, line) in find_panics(&source) {
                violations.push((display_path.clone(), line_num, line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unwrap() {
        let source = "let x = store.read_raw(key).unwrap();";
        assert_eq!(find_panics(source).len(), 1);
    }

    #[test]
    fn allows_unwrap_or_variants() {
        let source = "let x = map.get(k).copied().unwrap_or(0);\nlet y = v.unwrap_or_default();";
        assert!(find_panics(source).is_empty());
    }

    #[test]
    fn ignores_test_module() {
        let source = "fn f() {}\n#[cfg(test)]\nmod tests {\n    fn g() { x.unwrap(); }\n}";
        assert!(find_panics(source).is_empty());
    }

    #[test]
    fn keeps_scanning_past_gated_declaration() {
        let source = "#[cfg(test)]\nmod failing;\nfn f() { x.unwrap(); }";
        assert_eq!(find_panics(source).len(), 1);
    }

    #[test]
    fn ignores_comments() {
        let source = "// value.expect(\"never\")";
        assert!(find_panics(source).is_empty());
    }

    #[test]
    fn reports_line_numbers() {
        let source = "fn a() {}\nfn b() { panic!(\"no\") }";
        assert_eq!(find_panics(source), vec![(2, "fn b() { panic!(\"no\") }".to_string())]);
    }
}
