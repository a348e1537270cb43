//! Dialect refinement for the winning language.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::Language;

static JSX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(return|=>|=)\s*\(?\s*<[A-Za-z][\w.]*(\s+[\w-]+=|\s*/?>)").unwrap());
static ES_MODULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(import\s+.*\bfrom\s+['"]|import\s+['"]|export\s+(default|const|function|class|let|\{))"#)
        .unwrap()
});
static COMMONJS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\brequire\s*\(\s*['"]|\bmodule\.exports\b|\bexports\.\w+\s*="#).unwrap());

static PYTHON2: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*print\s+[^\s(=]|\bxrange\s*\(|\braw_input\s*\(|except\s+\w+\s*,\s*\w+\s*:|\.has_key\s*\(|\bunicode\s*\("#)
        .unwrap()
});
static PYTHON3: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bprint\s*\(|\bf["'][^"']*\{|\basync\s+def\b|\)\s*->\s*\w+|\bnonlocal\b|:=|\w+\s*:\s*(int|str|float|bool|list|dict)\b"#)
        .unwrap()
});

static CPP20: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bconcept\s+\w+|\bco_(await|return|yield)\b|\bstd::span\b|<=>|\brequires\s|\bstd::ranges::").unwrap()
});
static CPP17: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bstd::(optional|variant|string_view|any|filesystem)\b|\bif\s+constexpr\b|\bauto\s*&?\s*\[\w+\s*,")
        .unwrap()
});
static CPP11: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bauto\s|\bnullptr\b|\bstd::(unique_ptr|shared_ptr|move|thread)\b|\[[&=]?\]\s*\(|\bconstexpr\b|\boverride\b")
        .unwrap()
});

static JAVA17: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brecord\s+\w+\s*\(|\bsealed\s+(class|interface)\b|\bvar\s+\w+\s*=|case\s+[^:]+->|""""#).unwrap()
});
static JAVA8: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"->|\w::\w|\.stream\s*\(\s*\)|\bOptional<|@FunctionalInterface").unwrap());

/// Dialect label for `language`, if any marker is present.
pub fn detect_dialect(language: Language, source: &str) -> Option<String> {
    let dialect = match language {
        Language::JavaScript => {
            if JSX.is_match(source) {
                "jsx"
            } else if ES_MODULE.is_match(source) {
                "esm"
            } else if COMMONJS.is_match(source) {
                "commonjs"
            } else {
                return None;
            }
        }
        Language::TypeScript => {
            if JSX.is_match(source) {
                "tsx"
            } else {
                return None;
            }
        }
        Language::Python => {
            if PYTHON2.is_match(source) {
                "python2"
            } else if PYTHON3.is_match(source) {
                "python3"
            } else {
                return None;
            }
        }
        Language::Cpp => {
            if CPP20.is_match(source) {
                "cpp20"
            } else if CPP17.is_match(source) {
                "cpp17"
            } else if CPP11.is_match(source) {
                "cpp11"
            } else {
                return None;
            }
        }
        Language::Java => {
            if JAVA17.is_match(source) {
                "java17"
            } else if JAVA8.is_match(source) {
                "java8"
            } else {
                return None;
            }
        }
        _ => return None,
    };
    Some(dialect.to_string())
}
