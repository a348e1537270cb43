//! Code-type classification.
//!
//! Five independent hypotheses are scored from the same evidence. `test` is
//! checked first and wins outright above [`TEST_SHORT_CIRCUIT`]; otherwise
//! every hypothesis is ranked and the best one is reported only above
//! [`PRIMARY_THRESHOLD`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::execution::{execution_context, execution_intent, ExecutionContext, ExecutionIntent};
use super::library::{LibraryAnalysisResult, LibraryCategory};
use crate::adapters::{node_kinds, EntryPoint, EntryPointKind, LanguageAdapter};
use crate::core::{clamp_unit, round2, CstNode, Language, SyntaxTree};

pub const TEST_SHORT_CIRCUIT: f64 = 0.6;
pub const PRIMARY_THRESHOLD: f64 = 0.5;
pub const SECONDARY_MIN_SCORE: f64 = 0.4;
pub const SECONDARY_MIN_RATIO: f64 = 0.6;

/// Non-empty line counts separating short and long files.
const SHORT_FILE_LINES: usize = 50;

static TEST_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bdef\s+test_\w+|\bfunc\s+Test\w+|\bfn\s+test_\w+|@Test\b|\bvoid\s+test\w*\s*\(|\b(describe|it|test)\s*\(\s*['"`]"#,
    )
    .unwrap()
});
static ASSERTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bassert\w*!?\s*\(|\bexpect\s*\(|(?m)^\s*assert\s|\bt\.(Error|Errorf|Fatal|Fatalf)\s*\(")
        .unwrap()
});
static DOC_COMMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"/\*\*|(?m)^\s*///|(?m)^\s*//!|(?m)^\s*("""|''')|(?m)^//\s+[A-Z]\w*\s"#).unwrap()
});
static INIT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(init|initialize|setup|bootstrap|configure|createApp|start)\s*\(").unwrap()
});
static RUN_CALLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(listen|run|serve|mainloop)\s*\(|\bListenAndServe\s*\(|\buvicorn\.run\s*\(|\bSpringApplication\.run\b")
        .unwrap()
});
static CONFIG_KEYS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^\s*["']?((?i:port|host|hostname|url|timeout|debug|env|database|db_\w+|api_key|secret\w*|log_level)|[A-Z][A-Z0-9_]{2,})["']?\s*[:=]"#,
    )
    .unwrap()
});
static CONFIG_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bmodule\.exports\s*=\s*\{|\bexport\s+default\s+\{").unwrap()
});
static KEY_VALUE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*["']?[\w.$-]+["']?\s*[:=]\s*\S"#).unwrap());
static LITERAL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*([\]\}\)]+[,;]?|["'\d\[\{-].*)\s*$"#).unwrap());
static PYTHON_ALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__all__\s*=\s*[\[(]([^\])]*)[\])]").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([\w.]+)["']"#).unwrap());
static C_MAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(int|void)\s+main\s*\(").unwrap());
static GENERIC_MAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(public\s+static\s+void|static\s+void|func|fn|def|fun)\s+[Mm]ain\s*\(").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeType {
    Test,
    Script,
    Library,
    Application,
    Configuration,
    Unknown,
}

impl std::fmt::Display for CodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CodeType::Test => "test",
            CodeType::Script => "script",
            CodeType::Library => "library",
            CodeType::Application => "application",
            CodeType::Configuration => "configuration",
            CodeType::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTypeScore {
    pub code_type: CodeType,
    pub score: f64,
    pub indicators: Vec<String>,
}

impl CodeTypeScore {
    fn new(code_type: CodeType) -> Self {
        Self {
            code_type,
            score: 0.0,
            indicators: Vec::new(),
        }
    }

    fn add(&mut self, weight: f64, indicator: impl Into<String>) {
        self.score += weight;
        self.indicators.push(indicator.into());
    }

    fn finish(mut self) -> Self {
        self.score = round2(clamp_unit(self.score));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTypeResult {
    pub code_type: CodeType,
    pub confidence: f64,
    pub secondary: Option<CodeType>,
    pub scores: Vec<CodeTypeScore>,
    pub entry_points: Vec<EntryPoint>,
    pub exports: Vec<String>,
    pub execution_intent: Option<ExecutionIntent>,
    pub execution_context: Option<ExecutionContext>,
}

impl CodeTypeResult {
    pub fn unknown() -> Self {
        Self {
            code_type: CodeType::Unknown,
            confidence: 0.0,
            secondary: None,
            scores: Vec::new(),
            entry_points: Vec::new(),
            exports: Vec::new(),
            execution_intent: None,
            execution_context: None,
        }
    }
}

impl Default for CodeTypeResult {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Everything the hypotheses look at, gathered once.
struct Evidence<'a> {
    source: &'a str,
    non_empty_lines: usize,
    functions: usize,
    classes: usize,
    entry_points: &'a [EntryPoint],
    exports: &'a [String],
    libraries: &'a LibraryAnalysisResult,
}

impl Evidence<'_> {
    fn has_entry(&self, kind: EntryPointKind) -> bool {
        self.entry_points.iter().any(|e| e.kind == kind)
    }

    fn is_short(&self) -> bool {
        self.non_empty_lines < SHORT_FILE_LINES
    }

    fn has_runtime_framework(&self) -> bool {
        self.libraries.frameworks.iter().any(|fw| {
            matches!(fw.category, LibraryCategory::Framework | LibraryCategory::Ui)
        })
    }
}

pub fn classify_code_type(
    tree: &SyntaxTree,
    libraries: &LibraryAnalysisResult,
    adapter: Option<&dyn LanguageAdapter>,
) -> CodeTypeResult {
    let source = tree.source();
    let language = tree.language();
    let entry_points = match adapter {
        Some(adapter) => adapter.detect_entry_points(tree.root()),
        None => textual_entry_points(source, language),
    };
    let exports = extract_exports(tree);
    let (functions, classes) = count_definitions(tree);
    let evidence = Evidence {
        source,
        non_empty_lines: source.lines().filter(|l| !l.trim().is_empty()).count(),
        functions,
        classes,
        entry_points: &entry_points,
        exports: &exports,
        libraries,
    };

    let test = score_test(&evidence);
    let (code_type, confidence, secondary, scores) = if test.score > TEST_SHORT_CIRCUIT {
        (CodeType::Test, test.score, None, vec![test])
    } else {
        let mut scores = vec![
            test,
            score_script(&evidence),
            score_library(&evidence),
            score_application(&evidence),
            score_configuration(&evidence),
        ];
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        let top = scores[0].score;
        if top > PRIMARY_THRESHOLD {
            let secondary = scores
                .get(1)
                .filter(|s| s.score >= SECONDARY_MIN_SCORE && s.score >= SECONDARY_MIN_RATIO * top)
                .map(|s| s.code_type);
            (scores[0].code_type, top, secondary, scores)
        } else {
            (CodeType::Unknown, 0.0, None, scores)
        }
    };

    let intent = execution_intent(code_type, &entry_points, libraries);
    let context = execution_context(source, language, code_type, libraries);
    debug!(%code_type, confidence, "code type classified");

    CodeTypeResult {
        code_type,
        confidence,
        secondary,
        scores,
        entry_points,
        exports,
        execution_intent: Some(intent),
        execution_context: Some(context),
    }
}

fn score_test(e: &Evidence<'_>) -> CodeTypeScore {
    let mut score = CodeTypeScore::new(CodeType::Test);
    if e.libraries.has_category(LibraryCategory::Testing) {
        score.add(0.4, "test framework");
    }
    let names = TEST_NAMES.find_iter(e.source).count();
    if names > 0 {
        score.add((0.15 * names as f64).min(0.45), format!("{names} test case(s)"));
    }
    let asserts = ASSERTIONS.find_iter(e.source).count();
    if asserts > 0 {
        score.add((0.05 * asserts as f64).min(0.2), format!("{asserts} assertion(s)"));
    }
    score.finish()
}

fn score_script(e: &Evidence<'_>) -> CodeTypeScore {
    let mut score = CodeTypeScore::new(CodeType::Script);
    if e.source.starts_with("#!") {
        score.add(0.3, "shebang");
    }
    if e.has_entry(EntryPointKind::TopLevelCall) {
        score.add(0.35, "top-level calls");
    }
    if e.has_entry(EntryPointKind::MainGuard) {
        score.add(0.35, "__main__ guard");
    }
    if e.has_entry(EntryPointKind::MainFunction) && e.is_short() {
        score.add(0.3, "main in a short file");
    }
    if e.functions <= 2 {
        score.add(0.1, "few functions");
    }
    if e.is_short() {
        score.add(0.15, "short file");
    }
    if e.has_runtime_framework() {
        score.add(-0.2, "framework runtime");
    }
    score.finish()
}

fn score_library(e: &Evidence<'_>) -> CodeTypeScore {
    let mut score = CodeTypeScore::new(CodeType::Library);
    if !e.exports.is_empty() {
        score.add(
            (0.15 * e.exports.len() as f64).min(0.45),
            format!("{} export(s)", e.exports.len()),
        );
    }
    if e.entry_points.is_empty() {
        score.add(0.2, "no entry point");
    }
    match e.functions + e.classes {
        n if n >= 6 => score.add(0.2, "many definitions"),
        n if n >= 3 => score.add(0.1, "several definitions"),
        _ => {}
    }
    if DOC_COMMENTS.is_match(e.source) {
        score.add(0.1, "documentation comments");
    }
    if !e.has_entry(EntryPointKind::TopLevelCall) {
        score.add(0.1, "no top-level side effects");
    }
    score.finish()
}

fn score_application(e: &Evidence<'_>) -> CodeTypeScore {
    let mut score = CodeTypeScore::new(CodeType::Application);
    if e.has_entry(EntryPointKind::MainFunction) {
        score.add(0.4, "main function");
    }
    if e.has_runtime_framework() {
        score.add(0.35, "web or UI framework");
    }
    if e.has_entry(EntryPointKind::ServerListen) || RUN_CALLS.is_match(e.source) {
        score.add(0.25, "listen/run call");
    }
    if INIT_KEYWORDS.is_match(e.source) {
        score.add(0.1, "initialization");
    }
    if !e.is_short() {
        score.add(0.1, "long file");
    }
    score.finish()
}

fn score_configuration(e: &Evidence<'_>) -> CodeTypeScore {
    let mut score = CodeTypeScore::new(CodeType::Configuration);
    let ratio = data_line_ratio(e.source);
    if ratio > 0.0 {
        score.add(0.5 * ratio, format!("{:.0}% data lines", ratio * 100.0));
    }
    if e.functions == 0 && e.classes == 0 && e.non_empty_lines > 0 {
        score.add(0.2, "no functions");
    }
    if CONFIG_KEYS.find_iter(e.source).count() >= 3 {
        score.add(0.15, "configuration keys");
    }
    if CONFIG_EXPORT.is_match(e.source) {
        score.add(0.15, "exported object literal");
    }
    score.finish()
}

/// Share of non-empty lines that are key/value pairs or bare literals.
fn data_line_ratio(source: &str) -> f64 {
    let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return 0.0;
    }
    let data = lines
        .iter()
        .filter(|line| {
            !line.contains('(')
                && !line.contains("=>")
                && (KEY_VALUE_LINE.is_match(line) || LITERAL_LINE.is_match(line))
        })
        .count();
    data as f64 / lines.len() as f64
}

/// Entry points for languages without an adapter.
pub fn textual_entry_points(source: &str, language: Language) -> Vec<EntryPoint> {
    let pattern = match language {
        Language::C | Language::Cpp => &*C_MAIN,
        _ => &*GENERIC_MAIN,
    };
    pattern
        .find_iter(source)
        .map(|m| {
            let line = source[..m.start()].matches('\n').count() + 1;
            EntryPoint::new("main", EntryPointKind::MainFunction, line)
        })
        .take(1)
        .collect()
}

fn count_definitions(tree: &SyntaxTree) -> (usize, usize) {
    let Some(kinds) = node_kinds(tree.language()) else {
        return (0, 0);
    };
    tree.root()
        .descendants()
        .fold((0, 0), |(functions, classes), node| {
            let kind = node.kind();
            let is_function = kinds.is_function(kind) && !kinds.lambdas.contains(&kind);
            (
                functions + usize::from(is_function),
                classes + usize::from(kinds.is_class(kind)),
            )
        })
}

/// Names a module makes available to importers.
pub fn extract_exports(tree: &SyntaxTree) -> Vec<String> {
    let root = tree.root();
    let mut exports = match tree.language() {
        Language::JavaScript | Language::TypeScript => javascript_exports(root),
        Language::Python => python_exports(tree),
        Language::Go => root
            .named_children()
            .flat_map(|item| match item.kind() {
                "function_declaration" | "method_declaration" => {
                    item.child_by_field("name").into_iter().collect::<Vec<_>>()
                }
                "type_declaration" => item
                    .named_children()
                    .filter_map(|spec| spec.child_by_field("name"))
                    .collect(),
                _ => Vec::new(),
            })
            .map(|name| name.text().to_string())
            .filter(|name| name.starts_with(|c: char| c.is_ascii_uppercase()))
            .collect(),
        Language::Rust => root
            .named_children()
            .filter(|item| {
                item.named_children()
                    .any(|c| c.kind() == "visibility_modifier" && c.text().starts_with("pub"))
            })
            .filter_map(|item| item.child_by_field("name"))
            .map(|name| name.text().to_string())
            .collect(),
        Language::Java => root
            .named_children()
            .filter(|item| {
                item.kind().ends_with("_declaration") && item.kind() != "import_declaration"
            })
            .filter(|item| {
                item.named_children().any(|c| {
                    c.kind() == "modifiers" && c.text().split_whitespace().any(|m| m == "public")
                })
            })
            .filter_map(|item| item.child_by_field("name"))
            .map(|name| name.text().to_string())
            .collect(),
        _ => Vec::new(),
    };
    let mut seen = std::collections::HashSet::new();
    exports.retain(|name| seen.insert(name.clone()));
    exports
}

fn javascript_exports(root: CstNode<'_>) -> Vec<String> {
    let mut exports = Vec::new();
    for node in root.descendants() {
        match node.kind() {
            "export_statement" => {
                if let Some(declaration) = node.child_by_field("declaration") {
                    if let Some(name) = declaration.child_by_field("name") {
                        exports.push(name.text().to_string());
                    }
                    exports.extend(
                        declaration
                            .named_children()
                            .filter(|c| c.kind() == "variable_declarator")
                            .filter_map(|c| c.child_by_field("name"))
                            .map(|n| n.text().to_string()),
                    );
                } else if node.children().any(|c| c.kind() == "default") {
                    exports.push("default".to_string());
                }
                for specifier in node
                    .descendants()
                    .filter(|c| c.kind() == "export_specifier")
                {
                    if let Some(name) = specifier
                        .child_by_field("alias")
                        .or_else(|| specifier.child_by_field("name"))
                    {
                        exports.push(name.text().to_string());
                    }
                }
            }
            "assignment_expression" => {
                let (Some(left), Some(right)) =
                    (node.child_by_field("left"), node.child_by_field("right"))
                else {
                    continue;
                };
                let target = left.text();
                if target == "module.exports" {
                    exports.extend(commonjs_object_exports(right));
                } else if let Some(name) = target
                    .strip_prefix("module.exports.")
                    .or_else(|| target.strip_prefix("exports."))
                {
                    exports.push(name.to_string());
                }
            }
            _ => {}
        }
    }
    exports
}

/// `module.exports = {a, b: fn}` exports `a` and `b`; literal-valued keys
/// are data, not exports.
fn commonjs_object_exports(value: CstNode<'_>) -> Vec<String> {
    match value.kind() {
        "identifier" => vec![value.text().to_string()],
        "object" => value
            .named_children()
            .filter_map(|member| match member.kind() {
                "shorthand_property_identifier" => Some(member.text().to_string()),
                "pair" => {
                    let exported = member.child_by_field("value").is_some_and(|v| {
                        matches!(
                            v.kind(),
                            "identifier" | "function_expression" | "function" | "arrow_function"
                        )
                    });
                    exported
                        .then(|| member.child_by_field("key"))
                        .flatten()
                        .map(|k| k.text().to_string())
                }
                "method_definition" => member.child_by_field("name").map(|n| n.text().to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn python_exports(tree: &SyntaxTree) -> Vec<String> {
    if let Some(caps) = PYTHON_ALL.captures(tree.source()) {
        if let Some(list) = caps.get(1) {
            return QUOTED
                .captures_iter(list.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect();
        }
    }
    tree.root()
        .named_children()
        .map(|item| {
            if item.kind() == "decorated_definition" {
                item.child_by_field("definition").unwrap_or(item)
            } else {
                item
            }
        })
        .filter(|item| matches!(item.kind(), "function_definition" | "class_definition"))
        .filter_map(|item| item.child_by_field("name"))
        .map(|name| name.text().to_string())
        .filter(|name| !name.starts_with('_'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::get_adapter;
    use crate::core::{ParserProvider, TreeSitterProvider};
    use crate::detection::library::analyze_libraries;
    use indoc::indoc;

    fn classify(source: &str, language: Language) -> CodeTypeResult {
        let tree = TreeSitterProvider::new().parse(source, language).unwrap();
        let libraries = analyze_libraries(&tree);
        let adapter = get_adapter(language);
        classify_code_type(&tree, &libraries, adapter.as_deref())
    }

    #[test]
    fn test_pytest_file_short_circuits() {
        let result = classify(
            indoc! {"
                import pytest

                def test_add():
                    assert add(1, 2) == 3

                def test_sub():
                    assert sub(2, 1) == 1
            "},
            Language::Python,
        );
        assert_eq!(result.code_type, CodeType::Test);
        assert_eq!(result.scores.len(), 1);
        assert!(result.confidence > TEST_SHORT_CIRCUIT);
    }

    #[test]
    fn test_python_main_guard_script() {
        let result = classify(
            indoc! {r#"
                import sys

                def main():
                    print(sys.argv)

                if __name__ == "__main__":
                    main()
            "#},
            Language::Python,
        );
        assert_eq!(result.code_type, CodeType::Script);
        let intent = result.execution_intent.unwrap();
        assert!(intent.is_runnable);
        assert_eq!(intent.entry_point.as_deref(), Some("main"));
    }

    #[test]
    fn test_es_module_library() {
        let result = classify(
            indoc! {"
                /** Adds two numbers. */
                export function add(a, b) { return a + b; }
                export function sub(a, b) { return a - b; }
                export const PI = 3.14;
            "},
            Language::JavaScript,
        );
        assert_eq!(result.exports, vec!["add", "sub", "PI"]);
        assert_eq!(result.code_type, CodeType::Library);
        assert!(!result.execution_intent.unwrap().is_runnable);
    }

    #[test]
    fn test_express_server_application() {
        let result = classify(
            indoc! {"
                const express = require('express');
                const app = express();
                app.get('/', (req, res) => res.send('ok'));
                app.listen(process.env.PORT);
            "},
            Language::JavaScript,
        );
        assert_eq!(result.code_type, CodeType::Application);
        let context = result.execution_context.unwrap();
        assert_eq!(context.environment_variables, vec!["PORT"]);
        assert_eq!(context.install_command.as_deref(), Some("npm install express"));
    }

    #[test]
    fn test_config_object() {
        let result = classify(
            indoc! {"
                module.exports = {
                  port: 3000,
                  host: 'localhost',
                  debug: true,
                };
            "},
            Language::JavaScript,
        );
        assert_eq!(result.code_type, CodeType::Configuration);
        assert!(result.exports.is_empty());
    }

    #[test]
    fn test_c_textual_entry_point() {
        let result = classify(
            "#include <stdio.h>\nint main(void) {\n    printf(\"hi\");\n    return 0;\n}\n",
            Language::C,
        );
        assert_eq!(result.entry_points.len(), 1);
        assert_eq!(result.entry_points[0].kind, EntryPointKind::MainFunction);
        assert_eq!(result.entry_points[0].line, 2);
        assert_eq!(result.code_type, CodeType::Script);
    }

    #[test]
    fn test_exports_per_language() {
        let parse = |source: &str, language| {
            TreeSitterProvider::new().parse(source, language).unwrap()
        };
        let go = parse(
            "package lib\nfunc Add() {}\nfunc helper() {}\ntype Point struct{}\n",
            Language::Go,
        );
        assert_eq!(extract_exports(&go), vec!["Add", "Point"]);
        let rust = parse("pub fn visible() {}\nfn hidden() {}\npub struct S;\n", Language::Rust);
        assert_eq!(extract_exports(&rust), vec!["visible", "S"]);
        let java = parse("public class Api {}\nclass Internal {}\n", Language::Java);
        assert_eq!(extract_exports(&java), vec!["Api"]);
        let py = parse("__all__ = ['load', 'save']\ndef load(): pass\n", Language::Python);
        assert_eq!(extract_exports(&py), vec!["load", "save"]);
    }

    #[test]
    fn test_unclear_snippet_is_unknown() {
        let result = classify(
            indoc! {"
                function a(x) { return x + 1; }
                function b(x) { return x * 2; }
                function c(x) { return a(b(x)); }
            "},
            Language::JavaScript,
        );
        assert_eq!(result.code_type, CodeType::Unknown);
        assert_eq!(result.confidence, 0.0);
    }
}
