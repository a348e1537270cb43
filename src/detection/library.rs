//! Import extraction and dependency categorization.
//!
//! Module names are taken verbatim from the CST (quotes stripped, nothing
//! truncated). Categorization tries the static table, then name heuristics,
//! then the language's standard-library set.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frameworks::{detect_frameworks, FrameworkInfo};
use crate::core::{CstNode, Language, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LibraryCategory {
    StandardLibrary,
    Framework,
    Utility,
    Testing,
    Database,
    Ui,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryInfo {
    /// Module name exactly as written in the import
    pub name: String,
    /// Package the module belongs to (`@scope/pkg`, `os`, `serde`)
    pub package: String,
    pub category: LibraryCategory,
    /// Relative or crate-local import
    pub is_local: bool,
    pub line: usize,
}

impl LibraryInfo {
    pub fn is_third_party(&self) -> bool {
        !self.is_local && self.category != LibraryCategory::StandardLibrary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAnalysisResult {
    pub libraries: Vec<LibraryInfo>,
    pub frameworks: Vec<FrameworkInfo>,
    pub package_manager: Option<String>,
}

impl LibraryAnalysisResult {
    pub fn third_party(&self) -> impl Iterator<Item = &LibraryInfo> {
        self.libraries.iter().filter(|lib| lib.is_third_party())
    }

    pub fn has_category(&self, category: LibraryCategory) -> bool {
        self.libraries.iter().any(|lib| lib.category == category)
            || self.frameworks.iter().any(|fw| fw.category == category)
    }
}

/// A raw import site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub module: String,
    /// `#include "x.h"` style imports
    pub quoted_local: bool,
    pub line: usize,
}

pub fn analyze_libraries(tree: &SyntaxTree) -> LibraryAnalysisResult {
    let language = tree.language();
    let mut libraries: Vec<LibraryInfo> = Vec::new();
    for import in extract_imports(tree) {
        if libraries.iter().any(|lib| lib.name == import.module) {
            continue;
        }
        let package = package_root(&import.module, language);
        let is_local = import.quoted_local || is_local_module(&import.module, language);
        let category = if is_local {
            LibraryCategory::Unknown
        } else {
            categorize(&import.module, &package, language)
        };
        libraries.push(LibraryInfo {
            name: import.module,
            package,
            category,
            is_local,
            line: import.line,
        });
    }

    let frameworks = detect_frameworks(tree.source(), language, &libraries);
    let package_manager = libraries
        .iter()
        .any(LibraryInfo::is_third_party)
        .then(|| package_manager(language))
        .flatten()
        .map(str::to_string);

    debug!(
        libraries = libraries.len(),
        frameworks = frameworks.len(),
        "dependency analysis complete"
    );
    LibraryAnalysisResult {
        libraries,
        frameworks,
        package_manager,
    }
}

/// Every import site in source order.
pub fn extract_imports(tree: &SyntaxTree) -> Vec<ImportRef> {
    let language = tree.language();
    let mut imports = Vec::new();
    for node in tree.root().descendants() {
        match (language, node.kind()) {
            (Language::JavaScript | Language::TypeScript, "import_statement") => {
                if let Some(source) = node.child_by_field("source") {
                    imports.push(import_ref(unquote(source.text()), node));
                }
            }
            (Language::JavaScript | Language::TypeScript, "call_expression") => {
                if let Some(module) = js_call_import(node) {
                    imports.push(import_ref(module, node));
                }
            }
            (Language::Python, "import_statement") => {
                for name in node.children_by_field("name") {
                    let dotted = name.child_by_field("name").unwrap_or(name);
                    imports.push(import_ref(dotted.text(), node));
                }
            }
            (Language::Python, "import_from_statement") => {
                if let Some(module) = node.child_by_field("module_name") {
                    imports.push(import_ref(module.text(), node));
                }
            }
            (Language::Go, "import_spec") => {
                if let Some(path) = node.child_by_field("path") {
                    imports.push(import_ref(unquote(path.text()), node));
                }
            }
            (Language::Java, "import_declaration") => {
                if let Some(path) = node
                    .named_children()
                    .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
                {
                    imports.push(import_ref(path.text(), node));
                }
            }
            (Language::Rust, "use_declaration") => {
                if let Some(argument) = node.child_by_field("argument") {
                    imports.push(import_ref(argument.text(), node));
                }
            }
            (Language::Rust, "extern_crate_declaration") => {
                if let Some(name) = node.child_by_field("name") {
                    imports.push(import_ref(name.text(), node));
                }
            }
            (Language::C, "preproc_include") => {
                if let Some(path) = node.child_by_field("path") {
                    let mut import = import_ref(unquote(path.text()), node);
                    import.quoted_local = path.kind() == "string_literal";
                    imports.push(import);
                }
            }
            _ => {}
        }
    }
    imports
}

fn import_ref(module: &str, node: CstNode<'_>) -> ImportRef {
    ImportRef {
        module: module.to_string(),
        quoted_local: false,
        line: node.start_line(),
    }
}

/// `require("x")` and dynamic `import("x")`.
fn js_call_import(call: CstNode<'_>) -> Option<&str> {
    let function = call.child_by_field("function")?;
    if function.kind() != "import" && function.text() != "require" {
        return None;
    }
    let first = call.child_by_field("arguments")?.named_children().next()?;
    matches!(first.kind(), "string" | "template_string").then(|| unquote(first.text()))
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '"' | '\'' | '`' | '<' | '>'))
}

/// Package a module belongs to, used for table lookups.
pub fn package_root(module: &str, language: Language) -> String {
    match language {
        Language::JavaScript | Language::TypeScript => {
            let module = module.strip_prefix("node:").unwrap_or(module);
            let mut segments = module.split('/');
            match segments.next() {
                Some(scope) if scope.starts_with('@') => match segments.next() {
                    Some(name) => format!("{scope}/{name}"),
                    None => scope.to_string(),
                },
                Some(first) => first.to_string(),
                None => module.to_string(),
            }
        }
        Language::Python => module.split('.').next().unwrap_or(module).to_string(),
        Language::Rust => module
            .trim_start_matches("::")
            .split("::")
            .next()
            .unwrap_or(module)
            .trim()
            .to_string(),
        _ => module.to_string(),
    }
}

fn is_local_module(module: &str, language: Language) -> bool {
    match language {
        Language::JavaScript | Language::TypeScript => {
            module.starts_with('.') || module.starts_with('/')
        }
        Language::Python => module.starts_with('.'),
        Language::Rust => matches!(
            package_root(module, language).as_str(),
            "crate" | "self" | "super"
        ),
        _ => false,
    }
}

static CATEGORY_TABLE: &[(&str, LibraryCategory)] = &[
    // Frameworks
    ("react", LibraryCategory::Framework),
    ("react-dom", LibraryCategory::Framework),
    ("next", LibraryCategory::Framework),
    ("vue", LibraryCategory::Framework),
    ("@angular/core", LibraryCategory::Framework),
    ("svelte", LibraryCategory::Framework),
    ("express", LibraryCategory::Framework),
    ("koa", LibraryCategory::Framework),
    ("fastify", LibraryCategory::Framework),
    ("@nestjs/core", LibraryCategory::Framework),
    ("django", LibraryCategory::Framework),
    ("flask", LibraryCategory::Framework),
    ("fastapi", LibraryCategory::Framework),
    ("tornado", LibraryCategory::Framework),
    ("org.springframework", LibraryCategory::Framework),
    ("github.com/gin-gonic/gin", LibraryCategory::Framework),
    ("github.com/labstack/echo", LibraryCategory::Framework),
    ("github.com/gofiber/fiber", LibraryCategory::Framework),
    ("actix_web", LibraryCategory::Framework),
    ("rocket", LibraryCategory::Framework),
    ("axum", LibraryCategory::Framework),
    // Testing
    ("jest", LibraryCategory::Testing),
    ("@jest/globals", LibraryCategory::Testing),
    ("mocha", LibraryCategory::Testing),
    ("chai", LibraryCategory::Testing),
    ("vitest", LibraryCategory::Testing),
    ("sinon", LibraryCategory::Testing),
    ("@testing-library/react", LibraryCategory::Testing),
    ("pytest", LibraryCategory::Testing),
    ("unittest", LibraryCategory::Testing),
    ("nose", LibraryCategory::Testing),
    ("hypothesis", LibraryCategory::Testing),
    ("org.junit", LibraryCategory::Testing),
    ("org.mockito", LibraryCategory::Testing),
    ("testing", LibraryCategory::Testing),
    ("github.com/stretchr/testify", LibraryCategory::Testing),
    ("proptest", LibraryCategory::Testing),
    // Database
    ("mongoose", LibraryCategory::Database),
    ("mongodb", LibraryCategory::Database),
    ("pg", LibraryCategory::Database),
    ("mysql", LibraryCategory::Database),
    ("mysql2", LibraryCategory::Database),
    ("sqlite3", LibraryCategory::Database),
    ("sequelize", LibraryCategory::Database),
    ("typeorm", LibraryCategory::Database),
    ("@prisma/client", LibraryCategory::Database),
    ("knex", LibraryCategory::Database),
    ("redis", LibraryCategory::Database),
    ("ioredis", LibraryCategory::Database),
    ("sqlalchemy", LibraryCategory::Database),
    ("psycopg2", LibraryCategory::Database),
    ("pymongo", LibraryCategory::Database),
    ("database/sql", LibraryCategory::Database),
    ("gorm.io/gorm", LibraryCategory::Database),
    ("java.sql", LibraryCategory::Database),
    ("sqlx", LibraryCategory::Database),
    ("diesel", LibraryCategory::Database),
    ("rusqlite", LibraryCategory::Database),
    // UI
    ("tkinter", LibraryCategory::Ui),
    ("PyQt5", LibraryCategory::Ui),
    ("PySide6", LibraryCategory::Ui),
    ("kivy", LibraryCategory::Ui),
    ("@mui/material", LibraryCategory::Ui),
    ("styled-components", LibraryCategory::Ui),
    ("antd", LibraryCategory::Ui),
    ("javax.swing", LibraryCategory::Ui),
    ("java.awt", LibraryCategory::Ui),
    ("fyne.io/fyne", LibraryCategory::Ui),
    ("egui", LibraryCategory::Ui),
    ("gtk", LibraryCategory::Ui),
    // Utility
    ("lodash", LibraryCategory::Utility),
    ("underscore", LibraryCategory::Utility),
    ("axios", LibraryCategory::Utility),
    ("moment", LibraryCategory::Utility),
    ("dayjs", LibraryCategory::Utility),
    ("uuid", LibraryCategory::Utility),
    ("chalk", LibraryCategory::Utility),
    ("commander", LibraryCategory::Utility),
    ("yargs", LibraryCategory::Utility),
    ("dotenv", LibraryCategory::Utility),
    ("requests", LibraryCategory::Utility),
    ("numpy", LibraryCategory::Utility),
    ("pandas", LibraryCategory::Utility),
    ("scipy", LibraryCategory::Utility),
    ("click", LibraryCategory::Utility),
    ("pydantic", LibraryCategory::Utility),
    ("github.com/spf13/cobra", LibraryCategory::Utility),
    ("com.google.gson", LibraryCategory::Utility),
    ("com.google.common", LibraryCategory::Utility),
    ("org.apache.commons", LibraryCategory::Utility),
    ("serde", LibraryCategory::Utility),
    ("serde_json", LibraryCategory::Utility),
    ("regex", LibraryCategory::Utility),
    ("rand", LibraryCategory::Utility),
    ("anyhow", LibraryCategory::Utility),
    ("thiserror", LibraryCategory::Utility),
    ("clap", LibraryCategory::Utility),
    ("tokio", LibraryCategory::Utility),
    ("itertools", LibraryCategory::Utility),
];

/// Name fragments checked after the table, as whole tokens of the name.
static TOKEN_HEURISTICS: &[(&[&str], LibraryCategory)] = &[
    (&["test", "tests", "testing", "spec", "mock", "mocks"], LibraryCategory::Testing),
    (
        &["sql", "db", "database", "mongo", "redis", "orm", "postgres"],
        LibraryCategory::Database,
    ),
    (&["ui", "widget", "widgets", "gui", "css", "style"], LibraryCategory::Ui),
    (&["framework", "web", "server"], LibraryCategory::Framework),
    (&["helpers", "tools", "toolkit"], LibraryCategory::Utility),
];

const JS_STDLIB: &[&str] = &[
    "fs", "path", "http", "https", "os", "util", "events", "stream", "crypto", "url",
    "querystring", "child_process", "assert", "buffer", "zlib", "net", "readline", "dns",
    "cluster", "worker_threads", "process", "timers",
];

const PYTHON_STDLIB: &[&str] = &[
    "os", "sys", "re", "json", "math", "random", "time", "datetime", "collections",
    "itertools", "functools", "typing", "pathlib", "subprocess", "logging", "asyncio",
    "threading", "csv", "io", "argparse", "dataclasses", "abc", "copy", "string",
    "hashlib", "urllib", "socket", "heapq", "bisect", "enum", "shutil", "tempfile", "glob",
    "pickle", "statistics", "operator", "contextlib", "uuid", "decimal", "fractions",
    "queue", "multiprocessing", "http", "email", "textwrap", "pprint", "traceback",
];

const C_STDLIB: &[&str] = &[
    "stdio.h", "stdlib.h", "string.h", "math.h", "stdbool.h", "stdint.h", "ctype.h",
    "time.h", "assert.h", "limits.h", "errno.h", "signal.h", "stddef.h", "stdarg.h",
    "float.h", "locale.h", "setjmp.h", "unistd.h",
];

pub fn categorize(module: &str, package: &str, language: Language) -> LibraryCategory {
    if let Some(category) = table_category(module, package) {
        return category;
    }
    if module.starts_with("node:") {
        return LibraryCategory::StandardLibrary;
    }
    if let Some(category) = heuristic_category(package) {
        return category;
    }
    if is_standard_library(module, package, language) {
        return LibraryCategory::StandardLibrary;
    }
    LibraryCategory::Unknown
}

fn table_category(module: &str, package: &str) -> Option<LibraryCategory> {
    CATEGORY_TABLE
        .iter()
        .find(|(key, _)| {
            package == *key
                || module == *key
                || module
                    .strip_prefix(key)
                    .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('.'))
        })
        .map(|(_, category)| *category)
}

fn heuristic_category(package: &str) -> Option<LibraryCategory> {
    let tokens: Vec<String> = package
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    TOKEN_HEURISTICS
        .iter()
        .find(|(fragments, _)| tokens.iter().any(|t| fragments.contains(&t.as_str())))
        .map(|(_, category)| *category)
}

fn is_standard_library(module: &str, package: &str, language: Language) -> bool {
    match language {
        Language::JavaScript | Language::TypeScript => JS_STDLIB.contains(&package),
        Language::Python => PYTHON_STDLIB.contains(&package),
        Language::Go => !module.split('/').next().unwrap_or(module).contains('.'),
        Language::Java | Language::Kotlin => {
            module.starts_with("java.") || module.starts_with("javax.")
        }
        Language::Rust => matches!(package, "std" | "core" | "alloc"),
        Language::C | Language::Cpp => C_STDLIB.contains(&module),
        _ => false,
    }
}

fn package_manager(language: Language) -> Option<&'static str> {
    match language {
        Language::JavaScript | Language::TypeScript => Some("npm"),
        Language::Python => Some("pip"),
        Language::Go => Some("go modules"),
        Language::Rust => Some("cargo"),
        Language::Java | Language::Kotlin => Some("maven"),
        Language::Ruby => Some("gem"),
        Language::Php => Some("composer"),
        Language::CSharp => Some("nuget"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ParserProvider, TreeSitterProvider};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn parse(source: &str, language: Language) -> SyntaxTree {
        TreeSitterProvider::new().parse(source, language).unwrap()
    }

    fn names(result: &LibraryAnalysisResult) -> Vec<&str> {
        result.libraries.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_javascript_imports_verbatim() {
        let tree = parse(
            indoc! {r#"
                import React, { useState } from "react";
                import get from 'lodash/get';
                const fs = require("fs");
                const helper = require("./helper");
                const lazy = import("@scope/pkg/sub");
            "#},
            Language::JavaScript,
        );
        let result = analyze_libraries(&tree);
        assert_eq!(
            names(&result),
            vec!["react", "lodash/get", "fs", "./helper", "@scope/pkg/sub"]
        );
        assert_eq!(result.libraries[0].category, LibraryCategory::Framework);
        assert_eq!(result.libraries[1].package, "lodash");
        assert_eq!(result.libraries[1].category, LibraryCategory::Utility);
        assert_eq!(result.libraries[2].category, LibraryCategory::StandardLibrary);
        assert!(result.libraries[3].is_local);
        assert_eq!(result.libraries[4].package, "@scope/pkg");
        assert_eq!(result.package_manager.as_deref(), Some("npm"));
    }

    #[test]
    fn test_python_imports() {
        let tree = parse(
            indoc! {"
                import os
                import numpy as np
                from collections import defaultdict
                from .models import User
                import sqlalchemy.orm
            "},
            Language::Python,
        );
        let result = analyze_libraries(&tree);
        assert_eq!(
            names(&result),
            vec!["os", "numpy", "collections", ".models", "sqlalchemy.orm"]
        );
        let categories: Vec<LibraryCategory> =
            result.libraries.iter().map(|l| l.category).collect();
        assert_eq!(
            categories,
            vec![
                LibraryCategory::StandardLibrary,
                LibraryCategory::Utility,
                LibraryCategory::StandardLibrary,
                LibraryCategory::Unknown,
                LibraryCategory::Database,
            ]
        );
        assert_eq!(result.package_manager.as_deref(), Some("pip"));
    }

    #[test]
    fn test_go_standard_library_has_no_package_manager() {
        let tree = parse(
            indoc! {r#"
                package main

                import (
                    "fmt"
                    "net/http"
                )
            "#},
            Language::Go,
        );
        let result = analyze_libraries(&tree);
        assert_eq!(names(&result), vec!["fmt", "net/http"]);
        assert!(result
            .libraries
            .iter()
            .all(|l| l.category == LibraryCategory::StandardLibrary));
        assert_eq!(result.package_manager, None);
    }

    #[test]
    fn test_rust_and_c_imports() {
        let tree = parse(
            "use std::collections::HashMap;\nuse serde::Serialize;\nuse crate::core::Language;\n",
            Language::Rust,
        );
        let result = analyze_libraries(&tree);
        assert_eq!(result.libraries[0].package, "std");
        assert_eq!(result.libraries[0].category, LibraryCategory::StandardLibrary);
        assert_eq!(result.libraries[1].category, LibraryCategory::Utility);
        assert!(result.libraries[2].is_local);

        let tree = parse("#include <stdio.h>\n#include \"list.h\"\n", Language::C);
        let result = analyze_libraries(&tree);
        assert_eq!(names(&result), vec!["stdio.h", "list.h"]);
        assert_eq!(result.libraries[0].category, LibraryCategory::StandardLibrary);
        assert!(result.libraries[1].is_local);
        assert_eq!(result.package_manager, None);
    }

    #[test]
    fn test_java_prefix_table_match() {
        let tree = parse(
            "import org.springframework.boot.SpringApplication;\nimport java.util.List;\n",
            Language::Java,
        );
        let result = analyze_libraries(&tree);
        assert_eq!(result.libraries[0].category, LibraryCategory::Framework);
        assert_eq!(result.libraries[1].category, LibraryCategory::StandardLibrary);
    }

    #[test]
    fn test_token_heuristics() {
        assert_eq!(
            categorize("my-test-utils", "my-test-utils", Language::JavaScript),
            LibraryCategory::Testing
        );
        assert_eq!(
            categorize("build-tools", "build-tools", Language::JavaScript),
            LibraryCategory::Utility
        );
        assert_eq!(
            categorize("leftpad", "leftpad", Language::JavaScript),
            LibraryCategory::Unknown
        );
    }
}
