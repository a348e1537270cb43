//! Execution intent and context for a classified snippet.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::code_type::CodeType;
use super::library::{LibraryAnalysisResult, LibraryCategory};
use super::signals;
use crate::adapters::{EntryPoint, EntryPointKind};
use crate::core::{clamp_unit, round2, Language};

/// Runnability at or above this marks the snippet runnable.
pub const RUNNABLE_THRESHOLD: f64 = 0.6;

static PUBLIC_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpublic\s+(final\s+)?class\s+(\w+)").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionIntent {
    pub is_runnable: bool,
    pub runnability: f64,
    pub entry_point: Option<String>,
    pub blockers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub runtime: String,
    pub build_steps: Vec<String>,
    pub install_command: Option<String>,
    pub run_command: Option<String>,
    pub environment_variables: Vec<String>,
}

/// Most specific entry point first.
fn primary_entry_point(entry_points: &[EntryPoint]) -> Option<&EntryPoint> {
    [
        EntryPointKind::MainFunction,
        EntryPointKind::MainGuard,
        EntryPointKind::ServerListen,
        EntryPointKind::TopLevelCall,
    ]
    .iter()
    .find_map(|kind| entry_points.iter().find(|e| e.kind == *kind))
}

fn third_party_packages(libraries: &LibraryAnalysisResult) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for lib in libraries.third_party() {
        if !packages.contains(&lib.package) {
            packages.push(lib.package.clone());
        }
    }
    packages
}

pub fn execution_intent(
    code_type: CodeType,
    entry_points: &[EntryPoint],
    libraries: &LibraryAnalysisResult,
) -> ExecutionIntent {
    let entry = primary_entry_point(entry_points);
    let packages = third_party_packages(libraries);
    let mut runnability = 0.5;
    let mut blockers = Vec::new();

    if entry.is_some() {
        runnability += 0.3;
    } else if !matches!(code_type, CodeType::Test | CodeType::Configuration) {
        blockers.push("no entry point".to_string());
    }
    match code_type {
        CodeType::Script | CodeType::Application => runnability += 0.1,
        CodeType::Library => runnability -= 0.3,
        CodeType::Configuration => {
            runnability -= 0.3;
            blockers.push("configuration only; nothing to execute".to_string());
        }
        CodeType::Test => {
            runnability -= 0.2;
            let runner = libraries
                .frameworks
                .iter()
                .find(|fw| fw.category == LibraryCategory::Testing)
                .map(|fw| fw.name.clone())
                .unwrap_or_else(|| "a test runner".to_string());
            blockers.push(format!("needs {runner} to run"));
        }
        CodeType::Unknown => {}
    }
    if !packages.is_empty() {
        runnability -= 0.2;
        blockers.push(format!(
            "requires third-party packages: {}",
            packages.join(", ")
        ));
    }
    for framework in libraries
        .frameworks
        .iter()
        .filter(|fw| fw.category == LibraryCategory::Framework)
    {
        blockers.push(format!("requires the {} runtime", framework.name));
    }

    let runnability = round2(clamp_unit(runnability));
    ExecutionIntent {
        is_runnable: runnability >= RUNNABLE_THRESHOLD,
        runnability,
        entry_point: entry.map(|e| e.name.clone()),
        blockers,
    }
}

pub fn execution_context(
    source: &str,
    language: Language,
    code_type: CodeType,
    libraries: &LibraryAnalysisResult,
) -> ExecutionContext {
    let packages = third_party_packages(libraries);
    let class_name = PUBLIC_CLASS
        .captures(source)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or("Main");

    let runtime = match language {
        Language::JavaScript => "node",
        Language::TypeScript => "node (ts-node)",
        Language::Python => "python3",
        Language::Go => "go",
        Language::Java => "jvm",
        Language::Rust => "cargo",
        Language::C => "cc",
        Language::Cpp => "c++",
        Language::CSharp => "dotnet",
        Language::Php => "php",
        Language::Ruby => "ruby",
        Language::Kotlin => "kotlin (jvm)",
        Language::Swift => "swift",
        Language::Unknown => "unknown",
    }
    .to_string();

    let build_steps = match language {
        Language::TypeScript => vec!["tsc".to_string()],
        Language::Go => vec!["go build".to_string()],
        Language::Java => vec![format!("javac {class_name}.java")],
        Language::Rust => vec!["cargo build".to_string()],
        Language::C => vec!["cc main.c -o main".to_string()],
        Language::Cpp => vec!["c++ main.cpp -o main".to_string()],
        Language::Kotlin => vec!["kotlinc main.kt -include-runtime -d main.jar".to_string()],
        Language::Swift => vec!["swiftc main.swift".to_string()],
        Language::CSharp => vec!["dotnet build".to_string()],
        _ => Vec::new(),
    };

    let install_command = (!packages.is_empty())
        .then(|| {
            let list = packages.join(" ");
            match language {
                Language::JavaScript | Language::TypeScript => Some(format!("npm install {list}")),
                Language::Python => Some(format!("pip install {list}")),
                Language::Go => Some(format!("go get {list}")),
                Language::Rust => Some(format!("cargo add {list}")),
                Language::Java | Language::Kotlin => Some("mvn dependency:resolve".to_string()),
                Language::Ruby => Some(format!("gem install {list}")),
                Language::Php => Some(format!("composer require {list}")),
                Language::CSharp => Some(format!("dotnet add package {list}")),
                _ => None,
            }
        })
        .flatten();

    let run_command = match code_type {
        CodeType::Library | CodeType::Configuration => None,
        CodeType::Test => match language {
            Language::JavaScript | Language::TypeScript => Some("npm test"),
            Language::Python => Some("pytest"),
            Language::Go => Some("go test ./..."),
            Language::Rust => Some("cargo test"),
            Language::Java | Language::Kotlin => Some("mvn test"),
            _ => None,
        }
        .map(str::to_string),
        _ => match language {
            Language::JavaScript => Some("node main.js".to_string()),
            Language::TypeScript => Some("npx ts-node main.ts".to_string()),
            Language::Python => Some("python3 main.py".to_string()),
            Language::Go => Some("go run main.go".to_string()),
            Language::Java => Some(format!("java {class_name}")),
            Language::Rust => Some("cargo run".to_string()),
            Language::C | Language::Cpp => Some("./main".to_string()),
            Language::Ruby => Some("ruby main.rb".to_string()),
            Language::Php => Some("php main.php".to_string()),
            Language::Kotlin => Some("java -jar main.jar".to_string()),
            Language::Swift => Some("./main".to_string()),
            Language::CSharp => Some("dotnet run".to_string()),
            Language::Unknown => None,
        },
    };

    ExecutionContext {
        runtime,
        build_steps,
        install_command,
        run_command,
        environment_variables: signals::environment_variables(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::frameworks::{FrameworkInfo, FrameworkType};
    use crate::detection::library::LibraryInfo;

    fn library(name: &str, category: LibraryCategory) -> LibraryInfo {
        LibraryInfo {
            name: name.to_string(),
            package: name.to_string(),
            category,
            is_local: false,
            line: 1,
        }
    }

    #[test]
    fn test_script_with_entry_point_is_runnable() {
        let entry = vec![EntryPoint::new("main", EntryPointKind::MainFunction, 3)];
        let intent = execution_intent(CodeType::Script, &entry, &LibraryAnalysisResult::default());
        assert!(intent.is_runnable);
        assert_eq!(intent.runnability, 0.9);
        assert!(intent.blockers.is_empty());
    }

    #[test]
    fn test_library_without_entry_point_is_blocked() {
        let libraries = LibraryAnalysisResult {
            libraries: vec![library("lodash", LibraryCategory::Utility)],
            ..LibraryAnalysisResult::default()
        };
        let intent = execution_intent(CodeType::Library, &[], &libraries);
        assert!(!intent.is_runnable);
        assert_eq!(intent.runnability, 0.0);
        assert_eq!(
            intent.blockers,
            vec![
                "no entry point".to_string(),
                "requires third-party packages: lodash".to_string()
            ]
        );
    }

    #[test]
    fn test_test_code_names_its_runner() {
        let libraries = LibraryAnalysisResult {
            frameworks: vec![FrameworkInfo {
                framework: FrameworkType::Pytest,
                name: "pytest".to_string(),
                category: LibraryCategory::Testing,
                confidence: 0.9,
                indicators: Vec::new(),
            }],
            ..LibraryAnalysisResult::default()
        };
        let intent = execution_intent(CodeType::Test, &[], &libraries);
        assert_eq!(intent.blockers, vec!["needs pytest to run".to_string()]);
        let context = execution_context("", Language::Python, CodeType::Test, &libraries);
        assert_eq!(context.run_command.as_deref(), Some("pytest"));
    }

    #[test]
    fn test_java_context_uses_public_class() {
        let source = "public class Greeter { public static void main(String[] a) {} }";
        let context = execution_context(
            source,
            Language::Java,
            CodeType::Application,
            &LibraryAnalysisResult::default(),
        );
        assert_eq!(context.runtime, "jvm");
        assert_eq!(context.build_steps, vec!["javac Greeter.java".to_string()]);
        assert_eq!(context.run_command.as_deref(), Some("java Greeter"));
        assert_eq!(context.install_command, None);
    }
}
