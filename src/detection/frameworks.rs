//! Framework detection from imports and API usage.
//!
//! Each known framework has import indicators (package names) and API
//! indicators (regexes over the full source). An import match alone gives
//! [`IMPORT_SIGNAL`]; API usage alone tops out at [`API_SIGNAL_MAX`]; both
//! together earn a corroboration bonus.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::library::{LibraryCategory, LibraryInfo};
use crate::core::{round2, Language};

pub const IMPORT_SIGNAL: f64 = 0.9;
pub const API_SIGNAL_MAX: f64 = 0.9 * 0.7;
pub const CORROBORATION_BONUS: f64 = 0.1;
/// Frameworks are reported only above this confidence.
pub const REPORT_THRESHOLD: f64 = 0.5;
/// API hits needed for the full API signal.
const API_SATURATION: f64 = 2.0;

/// Supported frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameworkType {
    /// React component library
    React,
    /// Vue progressive framework
    Vue,
    /// Angular application framework
    Angular,
    /// Express web server
    Express,
    /// Jest test runner
    Jest,
    /// Mocha test runner with chai assertions
    Mocha,
    /// Django web framework
    Django,
    /// Flask web framework
    Flask,
    /// FastAPI web framework
    FastApi,
    /// pytest testing framework
    Pytest,
    /// unittest testing framework
    Unittest,
    /// Spring application framework
    Spring,
    /// JUnit testing framework
    JUnit,
    /// Gin HTTP framework
    Gin,
    /// Go's built-in testing package
    GoTesting,
    /// Actix web framework
    ActixWeb,
    /// Axum web framework
    Axum,
    /// Tokio async runtime
    Tokio,
    /// Rust's built-in test harness
    RustTest,
    /// Tkinter GUI toolkit
    Tkinter,
}

impl FrameworkType {
    pub const ALL: [FrameworkType; 20] = [
        FrameworkType::React,
        FrameworkType::Vue,
        FrameworkType::Angular,
        FrameworkType::Express,
        FrameworkType::Jest,
        FrameworkType::Mocha,
        FrameworkType::Django,
        FrameworkType::Flask,
        FrameworkType::FastApi,
        FrameworkType::Pytest,
        FrameworkType::Unittest,
        FrameworkType::Spring,
        FrameworkType::JUnit,
        FrameworkType::Gin,
        FrameworkType::GoTesting,
        FrameworkType::ActixWeb,
        FrameworkType::Axum,
        FrameworkType::Tokio,
        FrameworkType::RustTest,
        FrameworkType::Tkinter,
    ];

    /// Get the canonical name of the framework
    pub fn name(&self) -> &'static str {
        match self {
            FrameworkType::React => "React",
            FrameworkType::Vue => "Vue",
            FrameworkType::Angular => "Angular",
            FrameworkType::Express => "Express",
            FrameworkType::Jest => "Jest",
            FrameworkType::Mocha => "Mocha",
            FrameworkType::Django => "Django",
            FrameworkType::Flask => "Flask",
            FrameworkType::FastApi => "FastAPI",
            FrameworkType::Pytest => "pytest",
            FrameworkType::Unittest => "unittest",
            FrameworkType::Spring => "Spring",
            FrameworkType::JUnit => "JUnit",
            FrameworkType::Gin => "Gin",
            FrameworkType::GoTesting => "go test",
            FrameworkType::ActixWeb => "Actix Web",
            FrameworkType::Axum => "Axum",
            FrameworkType::Tokio => "Tokio",
            FrameworkType::RustTest => "cargo test",
            FrameworkType::Tkinter => "Tkinter",
        }
    }

    pub fn languages(&self) -> &'static [Language] {
        match self {
            FrameworkType::React
            | FrameworkType::Vue
            | FrameworkType::Angular
            | FrameworkType::Express
            | FrameworkType::Jest
            | FrameworkType::Mocha => &[Language::JavaScript, Language::TypeScript],
            FrameworkType::Django
            | FrameworkType::Flask
            | FrameworkType::FastApi
            | FrameworkType::Pytest
            | FrameworkType::Unittest
            | FrameworkType::Tkinter => &[Language::Python],
            FrameworkType::Spring | FrameworkType::JUnit => &[Language::Java, Language::Kotlin],
            FrameworkType::Gin | FrameworkType::GoTesting => &[Language::Go],
            FrameworkType::ActixWeb
            | FrameworkType::Axum
            | FrameworkType::Tokio
            | FrameworkType::RustTest => &[Language::Rust],
        }
    }

    pub fn category(&self) -> LibraryCategory {
        match self {
            FrameworkType::Jest
            | FrameworkType::Mocha
            | FrameworkType::Pytest
            | FrameworkType::Unittest
            | FrameworkType::JUnit
            | FrameworkType::GoTesting
            | FrameworkType::RustTest => LibraryCategory::Testing,
            FrameworkType::Tkinter => LibraryCategory::Ui,
            FrameworkType::Tokio => LibraryCategory::Utility,
            _ => LibraryCategory::Framework,
        }
    }

    /// Get import indicators that suggest this framework is in use
    pub fn import_indicators(&self) -> &'static [&'static str] {
        match self {
            FrameworkType::React => &["react", "react-dom", "next"],
            FrameworkType::Vue => &["vue"],
            FrameworkType::Angular => &["@angular/core"],
            FrameworkType::Express => &["express"],
            FrameworkType::Jest => &["jest", "@jest/globals"],
            FrameworkType::Mocha => &["mocha", "chai"],
            FrameworkType::Django => &["django"],
            FrameworkType::Flask => &["flask"],
            FrameworkType::FastApi => &["fastapi"],
            FrameworkType::Pytest => &["pytest"],
            FrameworkType::Unittest => &["unittest"],
            FrameworkType::Spring => &["org.springframework"],
            FrameworkType::JUnit => &["org.junit"],
            FrameworkType::Gin => &["github.com/gin-gonic/gin"],
            FrameworkType::GoTesting => &["testing"],
            FrameworkType::ActixWeb => &["actix_web"],
            FrameworkType::Axum => &["axum"],
            FrameworkType::Tokio => &["tokio"],
            FrameworkType::RustTest => &[],
            FrameworkType::Tkinter => &["tkinter", "Tkinter"],
        }
    }

    /// Get API usage patterns, scanned across the whole source
    pub fn api_indicators(&self) -> &'static [&'static str] {
        match self {
            FrameworkType::React => &[
                r"\buse(State|Effect|Memo|Callback|Ref|Context)\s*\(",
                r"\bReact\.\w+",
                r"\bclassName\s*=",
                r"\b(ReactDOM\.render|createRoot)\s*\(",
            ],
            FrameworkType::Vue => &[
                r"\bcreateApp\s*\(",
                r"\bdefineComponent\s*\(",
                r"\bv-(if|for|model|bind)\b",
                r"\b(ref|reactive|computed)\s*\(",
            ],
            FrameworkType::Angular => &[
                r"@Component\s*\(",
                r"@NgModule\s*\(",
                r"@Injectable\s*\(",
            ],
            FrameworkType::Express => &[
                r"\bexpress\s*\(\s*\)",
                r"\b(app|router)\.(get|post|put|delete|use)\s*\(",
                r"\bres\.(send|json|status|render)\s*\(",
                r"\bapp\.listen\s*\(",
            ],
            FrameworkType::Jest => &[
                r"\bexpect\s*\(.*\)\.(toBe|toEqual|toHaveBeenCalled\w*|toThrow)\b",
                r"\bjest\.(fn|mock|spyOn)\s*\(",
                r#"\b(test|it)\s*\(\s*['"`]"#,
            ],
            FrameworkType::Mocha => &[
                r#"\bdescribe\s*\(\s*['"`]"#,
                r#"\bit\s*\(\s*['"`]"#,
                r"\bexpect\s*\(.*\)\.to\.",
                r"\bassert\.(equal|strictEqual|deepEqual)\s*\(",
            ],
            FrameworkType::Django => &[
                r"\bmodels\.Model\b",
                r"\brender\s*\(\s*request",
                r"\burlpatterns\b",
                r"\bHttpResponse\s*\(",
            ],
            FrameworkType::Flask => &[
                r"\bFlask\s*\(\s*__name__\s*\)",
                r"@\w+\.route\s*\(",
                r"\bjsonify\s*\(",
                r"\brequest\.(args|form|json)\b",
            ],
            FrameworkType::FastApi => &[
                r"\bFastAPI\s*\(\s*\)",
                r"@\w+\.(get|post|put|delete)\s*\(",
                r"\bDepends\s*\(",
                r"\bHTTPException\b",
            ],
            FrameworkType::Pytest => &[
                r"(?m)^\s*def\s+test_\w+\s*\(",
                r"@pytest\.\w+",
                r"(?m)^\s*assert\s",
            ],
            FrameworkType::Unittest => &[
                r"\bunittest\.TestCase\b",
                r"\bself\.assert\w+\s*\(",
                r"\bdef\s+test_\w+\s*\(\s*self",
            ],
            FrameworkType::Spring => &[
                r"@SpringBootApplication\b",
                r"@(Rest)?Controller\b",
                r"@(Get|Post|Put|Delete|Request)Mapping\b",
                r"@Autowired\b",
            ],
            FrameworkType::JUnit => &[
                r"@Test\b",
                r"\bassert(Equals|True|False|NotNull|Throws)\s*\(",
                r"@(Before|After)(Each|All)?\b",
            ],
            FrameworkType::Gin => &[
                r"\bgin\.(Default|New)\s*\(\s*\)",
                r"\*gin\.Context\b",
                r"\.(GET|POST|PUT|DELETE)\s*\(",
            ],
            FrameworkType::GoTesting => &[
                r"\bfunc\s+Test\w+\s*\(\s*t\s+\*testing\.T\s*\)",
                r"\bt\.(Error|Errorf|Fatal|Fatalf|Run)\s*\(",
                r"\bfunc\s+Benchmark\w+\s*\(",
            ],
            FrameworkType::ActixWeb => &[
                r"\bHttpServer::new\b",
                r"#\[(get|post|put|delete)\(",
                r"\bweb::(Json|Path|Data|resource)\b",
            ],
            FrameworkType::Axum => &[
                r"\bRouter::new\s*\(\s*\)",
                r"\.route\s*\(",
                r"\baxum::serve\b",
            ],
            FrameworkType::Tokio => &[
                r"#\[tokio::main\]",
                r"\btokio::spawn\s*\(",
                r"\.await\b",
            ],
            FrameworkType::RustTest => &[
                r"#\[test\]",
                r"#\[cfg\(test\)\]",
                r"\bassert(_eq|_ne)?!\s*\(",
            ],
            FrameworkType::Tkinter => &[
                r"\bTk\s*\(\s*\)",
                r"\.mainloop\s*\(",
                r"\b(Button|Label|Entry|Frame)\s*\(",
            ],
        }
    }
}

static API_PATTERNS: Lazy<HashMap<FrameworkType, Vec<Regex>>> = Lazy::new(|| {
    FrameworkType::ALL
        .iter()
        .map(|framework| {
            let patterns = framework
                .api_indicators()
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect();
            (*framework, patterns)
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkInfo {
    pub framework: FrameworkType,
    pub name: String,
    pub category: LibraryCategory,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

/// Frameworks above [`REPORT_THRESHOLD`], most confident first.
pub fn detect_frameworks(
    source: &str,
    language: Language,
    libraries: &[LibraryInfo],
) -> Vec<FrameworkInfo> {
    let mut found: Vec<FrameworkInfo> = FrameworkType::ALL
        .iter()
        .filter(|framework| framework.languages().contains(&language))
        .filter_map(|framework| score_framework(*framework, source, libraries))
        .filter(|info| info.confidence > REPORT_THRESHOLD)
        .collect();
    found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    found
}

fn score_framework(
    framework: FrameworkType,
    source: &str,
    libraries: &[LibraryInfo],
) -> Option<FrameworkInfo> {
    let mut indicators = Vec::new();

    let imported: Vec<&str> = libraries
        .iter()
        .filter(|lib| {
            framework.import_indicators().iter().any(|indicator| {
                lib.package == *indicator
                    || lib.name == *indicator
                    || lib.name.starts_with(&format!("{indicator}."))
            })
        })
        .map(|lib| lib.name.as_str())
        .collect();
    for name in &imported {
        indicators.push(format!("import {name}"));
    }
    let import_signal = if imported.is_empty() { 0.0 } else { IMPORT_SIGNAL };

    let patterns = API_PATTERNS.get(&framework)?;
    let hits: Vec<&Regex> = patterns.iter().filter(|p| p.is_match(source)).collect();
    for pattern in &hits {
        indicators.push(format!("api {}", pattern.as_str()));
    }
    let api_signal = API_SIGNAL_MAX * (hits.len() as f64 / API_SATURATION).min(1.0);

    if import_signal == 0.0 && api_signal == 0.0 {
        return None;
    }
    let bonus = if import_signal > 0.0 && api_signal > 0.0 {
        CORROBORATION_BONUS
    } else {
        0.0
    };
    Some(FrameworkInfo {
        framework,
        name: framework.name().to_string(),
        category: framework.category(),
        confidence: round2((import_signal.max(api_signal) + bonus).min(1.0)),
        indicators,
    })
}
