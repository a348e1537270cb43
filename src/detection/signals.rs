//! Text-level behavioral signals shared by several detectors.
//!
//! Side effects, I/O, nondeterminism and async usage are recognized from the
//! raw source with per-language regex tables. Each table entry lists the
//! languages it applies to; an empty list applies to every language.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::Language;

const JS_TS: &[Language] = &[Language::JavaScript, Language::TypeScript];
const PY: &[Language] = &[Language::Python];
const GO: &[Language] = &[Language::Go];
const JVM: &[Language] = &[Language::Java, Language::Kotlin];
const RS: &[Language] = &[Language::Rust];
const C_FAMILY: &[Language] = &[Language::C, Language::Cpp];
const ANY: &[Language] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Console,
    FileSystem,
    Network,
    Process,
    Dom,
    Storage,
    Random,
    Clock,
    Async,
}

impl SignalKind {
    pub fn is_io(self) -> bool {
        matches!(
            self,
            SignalKind::Console
                | SignalKind::FileSystem
                | SignalKind::Network
                | SignalKind::Process
                | SignalKind::Storage
        )
    }

    pub fn is_nondeterministic(self) -> bool {
        matches!(self, SignalKind::Random | SignalKind::Clock)
    }

    pub fn is_side_effect(self) -> bool {
        self.is_io() || self == SignalKind::Dom
    }
}

struct Signal {
    kind: SignalKind,
    languages: &'static [Language],
    label: &'static str,
    pattern: Regex,
}

impl Signal {
    fn applies_to(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }
}

/// One matched signal with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalHit {
    pub kind: SignalKind,
    pub label: &'static str,
    pub count: usize,
}

type SignalSpec = (SignalKind, &'static [Language], &'static str, &'static str);

static SIGNAL_SPECS: &[SignalSpec] = &[
    // Console
    (SignalKind::Console, JS_TS, "console output", r"\bconsole\.(log|error|warn|info|debug)\s*\("),
    (SignalKind::Console, PY, "print", r"\bprint\s*\("),
    (SignalKind::Console, PY, "input", r"\binput\s*\("),
    (SignalKind::Console, GO, "fmt print", r"\bfmt\.(Print|Println|Printf|Scan|Scanln|Fprint\w*)\s*\("),
    (SignalKind::Console, JVM, "System.out", r"\bSystem\.(out|err)\.print"),
    (SignalKind::Console, RS, "print macro", r"\b(println|print|eprintln|eprint)!\s*\("),
    (SignalKind::Console, C_FAMILY, "stdio", r"\b(printf|puts|scanf|putchar|getchar)\s*\("),
    (SignalKind::Console, &[Language::Cpp], "iostream", r"\bstd::(cout|cerr|cin)\b|\bcout\s*<<"),
    (SignalKind::Console, &[Language::CSharp], "Console", r"\bConsole\.(Write|WriteLine|ReadLine)\s*\("),
    (SignalKind::Console, &[Language::Ruby], "puts", r"\b(puts|print|gets)\b"),
    (SignalKind::Console, &[Language::Php], "echo", r"\b(echo|print_r|var_dump)\b"),
    (SignalKind::Console, &[Language::Swift, Language::Kotlin], "print", r"\bprint(ln)?\s*\("),
    // File system
    (SignalKind::FileSystem, JS_TS, "fs module", r"\bfs\.\w+\s*\(|\breadFileSync\b|\bwriteFileSync\b"),
    (SignalKind::FileSystem, PY, "open", r"\bopen\s*\(|\bos\.(remove|mkdir|makedirs|rename)\s*\(|\bshutil\.\w+\s*\("),
    (SignalKind::FileSystem, GO, "os file", r"\bos\.(Open|Create|ReadFile|WriteFile|Remove|Mkdir\w*)\s*\("),
    (SignalKind::FileSystem, JVM, "java io", r"\bnew\s+File(Reader|Writer|InputStream|OutputStream)?\s*\(|\bFiles\.\w+\s*\("),
    (SignalKind::FileSystem, RS, "std fs", r"\b(fs|std::fs)::\w+\s*\(|\bFile::(open|create)\s*\("),
    (SignalKind::FileSystem, C_FAMILY, "stdio file", r"\bf(open|close|read|write|printf|scanf|gets|puts)\s*\("),
    // Network
    (SignalKind::Network, JS_TS, "fetch", r"\bfetch\s*\(|\baxios\.\w+\s*\(|\bXMLHttpRequest\b|\bhttp\.request\s*\("),
    (SignalKind::Network, PY, "requests", r"\brequests\.(get|post|put|delete|patch)\s*\(|\burlopen\s*\(|\bsocket\.socket\s*\("),
    (SignalKind::Network, GO, "net/http", r"\bhttp\.(Get|Post|ListenAndServe|NewRequest)\s*\(|\bnet\.(Dial|Listen)\s*\("),
    (SignalKind::Network, JVM, "http client", r"\bHttpClient\b|\bnew\s+URL\s*\(|\bnew\s+Socket\s*\("),
    (SignalKind::Network, RS, "net", r"\b(TcpStream|TcpListener|UdpSocket)::\w+\s*\(|\breqwest::\w+"),
    (SignalKind::Network, ANY, "server listen", r"\.listen\s*\("),
    // Process
    (SignalKind::Process, JS_TS, "process", r"\bprocess\.(exit|stdout|stdin|argv)\b|\bchild_process\b"),
    (SignalKind::Process, PY, "process", r"\bsys\.(exit|argv|stdin|stdout)\b|\bsubprocess\.\w+\s*\(|\bos\.system\s*\("),
    (SignalKind::Process, GO, "process", r"\bos\.(Exit|Args)\b|\bexec\.Command\s*\("),
    (SignalKind::Process, JVM, "process", r"\bSystem\.exit\s*\(|\bRuntime\.getRuntime\s*\("),
    (SignalKind::Process, RS, "process", r"\bstd::process::\w+|\bprocess::(exit|Command)\b|\benv::args\s*\("),
    (SignalKind::Process, C_FAMILY, "process", r"\b(exit|system|fork|exec\w*)\s*\("),
    // DOM
    (SignalKind::Dom, JS_TS, "dom", r"\bdocument\.\w+|\bwindow\.\w+|\.innerHTML\b|\baddEventListener\s*\("),
    (SignalKind::Dom, JS_TS, "alert", r"\balert\s*\("),
    // Storage
    (SignalKind::Storage, JS_TS, "web storage", r"\b(localStorage|sessionStorage)\.\w+"),
    (SignalKind::Storage, ANY, "database", r"\.(query|execute|commit|rollback)\s*\(|\bcursor\s*\("),
    // Random
    (SignalKind::Random, JS_TS, "Math.random", r"\bMath\.random\s*\(|\bcrypto\.randomUUID\s*\("),
    (SignalKind::Random, PY, "random", r"\brandom\.\w+\s*\(|\buuid\.uuid4\s*\("),
    (SignalKind::Random, GO, "math/rand", r"\brand\.\w+\s*\("),
    (SignalKind::Random, JVM, "Random", r"\bnew\s+Random\s*\(|\bMath\.random\s*\(|\bUUID\.randomUUID\s*\("),
    (SignalKind::Random, RS, "rand", r"\brand::\w+|\bthread_rng\s*\("),
    (SignalKind::Random, C_FAMILY, "rand", r"\bs?rand\s*\("),
    // Clock
    (SignalKind::Clock, JS_TS, "Date", r"\bDate\.now\s*\(|\bnew\s+Date\s*\(\s*\)|\bperformance\.now\s*\("),
    (SignalKind::Clock, PY, "time", r"\btime\.time\s*\(|\bdatetime\.(now|today|utcnow)\s*\("),
    (SignalKind::Clock, GO, "time.Now", r"\btime\.Now\s*\("),
    (SignalKind::Clock, JVM, "clock", r"\bSystem\.(currentTimeMillis|nanoTime)\s*\(|\b(LocalDateTime|Instant)\.now\s*\("),
    (SignalKind::Clock, RS, "clock", r"\b(SystemTime|Instant)::now\s*\("),
    (SignalKind::Clock, C_FAMILY, "time", r"\btime\s*\(\s*(NULL|0)?\s*\)|\bclock\s*\(\s*\)"),
    // Async
    (SignalKind::Async, JS_TS, "async/await", r"\basync\s+(function|\(|\w+\s*=>)|\bawait\s|\bnew\s+Promise\s*\(|\.then\s*\("),
    (SignalKind::Async, PY, "asyncio", r"\basync\s+def\b|\bawait\s|\basyncio\.\w+"),
    (SignalKind::Async, GO, "goroutine", r"\bgo\s+(func\b|\w+\s*\()|\bchan\b|<-"),
    (SignalKind::Async, JVM, "concurrency", r"\bCompletableFuture\b|\bnew\s+Thread\s*\(|\bExecutorService\b|\bsuspend\s+fun\b"),
    (SignalKind::Async, RS, "async", r"\basync\s+(fn|move|\{)|\.await\b|\bthread::spawn\s*\("),
    (SignalKind::Async, &[Language::CSharp], "async", r"\basync\s+Task\b|\bawait\s"),
];

static SIGNALS: Lazy<Vec<Signal>> = Lazy::new(|| {
    SIGNAL_SPECS
        .iter()
        .filter_map(|(kind, languages, label, pattern)| {
            Regex::new(pattern).ok().map(|pattern| Signal {
                kind: *kind,
                languages,
                label,
                pattern,
            })
        })
        .collect()
});

/// `process.env.X`, `os.environ["X"]`, `env::var("X")` and friends.
static ENV_VAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bprocess\.env\.([A-Za-z_][A-Za-z0-9_]*)",
        r#"\bprocess\.env\[\s*['"]([A-Za-z_][A-Za-z0-9_]*)['"]"#,
        r#"\bos\.environ\s*\[\s*['"]([A-Za-z_][A-Za-z0-9_]*)['"]"#,
        r#"\bos\.(?:environ\.get|getenv)\s*\(\s*['"]([A-Za-z_][A-Za-z0-9_]*)['"]"#,
        r#"\bos\.(?:Getenv|LookupEnv)\s*\(\s*"([A-Za-z_][A-Za-z0-9_]*)""#,
        r#"\benv::var(?:_os)?\s*\(\s*"([A-Za-z_][A-Za-z0-9_]*)""#,
        r#"\bSystem\.getenv\s*\(\s*"([A-Za-z_][A-Za-z0-9_]*)""#,
        r#"\bgetenv\s*\(\s*"([A-Za-z_][A-Za-z0-9_]*)""#,
        r#"\bENV\s*\[\s*['"]([A-Za-z_][A-Za-z0-9_]*)['"]"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// All signals matching `source`, in table order.
pub fn scan(source: &str, language: Language) -> Vec<SignalHit> {
    SIGNALS
        .iter()
        .filter(|signal| signal.applies_to(language))
        .filter_map(|signal| {
            let count = signal.pattern.find_iter(source).count();
            (count > 0).then_some(SignalHit {
                kind: signal.kind,
                label: signal.label,
                count,
            })
        })
        .collect()
}

/// Total side-effect occurrences (I/O plus DOM).
pub fn side_effect_count(hits: &[SignalHit]) -> usize {
    hits.iter()
        .filter(|hit| hit.kind.is_side_effect())
        .map(|hit| hit.count)
        .sum()
}

/// Environment variable names referenced by `source`, deduplicated in
/// first-seen order.
pub fn environment_variables(source: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut found: Vec<(usize, String)> = ENV_VAR_PATTERNS
        .iter()
        .flat_map(|pattern| {
            pattern
                .captures_iter(source)
                .filter_map(|caps| caps.get(1).map(|m| (m.start(), m.as_str().to_string())))
                .collect::<Vec<_>>()
        })
        .collect();
    found.sort();
    for (_, name) in found {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
