// Language registry: symbolic language ids to backend runtime ids
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Judge0 runtime identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BackendLanguageId(pub u32);

impl fmt::Display for BackendLanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How to run a language with a locally installed interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpreter {
    pub program: &'static str,
    pub file_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub backend_id: BackendLanguageId,
    pub aliases: &'static [&'static str],
    #[serde(skip)]
    pub interpreter: Option<Interpreter>,
}

pub const DEFAULT_LANGUAGE: &str = "javascript";

static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        id: "javascript",
        display_name: "JavaScript (Node.js 12.14.0)",
        backend_id: BackendLanguageId(63),
        aliases: &["js", "node"],
        interpreter: Some(Interpreter {
            program: "node",
            file_name: "main.js",
        }),
    },
    LanguageSpec {
        id: "typescript",
        display_name: "TypeScript (3.7.4)",
        backend_id: BackendLanguageId(74),
        aliases: &["ts"],
        interpreter: None,
    },
    LanguageSpec {
        id: "python",
        display_name: "Python (3.8.1)",
        backend_id: BackendLanguageId(71),
        aliases: &["py", "python3"],
        interpreter: Some(Interpreter {
            program: "python3",
            file_name: "main.py",
        }),
    },
    LanguageSpec {
        id: "java",
        display_name: "Java (OpenJDK 13.0.1)",
        backend_id: BackendLanguageId(62),
        aliases: &[],
        interpreter: None,
    },
    LanguageSpec {
        id: "cpp",
        display_name: "C++ (GCC 9.2.0)",
        backend_id: BackendLanguageId(54),
        aliases: &["c++"],
        interpreter: None,
    },
    LanguageSpec {
        id: "c",
        display_name: "C (GCC 9.2.0)",
        backend_id: BackendLanguageId(50),
        aliases: &[],
        interpreter: None,
    },
    LanguageSpec {
        id: "csharp",
        display_name: "C# (Mono 6.6.0.161)",
        backend_id: BackendLanguageId(51),
        aliases: &["cs", "c#"],
        interpreter: None,
    },
    LanguageSpec {
        id: "go",
        display_name: "Go (1.13.5)",
        backend_id: BackendLanguageId(60),
        aliases: &["golang"],
        interpreter: None,
    },
    LanguageSpec {
        id: "rust",
        display_name: "Rust (1.40.0)",
        backend_id: BackendLanguageId(73),
        aliases: &["rs"],
        interpreter: None,
    },
    LanguageSpec {
        id: "ruby",
        display_name: "Ruby (2.7.0)",
        backend_id: BackendLanguageId(72),
        aliases: &["rb"],
        interpreter: None,
    },
    LanguageSpec {
        id: "kotlin",
        display_name: "Kotlin (1.3.70)",
        backend_id: BackendLanguageId(78),
        aliases: &["kt"],
        interpreter: None,
    },
    LanguageSpec {
        id: "swift",
        display_name: "Swift (5.2.3)",
        backend_id: BackendLanguageId(83),
        aliases: &[],
        interpreter: None,
    },
    LanguageSpec {
        id: "php",
        display_name: "PHP (7.4.1)",
        backend_id: BackendLanguageId(68),
        aliases: &[],
        interpreter: None,
    },
];

/// Exact lookup by id or alias, case-insensitive.
pub fn lookup(id: &str) -> Option<&'static LanguageSpec> {
    let needle = id.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|lang| lang.id == needle || lang.aliases.iter().any(|alias| *alias == needle))
}

fn default_spec() -> &'static LanguageSpec {
    // DEFAULT_LANGUAGE is the first table entry
    &LANGUAGES[0]
}

/// Lookup that never fails: unknown ids resolve to the default language.
pub fn resolve_spec(id: &str) -> &'static LanguageSpec {
    match lookup(id) {
        Some(spec) => spec,
        None => {
            warn!(
                language = %id,
                default = DEFAULT_LANGUAGE,
                "Unknown language, falling back to default"
            );
            default_spec()
        }
    }
}

pub fn resolve_language(id: &str) -> BackendLanguageId {
    resolve_spec(id).backend_id
}

pub fn supported_languages() -> &'static [LanguageSpec] {
    LANGUAGES
}
