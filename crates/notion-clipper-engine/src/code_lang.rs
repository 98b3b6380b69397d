//! Code language resolution: allow-list, aliases and a scored heuristic.

use std::sync::OnceLock;

use regex::Regex;

pub const PLAIN_TEXT: &str = "plain text";

/// Languages the document API accepts for code blocks.
pub const LANGUAGES: &[&str] = &[
    "abap", "agda", "arduino", "ascii art", "assembly", "bash", "basic", "bnf", "c", "c#",
    "c++", "clojure", "coffeescript", "coq", "css", "dart", "dhall", "diff", "docker", "ebnf",
    "elixir", "elm", "erlang", "f#", "flow", "fortran", "gherkin", "glsl", "go", "graphql",
    "groovy", "haskell", "hcl", "html", "idris", "java", "javascript", "json", "julia",
    "kotlin", "latex", "less", "lisp", "livescript", "llvm ir", "lua", "makefile", "markdown",
    "markup", "matlab", "mathematica", "mermaid", "nix", "notion formula", "objective-c",
    "ocaml", "pascal", "perl", "php", "plain text", "powershell", "prolog", "protobuf",
    "purescript", "python", "r", "racket", "reason", "ruby", "rust", "sass", "scala",
    "scheme", "scss", "shell", "smalltalk", "solidity", "sql", "swift", "toml", "typescript",
    "vb.net", "verilog", "vhdl", "visual basic", "webassembly", "xml", "yaml", "java/c/c++/c#",
];

/// Common fence names mapped onto allow-list entries.
const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("node", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("zsh", "shell"),
    ("console", "shell"),
    ("yml", "yaml"),
    ("cpp", "c++"),
    ("cxx", "c++"),
    ("cc", "c++"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("fsharp", "f#"),
    ("md", "markdown"),
    ("golang", "go"),
    ("kt", "kotlin"),
    ("objc", "objective-c"),
    ("ps1", "powershell"),
    ("proto", "protobuf"),
    ("dockerfile", "docker"),
    ("tex", "latex"),
    ("text", "plain text"),
    ("txt", "plain text"),
    ("plaintext", "plain text"),
    ("vb", "visual basic"),
    ("wasm", "webassembly"),
    ("make", "makefile"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("ml", "ocaml"),
    ("pl", "perl"),
    ("htm", "html"),
    ("svg", "xml"),
    ("tf", "hcl"),
];

/// Per-language signal patterns, in tie-break order.
const SIGNALS: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            r"(?m)^\s*def \w+\(.*\)\s*(->.*)?:\s*$",
            r"(?m)^\s*import \w+\s*$",
            r"(?m)^\s*from [\w.]+ import ",
            r"\bprint\(",
            r"(?m)^\s*class \w+(\(.*\))?:\s*$",
            r"\bself\.",
            r"(?m)^\s*(if|elif|for|while) .*:\s*$",
            r"\b(None|True|False)\b",
        ],
    ),
    (
        "javascript",
        &[
            r"\bconst \w+ =",
            r"\blet \w+ =",
            r"\bfunction\s*\w*\(",
            r"=>",
            r"console\.log\(",
            r"\brequire\(",
            r"\bdocument\.",
            r"(?m)^\s*export (default|const|function)\b",
        ],
    ),
    (
        "typescript",
        &[
            r":\s*(string|number|boolean|any|void)\b",
            r"\binterface \w+\s*\{",
            r"\btype \w+ =",
            r#"(?m)^\s*import .* from ['"]"#,
            r"\bas (string|number|const)\b",
        ],
    ),
    (
        "rust",
        &[
            r"\bfn \w+",
            r"\blet mut\b",
            r"\bimpl\b",
            r"\bpub (fn|struct|enum|mod)\b",
            r"\w+!\(",
            r"->\s*[A-Z&]\w*",
            r"\bmatch \w+ \{",
            r"\buse \w+::",
        ],
    ),
    (
        "go",
        &[
            r"(?m)^package \w+",
            r"\bfunc \w+\(",
            r":=",
            r"\bfmt\.\w+\(",
            r"(?m)^import \(",
        ],
    ),
    (
        "java",
        &[
            r"\bpublic (static )?(class|void)\b",
            r"System\.out\.println\(",
            r"\bprivate \w+ \w+;",
            r"@Override",
            r"\bnew \w+\(",
        ],
    ),
    (
        "c#",
        &[
            r"\busing System",
            r"\bnamespace \w+",
            r"Console\.WriteLine\(",
            r"\bpublic (async )?Task\b",
            r"\bvar \w+ =",
        ],
    ),
    (
        "c++",
        &[
            r"#include <\w+>",
            r"std::",
            r"\bcout\s*<<",
            r"\btemplate\s*<",
            r"\bnullptr\b",
        ],
    ),
    (
        "c",
        &[
            r"#include <\w+\.h>",
            r"\bprintf\(",
            r"\bint main\(",
            r"\bmalloc\(",
        ],
    ),
    (
        "php",
        &[
            r"<\?php",
            r"\$\w+\s*=",
            r"\becho\b",
            r"\bfunction \w+\(\$",
        ],
    ),
    (
        "ruby",
        &[
            r"(?m)^\s*def \w+[^:]*$",
            r"(?m)^\s*end\s*$",
            r"\bputs\b",
            r"\.each do\b",
            r#"(?m)^\s*require ['"]"#,
        ],
    ),
    (
        "shell",
        &[
            r"(?m)^#!/(usr/)?bin/(env )?(ba)?sh",
            r"(?m)^\s*(sudo|apt|apt-get|npm|pip|cd|ls|echo|export|curl|git|brew|cargo) ",
            r"\$\{\w+\}",
            r"\|\s*grep\b",
            r"(?m)^\s*\$ \w+",
        ],
    ),
    (
        "sql",
        &[
            r"(?i)\bselect\b.+\bfrom\b",
            r"(?i)\binsert into\b",
            r"(?i)\bcreate table\b",
            r"(?i)\bwhere\b",
            r"(?i)\bupdate \w+ set\b",
            r"(?i)\b(inner |left |right )?join\b",
        ],
    ),
    (
        "html",
        &[
            r"(?i)<!DOCTYPE html>",
            r"<(html|head|body|div|span|p|a|ul|li)\b[^>]*>",
            r"</\w+>",
        ],
    ),
    (
        "css",
        &[
            r"(?m)^\s*[.#]?[\w-]+(\s*[,>]\s*[.#]?[\w-]+)*\s*\{\s*$",
            r"(?m)^\s*[\w-]+\s*:\s*[^;]+;\s*$",
            r"@media\b",
        ],
    ),
    (
        "json",
        &[
            r"^\s*[\[{]",
            r#""\w+"\s*:"#,
            r"[\]}]\s*$",
        ],
    ),
    (
        "yaml",
        &[
            r"(?m)^\w[\w-]*:\s*$",
            r"(?m)^\s+- \w+",
            r"(?m)^\w[\w-]*: \S",
            r"^---\s*$",
        ],
    ),
];

fn signals() -> &'static [(&'static str, Vec<Regex>)] {
    static COMPILED: OnceLock<Vec<(&'static str, Vec<Regex>)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        SIGNALS
            .iter()
            .map(|(lang, patterns)| {
                let res = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("Invalid language signal regex"))
                    .collect();
                (*lang, res)
            })
            .collect()
    })
}

/// Punctuation and statement shapes that do not occur in prose. Keyword
/// signals alone (`where`, `join`, `Note:`) are not enough to call text code.
const SYNTAX_MARKERS: &[&str] = &[
    r"(?m);\s*$",
    r"[{}]",
    r"=>|::|:=|->|==|!=|&&|\|\|",
    r"(?m)^\s*(def|class) \w+.*:\s*$",
    r"(?m)^\s*(#include|#!/|<\?php|\$ \w)",
    r"</\w+>",
];

/// Whether `code` has at least one syntax-only marker.
pub fn has_syntax_markers(code: &str) -> bool {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED
        .get_or_init(|| {
            SYNTAX_MARKERS
                .iter()
                .map(|p| Regex::new(p).expect("Invalid syntax marker regex"))
                .collect()
        })
        .iter()
        .any(|re| re.is_match(code))
}

pub fn is_known_language(name: &str) -> bool {
    LANGUAGES.contains(&name)
}

/// Maps a fence name onto the allow-list, through aliases if needed.
pub fn normalize_language(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|l| **l == lower)
        .or_else(|| ALIASES.iter().find(|(a, _)| *a == lower).map(|(_, l)| l))
        .copied()
}

/// Scores `code` against every language's signals.
///
/// Returns the best language and its score; ties keep the earlier language.
pub fn score_language(code: &str) -> Option<(&'static str, usize)> {
    let mut best: Option<(&'static str, usize)> = None;
    for (lang, patterns) in signals() {
        let score = patterns.iter().filter(|re| re.is_match(code)).count();
        if score > 0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((lang, score));
        }
    }
    best
}

/// Picks a language for a code block.
///
/// An explicit fence language wins when it is known; otherwise the heuristic
/// decides, falling back to plain text.
pub fn resolve_language(explicit: Option<&str>, code: &str) -> String {
    if let Some(lang) = explicit.and_then(normalize_language) {
        return lang.to_string();
    }
    score_language(code)
        .map_or(PLAIN_TEXT, |(lang, _)| lang)
        .to_string()
}
