//! Compiled wildcard patterns.
//!
//! Supported syntax:
//! - `*` matches zero or more characters, including `/`
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` match one character from a set or range
//! - `[!abc]` or `[^abc]` match one character NOT in the set
//! - `{a,b,c}` expands to alternatives (nesting allowed)
//! - `\x` matches `x` literally

/// Upper bound on recursive match steps per alternative. Patterns like
/// `*a*a*a*...*b` backtrack polynomially; past this bound the name is
/// reported as a non-match.
const MAX_MATCH_CALLS: usize = 100_000;

/// Upper bound on brace alternatives per pattern. A pattern expanding to
/// more than this is kept whole and its braces match literally.
pub const MAX_ALTERNATIVES: usize = 1024;

/// Escape wildcard metacharacters so `text` matches only itself.
///
/// ```
/// use pakfs_glob::{escape, Pattern};
/// let dir = escape("gfx[1]/");
/// assert!(Pattern::new(&format!("{dir}*")).matches("gfx[1]/hero.png"));
/// assert!(!Pattern::new(&format!("{dir}*")).matches("gfx1/hero.png"));
/// ```
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | ',' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A wildcard pattern with braces expanded up front.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    case_insensitive: bool,
    alternatives: Vec<Vec<char>>,
}

impl Pattern {
    /// Compile a case-sensitive pattern.
    pub fn new(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            case_insensitive: false,
            alternatives: Self::compile(pattern, false),
        }
    }

    /// Enable or disable case folding for both the pattern and the names it
    /// is matched against.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        if case_insensitive != self.case_insensitive {
            self.case_insensitive = case_insensitive;
            self.alternatives = Self::compile(&self.source, case_insensitive);
        }
        self
    }

    /// The pattern text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if any brace alternative matches the whole of `input`.
    pub fn matches(&self, input: &str) -> bool {
        let input = fold(input, self.case_insensitive);
        self.alternatives.iter().any(|alt| {
            Matcher {
                pattern: alt,
                input: &input,
                calls: 0,
            }
            .run(0, 0)
        })
    }

    fn compile(pattern: &str, case_insensitive: bool) -> Vec<Vec<char>> {
        expand_braces(pattern)
            .iter()
            .map(|alt| fold(alt, case_insensitive))
            .collect()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn fold(s: &str, case_insensitive: bool) -> Vec<char> {
    if case_insensitive {
        s.chars().flat_map(char::to_lowercase).collect()
    } else {
        s.chars().collect()
    }
}

/// Expand the brace groups in a pattern into its alternatives.
///
/// Backslash-escaped braces and commas are not special. If the expansion
/// would exceed [`MAX_ALTERNATIVES`], the pattern is returned unexpanded.
///
/// ```
/// use pakfs_glob::expand_braces;
/// assert_eq!(expand_braces("hero.png"), vec!["hero.png"]);
/// assert_eq!(expand_braces("a{b,c}d"), vec!["abd", "acd"]);
/// assert_eq!(expand_braces("{x,y{1,2}}"), vec!["x", "y1", "y2"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let mut out = Vec::new();
    if expand_into(pattern, &mut out) {
        out
    } else {
        vec![pattern.to_string()]
    }
}

/// Depth-first expansion into `out`. Returns false as soon as the bound
/// is hit, so the work done is bounded too.
fn expand_into(pattern: &str, out: &mut Vec<String>) -> bool {
    let Some((prefix, body, suffix)) = first_group(pattern) else {
        if out.len() >= MAX_ALTERNATIVES {
            return false;
        }
        out.push(pattern.to_string());
        return true;
    };

    split_alternatives(&body)
        .into_iter()
        .all(|alt| expand_into(&format!("{prefix}{alt}{suffix}"), out))
}

/// Split off the first top-level brace group as (prefix, body, suffix).
fn first_group(pattern: &str) -> Option<(String, String, String)> {
    let chars: Vec<char> = pattern.chars().collect();

    let mut depth = 0usize;
    let mut open = 0;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => {
                if depth == 0 {
                    open = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some((
                        chars[..open].iter().collect(),
                        chars[open + 1..i].iter().collect(),
                        chars[i + 1..].iter().collect(),
                    ));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split a brace body on top-level, unescaped commas.
fn split_alternatives(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Backtracking matcher for a single brace-free alternative.
struct Matcher<'a> {
    pattern: &'a [char],
    input: &'a [char],
    calls: usize,
}

impl Matcher<'_> {
    fn run(&mut self, pi: usize, ii: usize) -> bool {
        self.calls += 1;
        if self.calls > MAX_MATCH_CALLS {
            return false;
        }

        let Some(&p) = self.pattern.get(pi) else {
            return ii == self.input.len();
        };

        match p {
            '*' => {
                let mut next = pi;
                while self.pattern.get(next) == Some(&'*') {
                    next += 1;
                }
                if next == self.pattern.len() {
                    return true;
                }
                (ii..=self.input.len()).any(|start| self.run(next, start))
            }
            '?' => ii < self.input.len() && self.run(pi + 1, ii + 1),
            '[' => match (self.input.get(ii), class_end(self.pattern, pi)) {
                (Some(&ch), Some(end)) => {
                    class_matches(&self.pattern[pi + 1..end - 1], ch) && self.run(end, ii + 1)
                }
                // Unclosed bracket is a literal '['.
                (Some(&ch), None) => ch == '[' && self.run(pi + 1, ii + 1),
                (None, _) => false,
            },
            '\\' if pi + 1 < self.pattern.len() => {
                self.input.get(ii) == Some(&self.pattern[pi + 1]) && self.run(pi + 2, ii + 1)
            }
            literal => self.input.get(ii) == Some(&literal) && self.run(pi + 1, ii + 1),
        }
    }
}

/// Index one past the `]` closing the class opened at `open`.
///
/// A `]` directly after `[` (or after `[!`) is a member, not the terminator.
fn class_end(pattern: &[char], open: usize) -> Option<usize> {
    let mut idx = open + 1;
    if matches!(pattern.get(idx), Some('!' | '^')) {
        idx += 1;
    }
    let first = idx;
    while idx < pattern.len() {
        if pattern[idx] == ']' && idx > first {
            return Some(idx + 1);
        }
        idx += 1;
    }
    None
}

fn class_matches(body: &[char], ch: char) -> bool {
    let (negate, body) = match body.first() {
        Some('!' | '^') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut matched = false;
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            matched |= body[i] <= ch && ch <= body[i + 2];
            i += 3;
        } else {
            matched |= body[i] == ch;
            i += 1;
        }
    }
    matched != negate
}
