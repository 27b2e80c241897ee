//! Houdini-style name patterns.
//!
//! A pattern is a whitespace separated list of globs. `*` matches any run of
//! characters, `?` matches exactly one. A glob prefixed with `^` removes
//! names matched so far. Globs are applied left to right, so
//! `"* ^st"` selects everything except `st`, while `"^st *"` selects
//! everything.

/// One parsed glob.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Glob {
    chars: Vec<char>,
    exclude: bool,
}

/// Compiled name pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamePattern {
    globs: Vec<Glob>,
}

impl NamePattern {
    /// Parse a pattern string. An empty pattern matches nothing.
    pub fn new(pattern: &str) -> Self {
        let globs = pattern
            .split_whitespace()
            .filter_map(|tok| {
                let (exclude, body) = match tok.strip_prefix('^') {
                    Some(rest) => (true, rest),
                    None => (false, tok),
                };
                (!body.is_empty()).then(|| Glob {
                    chars: body.chars().collect(),
                    exclude,
                })
            })
            .collect();
        Self { globs }
    }

    /// Pattern matching every name.
    pub fn all() -> Self {
        Self::new("*")
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// True if `name` is selected.
    pub fn matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let mut selected = false;
        for glob in &self.globs {
            if selected == glob.exclude && glob_match(&glob.chars, &name) {
                selected = !glob.exclude;
            }
        }
        selected
    }
}

/// Iterative glob match with single-star backtracking.
fn glob_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some('?') => {
                p += 1;
                n += 1;
            }
            Some(&c) if c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                // let the last star swallow one more character
                Some((sp, sn)) => {
                    p = sp + 1;
                    n = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}
