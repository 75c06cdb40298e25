//! Long-option spec parsing.
//!
//! A spec string names any number of long options separated by blanks,
//! commas or pipes. Each name may start with `--`; a trailing `:` means the
//! option requires an argument and `::` means it takes an optional one:
//!
//! ```text
//! --verbose, output: color::|dry-run
//! ```

use getopt::{HasArg, LongOpt};
use tracing::{debug, trace};

const SEPARATORS: &[char] = &[' ', '\t', '\r', '\n', '|', ','];

/// `s` without ASCII punctuation.
pub fn strip_punct(s: &str) -> String {
    s.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// The long options known to one invocation, in registration order.
#[derive(Debug, Default, Clone)]
pub struct LongOptionTable {
    options: Vec<LongOpt>,
}

impl LongOptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LongOpt> {
        self.options.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.name == name)
    }

    pub fn as_slice(&self) -> &[LongOpt] {
        &self.options
    }

    /// Register `name`, or update the argument requirement of an existing
    /// entry in place. Returns the entry's index, or `None` when the name
    /// is unusable.
    pub fn add(&mut self, name: &str, has_arg: HasArg) -> Option<usize> {
        if name.is_empty() || name.starts_with('-') || name.ends_with(':') {
            return None;
        }

        if let Some(index) = self.position(name) {
            self.options[index].has_arg = has_arg;
            trace!(name, ?has_arg, "updated long option");
            return Some(index);
        }

        self.options.push(LongOpt::new(name, has_arg));
        trace!(name, ?has_arg, "added long option");
        Some(self.options.len() - 1)
    }

    /// Add every option named in `spec`. With `normalize_punct`, a name
    /// containing punctuation also registers its punctuation-free alias.
    ///
    /// Returns the number of tokens that could not be registered; all
    /// tokens are processed regardless.
    pub fn add_spec(&mut self, spec: &str, normalize_punct: bool) -> usize {
        let mut failures = 0;

        for token in spec.split(SEPARATORS).filter(|t| !t.is_empty()) {
            let (name, has_arg) = parse_token(token);

            if self.add(name, has_arg).is_none() {
                debug!(token, "illegal long option");
                failures += 1;
                continue;
            }

            if normalize_punct {
                let alias = strip_punct(name);
                // An all-punctuation name has no alias.
                if !alias.is_empty() && alias != name {
                    let _ = self.add(&alias, has_arg);
                }
            }
        }

        failures
    }
}

/// Split a spec token into the option name and its argument requirement.
fn parse_token(token: &str) -> (&str, HasArg) {
    let mut name = token;
    if name.len() >= 3 && name.starts_with("--") {
        name = &name[2..];
    }

    if name.len() >= 3 && name.ends_with("::") {
        (&name[..name.len() - 2], HasArg::Optional)
    } else if name.len() >= 2 && name.ends_with(':') {
        (&name[..name.len() - 1], HasArg::Required)
    } else {
        (name, HasArg::No)
    }
}
