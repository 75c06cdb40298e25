//! Native Rust implementation of GNU `getopt_long`.
//!
//! The scanner reproduces glibc's matching rules exactly:
//! - short option clusters (`-abc`), attached or detached arguments
//! - optional arguments (`a::`) only in attached form
//! - `--name`, `--name=value`, unambiguous prefix matching
//! - argument permutation, `+`/`-` ordering prefixes and `POSIXLY_CORRECT`
//! - a leading `:` to tell missing arguments apart from bad options
//! - `W;` turning `-W foo` into `--foo`
//!
//! Unlike the C interface it never prints. Every problem is returned as an
//! [`Error`] whose `Display` carries the familiar glibc wording, and the
//! caller decides whether and how to report it.

use std::sync::RwLock;

// ============================================================================
// Error type
// ============================================================================

/// A problem found while scanning the argument vector.
///
/// `prefix` is the text that introduced the long option, `"--"` normally
/// or `"-W "` when the option arrived through `-W`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidOption(char),
    MissingArgument(char),
    Unrecognized {
        prefix: &'static str,
        text: String,
    },
    Ambiguous {
        prefix: &'static str,
        name: String,
        candidates: Vec<String>,
    },
    UnwantedArgument {
        prefix: &'static str,
        name: String,
    },
    MissingLongArgument {
        prefix: &'static str,
        name: String,
    },
}

impl Error {
    /// True for the two "requires an argument" variants.
    pub fn is_missing_argument(&self) -> bool {
        matches!(
            self,
            Error::MissingArgument(_) | Error::MissingLongArgument { .. }
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidOption(c) => write!(f, "invalid option -- '{}'", c),
            Error::MissingArgument(c) => write!(f, "option requires an argument -- '{}'", c),
            Error::Unrecognized { prefix, text } => {
                write!(f, "unrecognized option '{}{}'", prefix, text)
            }
            Error::Ambiguous {
                prefix,
                name,
                candidates,
            } => {
                write!(f, "option '{}{}' is ambiguous; possibilities:", prefix, name)?;
                for candidate in candidates {
                    write!(f, " '{}{}'", prefix, candidate)?;
                }
                Ok(())
            }
            Error::UnwantedArgument { prefix, name } => {
                write!(f, "option '{}{}' doesn't allow an argument", prefix, name)
            }
            Error::MissingLongArgument { prefix, name } => {
                write!(f, "option '{}{}' requires an argument", prefix, name)
            }
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Option tables
// ============================================================================

/// Whether an option takes an argument (`no_argument`, `required_argument`,
/// `optional_argument`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasArg {
    No,
    Required,
    Optional,
}

/// One long option. Its identity is its index in the slice handed to
/// [`Getopt::new`]; [`Event::Long`] reports that index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongOpt {
    pub name: String,
    pub has_arg: HasArg,
}

impl LongOpt {
    pub fn new(name: &str, has_arg: HasArg) -> Self {
        LongOpt {
            name: name.to_string(),
            has_arg,
        }
    }
}

/// How non-option arguments are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Stop at the first non-option (`+` prefix or `POSIXLY_CORRECT`).
    RequireOrder,
    /// Move non-options to the end of the vector (the default).
    Permute,
    /// Hand non-options back in place as [`Event::Operand`] (`-` prefix).
    ReturnInOrder,
}

enum ShortSpec {
    Opt(HasArg),
    LongAlias,
}

// ============================================================================
// Events
// ============================================================================

/// One step of the scan, the equivalent of a `getopt_long` return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A short option and its argument, if it took one.
    Short(char, Option<String>),
    /// A long option, by table index, and its argument.
    Long(usize, Option<String>),
    /// A non-option in [`Ordering::ReturnInOrder`] mode (return value 1).
    Operand(String),
    /// A missing argument while the optstring starts with `:` (return `':'`).
    MissingArgument(Error),
    /// Any other problem (return `'?'`).
    BadOption(Error),
}

// ============================================================================
// Scanner
// ============================================================================

/// The scanner state for one argument vector.
///
/// `argv[0]` is the program name and is never scanned. When the iterator is
/// exhausted, [`Getopt::operands`] is the list of remaining operands, in the
/// possibly permuted vector.
pub struct Getopt<'a> {
    argv: Vec<String>,
    optstring: Vec<char>,
    longopts: &'a [LongOpt],
    ordering: Ordering,
    colon: bool,
    optind: usize,
    nextchar: String,
    first_nonopt: usize,
    last_nonopt: usize,
    finished: bool,
    terminated: bool,
}

fn is_nonoption(arg: &str) -> bool {
    !arg.starts_with('-') || arg.len() == 1
}

impl<'a> Getopt<'a> {
    /// Create a scanner, consulting `POSIXLY_CORRECT` for the default
    /// ordering.
    pub fn new(argv: Vec<String>, optstring: &str, longopts: &'a [LongOpt]) -> Self {
        let posixly_correct = std::env::var_os("POSIXLY_CORRECT").is_some();
        Self::with_posixly_correct(argv, optstring, longopts, posixly_correct)
    }

    pub fn with_posixly_correct(
        argv: Vec<String>,
        optstring: &str,
        longopts: &'a [LongOpt],
        posixly_correct: bool,
    ) -> Self {
        let (ordering, rest) = if let Some(rest) = optstring.strip_prefix('-') {
            (Ordering::ReturnInOrder, rest)
        } else if let Some(rest) = optstring.strip_prefix('+') {
            (Ordering::RequireOrder, rest)
        } else if posixly_correct {
            (Ordering::RequireOrder, optstring)
        } else {
            (Ordering::Permute, optstring)
        };

        Getopt {
            argv,
            optstring: rest.chars().collect(),
            longopts,
            ordering,
            colon: rest.starts_with(':'),
            optind: 1,
            nextchar: String::new(),
            first_nonopt: 1,
            last_nonopt: 1,
            finished: false,
            terminated: false,
        }
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    /// Index of the next element to be scanned.
    pub fn optind(&self) -> usize {
        self.optind
    }

    /// The argument vector in its current (possibly permuted) order.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Everything from `optind` on. After the scan ends these are the
    /// operands.
    pub fn operands(&self) -> &[String] {
        let start = self.optind.min(self.argv.len());
        &self.argv[start..]
    }

    /// Whether scanning ended on a `--` element.
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// The unscanned rest of the current short-option cluster.
    pub fn pending(&self) -> &str {
        &self.nextchar
    }

    pub fn into_operands(mut self) -> Vec<String> {
        let start = self.optind.min(self.argv.len());
        self.argv.split_off(start)
    }

    fn lookup_short(&self, c: char) -> Option<ShortSpec> {
        if c == ':' || c == ';' {
            return None;
        }
        let pos = self.optstring.iter().position(|&x| x == c)?;
        let next = self.optstring.get(pos + 1).copied();
        let after = self.optstring.get(pos + 2).copied();

        if c == 'W' && next == Some(';') {
            return Some(ShortSpec::LongAlias);
        }
        Some(match (next, after) {
            (Some(':'), Some(':')) => ShortSpec::Opt(HasArg::Optional),
            (Some(':'), _) => ShortSpec::Opt(HasArg::Required),
            _ => ShortSpec::Opt(HasArg::No),
        })
    }

    fn missing(&self, err: Error) -> Event {
        if self.colon {
            Event::MissingArgument(err)
        } else {
            Event::BadOption(err)
        }
    }

    /// Swap the block of skipped non-options `[first_nonopt, last_nonopt)`
    /// with the options scanned since, `[last_nonopt, optind)`.
    fn exchange(&mut self) {
        let (first, last, top) = (self.first_nonopt, self.last_nonopt, self.optind);
        self.argv[first..top].rotate_left(last - first);
        self.first_nonopt += top - last;
        self.last_nonopt = top;
    }

    /// Advance to the next element that may hold options. Returns `None`
    /// once scanning is over.
    fn advance(&mut self) -> Option<Event> {
        let argc = self.argv.len();

        if self.last_nonopt > self.optind {
            self.last_nonopt = self.optind;
        }
        if self.first_nonopt > self.optind {
            self.first_nonopt = self.optind;
        }

        if self.ordering == Ordering::Permute {
            if self.first_nonopt != self.last_nonopt && self.last_nonopt != self.optind {
                self.exchange();
            } else if self.last_nonopt != self.optind {
                self.first_nonopt = self.optind;
            }
            while self.optind < argc && is_nonoption(&self.argv[self.optind]) {
                self.optind += 1;
            }
            self.last_nonopt = self.optind;
        }

        if self.optind != argc && self.argv[self.optind] == "--" {
            self.optind += 1;
            self.terminated = true;
            if self.first_nonopt != self.last_nonopt && self.last_nonopt != self.optind {
                self.exchange();
            } else if self.first_nonopt == self.last_nonopt {
                self.first_nonopt = self.optind;
            }
            self.last_nonopt = argc;
            self.optind = argc;
        }

        if self.optind == argc {
            if self.first_nonopt != self.last_nonopt {
                self.optind = self.first_nonopt;
            }
            self.finished = true;
            return None;
        }

        if is_nonoption(&self.argv[self.optind]) {
            if self.ordering == Ordering::RequireOrder {
                self.finished = true;
                return None;
            }
            let operand = self.argv[self.optind].clone();
            self.optind += 1;
            return Some(Event::Operand(operand));
        }

        let arg = self.argv[self.optind].clone();
        if let Some(text) = arg.strip_prefix("--") {
            return Some(self.long_option(text, "--"));
        }
        self.nextchar = arg[1..].to_string();
        self.short_option()
    }

    fn short_option(&mut self) -> Option<Event> {
        let pending = std::mem::take(&mut self.nextchar);
        let mut chars = pending.chars();
        let c = chars.next()?;
        let rest = chars.as_str().to_string();

        // optind moves on as soon as the last character of a cluster is taken
        if rest.is_empty() {
            self.optind += 1;
        }

        let spec = match self.lookup_short(c) {
            Some(spec) => spec,
            None => {
                self.nextchar = rest;
                return Some(Event::BadOption(Error::InvalidOption(c)));
            }
        };

        let event = match spec {
            ShortSpec::LongAlias => {
                let text = if !rest.is_empty() {
                    rest
                } else if self.optind == self.argv.len() {
                    return Some(self.missing(Error::MissingArgument(c)));
                } else {
                    self.argv[self.optind].clone()
                };
                self.long_option(&text, "-W ")
            }
            ShortSpec::Opt(HasArg::No) => {
                self.nextchar = rest;
                Event::Short(c, None)
            }
            ShortSpec::Opt(HasArg::Optional) => {
                if rest.is_empty() {
                    Event::Short(c, None)
                } else {
                    self.optind += 1;
                    Event::Short(c, Some(rest))
                }
            }
            ShortSpec::Opt(HasArg::Required) => {
                if !rest.is_empty() {
                    self.optind += 1;
                    Event::Short(c, Some(rest))
                } else if self.optind == self.argv.len() {
                    self.missing(Error::MissingArgument(c))
                } else {
                    let value = self.argv[self.optind].clone();
                    self.optind += 1;
                    Event::Short(c, Some(value))
                }
            }
        };
        Some(event)
    }

    /// Resolve `text` (everything after the prefix) against the long
    /// option table. The element holding it is always consumed.
    fn long_option(&mut self, text: &str, prefix: &'static str) -> Event {
        self.nextchar.clear();
        self.optind += 1;

        let (name, value) = match text.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (text, None),
        };

        let index = match self.longopts.iter().position(|o| o.name == name) {
            Some(index) => index,
            None => {
                let matches: Vec<usize> = self
                    .longopts
                    .iter()
                    .enumerate()
                    .filter(|(_, o)| o.name.starts_with(name))
                    .map(|(i, _)| i)
                    .collect();
                match matches.as_slice() {
                    [] => {
                        return Event::BadOption(Error::Unrecognized {
                            prefix,
                            text: text.to_string(),
                        })
                    }
                    [index] => *index,
                    _ => {
                        return Event::BadOption(Error::Ambiguous {
                            prefix,
                            name: name.to_string(),
                            candidates: matches
                                .iter()
                                .map(|&i| self.longopts[i].name.clone())
                                .collect(),
                        })
                    }
                }
            }
        };

        let opt = &self.longopts[index];
        match (value, opt.has_arg) {
            (Some(_), HasArg::No) => Event::BadOption(Error::UnwantedArgument {
                prefix,
                name: opt.name.clone(),
            }),
            (Some(value), _) => Event::Long(index, Some(value.to_string())),
            (None, HasArg::Required) => {
                if self.optind < self.argv.len() {
                    let value = self.argv[self.optind].clone();
                    self.optind += 1;
                    Event::Long(index, Some(value))
                } else {
                    self.missing(Error::MissingLongArgument {
                        prefix,
                        name: opt.name.clone(),
                    })
                }
            }
            (None, _) => Event::Long(index, None),
        }
    }
}

impl Iterator for Getopt<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.finished {
            return None;
        }
        if self.nextchar.is_empty() {
            self.advance()
        } else {
            self.short_option()
        }
    }
}

// ============================================================================
// Program name
// ============================================================================

static PROGRAM_NAME: RwLock<Option<String>> = RwLock::new(None);

/// The name diagnostics are attributed to. Falls back to the basename of
/// the running executable.
pub fn program_name() -> String {
    let current = PROGRAM_NAME
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    current.unwrap_or_else(|| {
        std::env::args()
            .next()
            .map(|arg0| match arg0.rsplit_once('/') {
                Some((_, base)) => base.to_string(),
                None => arg0,
            })
            .unwrap_or_default()
    })
}

fn replace_program_name(name: Option<String>) -> Option<String> {
    let mut slot = PROGRAM_NAME.write().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *slot, name)
}

/// Sets the process-wide program name for as long as the guard lives.
///
/// Dropping it puts the previous name back, so guards nest: an inner
/// invocation restores the outer name, the outer one restores whatever
/// was there before.
pub struct ProgramNameGuard {
    saved: Option<String>,
}

impl ProgramNameGuard {
    pub fn set(name: &str) -> Self {
        let saved = replace_program_name(Some(name.to_string()));
        ProgramNameGuard { saved }
    }
}

impl Drop for ProgramNameGuard {
    fn drop(&mut self) {
        replace_program_name(self.saved.take());
    }
}
