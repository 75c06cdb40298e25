//! Classification of the input vector.
//!
//! [`Classifier`] wraps the scanner and turns its events into [`Step`]s.
//! It also decides when a digit option continues the previous digit
//! token. Digits merge only when they come out of the same argv element,
//! so `-123` stays `-123` while `-1 foo -2` gives `-1` and `-2`.

use getopt::{Error as OptError, Event, Getopt, LongOpt};
use tracing::trace;

/// One classified element of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A short option. `joined` digits extend the previous token.
    Short {
        opt: char,
        arg: Option<String>,
        joined: bool,
    },
    /// A long option, by index into the long-option table.
    Long { index: usize, arg: Option<String> },
    /// A non-option handed back in place (short spec starting with `-`).
    Operand(String),
    MissingArgument(OptError),
    UnknownOption(OptError),
}

impl Step {
    pub fn is_error(&self) -> bool {
        matches!(self, Step::MissingArgument(_) | Step::UnknownOption(_))
    }

    pub fn error(&self) -> Option<&OptError> {
        match self {
            Step::MissingArgument(err) | Step::UnknownOption(err) => Some(err),
            _ => None,
        }
    }
}

pub struct Classifier<'a> {
    getopt: Getopt<'a>,
    concat_numbers: bool,
    /// The argv element the current step was read from.
    position: usize,
    last_digit_position: Option<usize>,
    in_digit_run: bool,
}

impl<'a> Classifier<'a> {
    /// `argv[0]` is the display name. `shortopts` is used as given.
    pub fn new(
        argv: Vec<String>,
        shortopts: &str,
        longopts: &'a [LongOpt],
        concat_numbers: bool,
    ) -> Self {
        Self::from_getopt(Getopt::new(argv, shortopts, longopts), concat_numbers)
    }

    pub fn from_getopt(getopt: Getopt<'a>, concat_numbers: bool) -> Self {
        let position = getopt.optind();
        Classifier {
            getopt,
            concat_numbers,
            position,
            last_digit_position: None,
            in_digit_run: false,
        }
    }

    /// Operands left once classification has ended.
    pub fn into_operands(self) -> Vec<String> {
        self.getopt.into_operands()
    }

    /// Catch up with `optind` after the scanner skipped operands while
    /// permuting: step over elements that cannot hold options.
    fn resync(&mut self) {
        let argv = self.getopt.argv();
        while self.position < argv.len() && !argv[self.position].starts_with('-') {
            self.position += 1;
        }
    }
}

impl Iterator for Classifier<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let event = self.getopt.next()?;

        if self.concat_numbers && self.getopt.optind() != self.position {
            self.resync();
        }

        let step = match event {
            Event::Short(opt, arg) if self.concat_numbers && opt.is_ascii_digit() => {
                let joined = self.in_digit_run && self.last_digit_position == Some(self.position);
                self.in_digit_run = true;
                self.last_digit_position = Some(self.position);
                Step::Short { opt, arg, joined }
            }
            other => {
                self.in_digit_run = false;
                match other {
                    Event::Short(opt, arg) => Step::Short {
                        opt,
                        arg,
                        joined: false,
                    },
                    Event::Long(index, arg) => Step::Long { index, arg },
                    Event::Operand(value) => Step::Operand(value),
                    Event::MissingArgument(err) => Step::MissingArgument(err),
                    Event::BadOption(err) => Step::UnknownOption(err),
                }
            }
        };

        trace!(?step, position = self.position, optind = self.getopt.optind(), "classified");
        self.position = self.getopt.optind();
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use getopt::HasArg;

    fn classify(
        shortopts: &str,
        longopts: &[LongOpt],
        concat: bool,
        args: &[&str],
    ) -> (Vec<Step>, Vec<String>) {
        let argv: Vec<String> = std::iter::once("test")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        let getopt = Getopt::with_posixly_correct(argv, shortopts, longopts, false);
        let mut classifier = Classifier::from_getopt(getopt, concat);
        let steps: Vec<Step> = classifier.by_ref().collect();
        (steps, classifier.into_operands())
    }

    fn short(opt: char, joined: bool) -> Step {
        Step::Short {
            opt,
            arg: None,
            joined,
        }
    }

    #[test]
    fn digits_in_one_element_join() {
        let (steps, _) = classify("0123456789", &[], true, &["-123"]);
        assert_eq!(
            steps,
            vec![short('1', false), short('2', true), short('3', true)]
        );
    }

    #[test]
    fn digits_in_separate_elements_do_not_join() {
        let (steps, _) = classify("0123456789", &[], true, &["-1", "-2", "-3"]);
        assert_eq!(
            steps,
            vec![short('1', false), short('2', false), short('3', false)]
        );
    }

    #[test]
    fn operand_between_digits_resets_position() {
        let (steps, rest) = classify("0123456789", &[], true, &["-1", "foo", "-2"]);
        assert_eq!(steps, vec![short('1', false), short('2', false)]);
        assert_eq!(rest, vec!["foo"]);
    }

    #[test]
    fn skipped_operands_do_not_break_later_merges() {
        let (steps, rest) = classify("a0123456789", &[], true, &["x", "y", "-a", "z", "-45"]);
        assert_eq!(
            steps,
            vec![short('a', false), short('4', false), short('5', true)]
        );
        assert_eq!(rest, vec!["x", "y", "z"]);
    }

    #[test]
    fn letter_breaks_digit_run() {
        let (steps, _) = classify("a0123456789", &[], true, &["-1a2"]);
        assert_eq!(
            steps,
            vec![short('1', false), short('a', false), short('2', false)]
        );
    }

    #[test]
    fn error_breaks_digit_run() {
        let (steps, _) = classify(":0123456789", &[], true, &["-1z2"]);
        assert_eq!(steps[0], short('1', false));
        assert_eq!(steps[1], Step::UnknownOption(OptError::InvalidOption('z')));
        assert_eq!(steps[2], short('2', false));
    }

    #[test]
    fn without_concat_digits_never_join() {
        let (steps, _) = classify("0123456789", &[], false, &["-12"]);
        assert_eq!(steps, vec![short('1', false), short('2', false)]);
    }

    #[test]
    fn missing_argument_kinds() {
        let (steps, _) = classify(":b:", &[], false, &["-b"]);
        assert_eq!(
            steps,
            vec![Step::MissingArgument(OptError::MissingArgument('b'))]
        );
        assert!(steps[0].is_error());

        let (steps, _) = classify("b:", &[], false, &["-b"]);
        assert_eq!(
            steps,
            vec![Step::UnknownOption(OptError::MissingArgument('b'))]
        );
    }

    #[test]
    fn long_options_and_operands() {
        let longopts = vec![
            LongOpt::new("foo", HasArg::Required),
            LongOpt::new("bar", HasArg::No),
        ];
        let (steps, rest) = classify("", &longopts, false, &["--foo", "x", "--bar", "extra"]);
        assert_eq!(
            steps,
            vec![
                Step::Long {
                    index: 0,
                    arg: Some("x".into())
                },
                Step::Long {
                    index: 1,
                    arg: None
                },
            ]
        );
        assert_eq!(rest, vec!["extra"]);
    }

    #[test]
    fn in_order_operands() {
        let (steps, rest) = classify("-a", &[], false, &["x", "-a"]);
        assert_eq!(steps, vec![Step::Operand("x".into()), short('a', false)]);
        assert!(rest.is_empty());
    }
}
