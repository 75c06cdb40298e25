use getopt::{Error as OptError, Event, Getopt};

use crate::error::{GetoptxError, Result};

/// Flags understood by the builtin itself. `+` stops at the first operand
/// (the short-option spec), `:` reports missing arguments separately.
const OWN_OPTSTRING: &str = "+:A:ceEl:n:pqs:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Array(String),
    Scalar(String),
}

/// Everything one invocation was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub concat_numbers: bool,
    pub elide_errors: bool,
    pub abort_on_error: bool,
    pub normalize_punct: bool,
    pub quiet: bool,
    pub destination: Destination,
    pub name: Option<String>,
    pub long_specs: Vec<String>,
    pub shortopts: String,
    /// Explicit input; `None` means the positional parameters.
    pub args: Option<Vec<String>>,
}

impl Invocation {
    /// The short-option spec handed to the scanner: quiet mode forces a
    /// `:` (after any ordering character), and `-c` makes sure digits are
    /// recognised.
    pub fn effective_shortopts(&self) -> String {
        let (ordering, body) = split_ordering(&self.shortopts);
        let mut shortopts = if self.quiet && !body.starts_with(':') {
            format!("{}:{}", ordering, body)
        } else {
            self.shortopts.clone()
        };
        if self.concat_numbers && !shortopts.contains(|c: char| c.is_ascii_digit()) {
            shortopts.push_str("0123456789");
        }
        shortopts
    }
}

/// Split a leading `+` or `-` ordering character off a short-option spec.
fn split_ordering(shortopts: &str) -> (&str, &str) {
    match shortopts.chars().next() {
        Some('+' | '-') => shortopts.split_at(1),
        _ => ("", shortopts),
    }
}

/// Identifier rules for array and scalar targets.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse the builtin's own argument list.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let argv: Vec<String> = std::iter::once("getoptx".to_string())
        .chain(args.iter().cloned())
        .collect();

    let mut concat_numbers = false;
    let mut elide_errors = false;
    let mut abort_on_error = false;
    let mut normalize_punct = false;
    let mut quiet = false;
    let mut array: Option<String> = None;
    let mut scalar: Option<String> = None;
    let mut name: Option<String> = None;
    let mut long_specs = Vec::new();

    let mut g = Getopt::new(argv, OWN_OPTSTRING, &[]);
    while let Some(event) = g.next() {
        match event {
            Event::Short('A', Some(v)) => array = Some(v),
            Event::Short('c', _) => concat_numbers = true,
            Event::Short('e', _) => elide_errors = true,
            Event::Short('E', _) => abort_on_error = true,
            Event::Short('l', Some(v)) => long_specs.push(v),
            Event::Short('n', Some(v)) => name = Some(v),
            Event::Short('p', _) => normalize_punct = true,
            Event::Short('q', _) => quiet = true,
            Event::Short('s', Some(v)) => scalar = Some(v),
            Event::MissingArgument(OptError::MissingArgument(c)) => {
                return Err(GetoptxError::ArgumentExpected(c));
            }
            Event::BadOption(OptError::InvalidOption(c)) => {
                return Err(GetoptxError::BadOption(format!("-{}{}", c, g.pending())));
            }
            Event::BadOption(OptError::Unrecognized { prefix, text }) => {
                return Err(GetoptxError::BadOption(format!("{}{}", prefix, text)));
            }
            // Nothing else can come out of OWN_OPTSTRING with no long options.
            other => unreachable!("unexpected event {:?}", other),
        }
    }

    let terminated = g.terminated();
    let mut operands = g.into_operands().into_iter();

    // A lone `-` also ends our own flags, unless `--` already did.
    let mut first = operands.next();
    if !terminated && first.as_deref() == Some("-") {
        first = operands.next();
    }
    let shortopts = first.ok_or(GetoptxError::NotEnoughArguments)?;

    if split_ordering(&shortopts).1.starts_with(':') {
        quiet = true;
    }

    let rest: Vec<String> = operands.collect();
    let destination = match (array, scalar) {
        (Some(array), _) => Destination::Array(array),
        (None, Some(scalar)) => Destination::Scalar(scalar),
        (None, None) => Destination::Stdout,
    };

    Ok(Invocation {
        concat_numbers,
        elide_errors,
        abort_on_error,
        normalize_punct,
        quiet,
        destination,
        name,
        long_specs,
        shortopts,
        args: if rest.is_empty() { None } else { Some(rest) },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&args)
    }

    #[test]
    fn defaults() {
        let inv = parse(&["ab:"]).unwrap();
        assert!(!inv.concat_numbers && !inv.elide_errors && !inv.abort_on_error);
        assert!(!inv.normalize_punct && !inv.quiet);
        assert_eq!(inv.destination, Destination::Stdout);
        assert_eq!(inv.shortopts, "ab:");
        assert_eq!(inv.args, None);
        assert!(inv.long_specs.is_empty());
    }

    #[test]
    fn bundled_flags_and_attached_values() {
        let inv = parse(&["-cepE", "-Aopts", "-l", "foo:", "-lbar", "-n", "me", "x", "-a"]).unwrap();
        assert!(inv.concat_numbers && inv.elide_errors && inv.abort_on_error);
        assert!(inv.normalize_punct);
        assert_eq!(inv.destination, Destination::Array("opts".into()));
        assert_eq!(inv.long_specs, vec!["foo:", "bar"]);
        assert_eq!(inv.name.as_deref(), Some("me"));
        assert_eq!(inv.shortopts, "x");
        assert_eq!(inv.args, Some(vec!["-a".to_string()]));
    }

    #[test]
    fn array_wins_over_scalar() {
        let inv = parse(&["-s", "sca", "-A", "arr", ""]).unwrap();
        assert_eq!(inv.destination, Destination::Array("arr".into()));
        let inv = parse(&["-s", "sca", ""]).unwrap();
        assert_eq!(inv.destination, Destination::Scalar("sca".into()));
    }

    #[test]
    fn flag_value_may_start_with_dash() {
        let inv = parse(&["-A", "-c", "ab"]).unwrap();
        assert_eq!(inv.destination, Destination::Array("-c".into()));
        assert!(!inv.concat_numbers);
    }

    #[test]
    fn end_of_flags_markers() {
        let inv = parse(&["-q", "--", "-ab", "-a"]).unwrap();
        assert_eq!(inv.shortopts, "-ab");
        assert_eq!(inv.args, Some(vec!["-a".to_string()]));

        let inv = parse(&["-", "-ab"]).unwrap();
        assert_eq!(inv.shortopts, "-ab");
        assert_eq!(inv.args, None);
    }

    #[test]
    fn only_one_end_of_flags_marker_is_consumed() {
        let inv = parse(&["--", "-", "x"]).unwrap();
        assert_eq!(inv.shortopts, "-");
        assert_eq!(inv.args, Some(vec!["x".to_string()]));

        let inv = parse(&["-", "-", "x"]).unwrap();
        assert_eq!(inv.shortopts, "-");
        assert_eq!(inv.args, Some(vec!["x".to_string()]));

        let inv = parse(&["-n", "--", "-", "x"]).unwrap();
        assert_eq!(inv.name.as_deref(), Some("--"));
        assert_eq!(inv.shortopts, "x");
    }

    #[test]
    fn leading_colon_means_quiet() {
        assert!(parse(&[":a"]).unwrap().quiet);
        assert!(parse(&["+:b:"]).unwrap().quiet);
        assert!(parse(&["--", "-:b:"]).unwrap().quiet);
        assert!(!parse(&["+b:"]).unwrap().quiet);
        assert!(!parse(&["b:"]).unwrap().quiet);
    }

    #[test]
    fn usage_errors() {
        assert!(matches!(parse(&[]), Err(GetoptxError::NotEnoughArguments)));
        assert!(matches!(parse(&["-c"]), Err(GetoptxError::NotEnoughArguments)));
        assert!(matches!(
            parse(&["-A"]),
            Err(GetoptxError::ArgumentExpected('A'))
        ));
        match parse(&["-cZ", "ab"]) {
            Err(e @ GetoptxError::BadOption(_)) => assert_eq!(e.to_string(), "bad option: -Z"),
            other => panic!("unexpected {:?}", other),
        }
        match parse(&["-cZx", "ab"]) {
            Err(e) => assert_eq!(e.to_string(), "bad option: -Zx"),
            other => panic!("unexpected {:?}", other),
        }
        match parse(&["--long", "ab"]) {
            Err(e) => assert_eq!(e.to_string(), "bad option: --long"),
            Ok(inv) => panic!("unexpected {:?}", inv),
        }
    }

    #[test]
    fn effective_shortopts() {
        let mut inv = parse(&["ab"]).unwrap();
        assert_eq!(inv.effective_shortopts(), "ab");

        inv.quiet = true;
        assert_eq!(inv.effective_shortopts(), ":ab");

        inv.concat_numbers = true;
        assert_eq!(inv.effective_shortopts(), ":ab0123456789");

        inv.shortopts = ":a5".into();
        assert_eq!(inv.effective_shortopts(), ":a5");
    }

    #[test]
    fn quiet_colon_goes_after_ordering_character() {
        let mut inv = parse(&["-q", "+ab"]).unwrap();
        assert!(inv.quiet);
        assert_eq!(inv.effective_shortopts(), "+:ab");

        inv.shortopts = "-ab".into();
        assert_eq!(inv.effective_shortopts(), "-:ab");

        inv.shortopts = "+:ab".into();
        assert_eq!(inv.effective_shortopts(), "+:ab");
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("opts"));
        assert!(is_identifier("_x9"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("9x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("a b"));
    }
}
