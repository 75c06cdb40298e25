//! The `getoptx` builtin.
//!
//! ```text
//! getoptx [-A array] [-c] [-e] [-E] [-l longspec]... [-n name] [-p] [-q]
//!         [-s scalar] <shortopts> [arg ...]
//! ```
//!
//! Exit status is [`EXIT_OK`] when every option parsed, [`EXIT_PARSE_ERROR`]
//! when the input held unknown options or missing arguments, and
//! [`EXIT_USAGE`] for misuse of the builtin itself or a failed assignment.

use getopt::ProgramNameGuard;
use tracing::debug;

use crate::arguments::{is_identifier, parse_args, Destination, Invocation};
use crate::classify::Classifier;
use crate::error::{GetoptxError, Result};
use crate::host::Host;
use crate::longopts::LongOptionTable;
use crate::quote::split_words;
use crate::render::{OutputBuffer, RenderOptions};

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARSE_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

const BUILTIN_NAME: &str = "getoptx";

/// Run the builtin with its own argument list and return the exit status.
pub fn run<H: Host>(host: &mut H, args: &[String]) -> i32 {
    match execute(host, args) {
        Ok(status) => status,
        Err(err) => {
            host.warn(&format!("{}: {}", BUILTIN_NAME, err));
            EXIT_USAGE
        }
    }
}

fn execute<H: Host>(host: &mut H, args: &[String]) -> Result<i32> {
    let inv = parse_args(args)?;
    debug!(?inv, "invocation");

    let mut table = LongOptionTable::new();
    for spec in &inv.long_specs {
        if table.add_spec(spec, inv.normalize_punct) > 0 {
            return Err(GetoptxError::InvalidSpec(spec.clone()));
        }
    }

    let name = inv
        .name
        .clone()
        .or_else(|| host.script_name())
        .or_else(|| host.argzero())
        .unwrap_or_else(|| BUILTIN_NAME.to_string());

    let _program_name = ProgramNameGuard::set(&name);

    let (status, output) = classify(host, &inv, &table, &name);
    emit(host, &inv.destination, output.as_str())?;
    Ok(status)
}

/// Scan the input and render the result. An aborted scan yields an empty
/// buffer.
fn classify<H: Host>(
    host: &mut H,
    inv: &Invocation,
    table: &LongOptionTable,
    name: &str,
) -> (i32, OutputBuffer) {
    let shortopts = inv.effective_shortopts();
    let input = inv.args.clone().unwrap_or_else(|| host.positional_params());
    let argv: Vec<String> = std::iter::once(name.to_string()).chain(input).collect();

    let opts = RenderOptions {
        normalize_punct: inv.normalize_punct,
        elide_errors: inv.elide_errors,
    };

    let mut status = EXIT_OK;
    let mut output = OutputBuffer::new();
    let mut classifier = Classifier::new(argv, &shortopts, table.as_slice(), inv.concat_numbers);

    for step in classifier.by_ref() {
        if let Some(err) = step.error() {
            status = EXIT_PARSE_ERROR;
            if !inv.quiet {
                host.warn(&format!("{}: {}", getopt::program_name(), err));
            }
        }

        output.push_step(&step, table, opts);

        if step.is_error() && inv.abort_on_error {
            debug!(?step, "aborting on first parse error");
            output.discard();
            return (status, output);
        }
    }

    output.finish(&classifier.into_operands());
    (status, output)
}

/// Hand the rendered result to its destination.
fn emit<H: Host>(host: &mut H, destination: &Destination, result: &str) -> Result<()> {
    match destination {
        Destination::Stdout => {
            if !result.is_empty() {
                host.print(result)?;
            }
        }
        Destination::Array(name) => {
            if !is_identifier(name) {
                return Err(GetoptxError::NotAnIdentifier(name.clone()));
            }
            let words = split_words(result)?;
            host.assign_array(name, words)
                .map_err(|reason| GetoptxError::Assign {
                    name: name.clone(),
                    reason,
                })?;
        }
        Destination::Scalar(name) => {
            if !is_identifier(name) {
                return Err(GetoptxError::NotAnIdentifier(name.clone()));
            }
            host.assign_scalar(name, result)
                .map_err(|reason| GetoptxError::Assign {
                    name: name.clone(),
                    reason,
                })?;
        }
    }
    Ok(())
}
