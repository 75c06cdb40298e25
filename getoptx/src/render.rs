use crate::classify::Step;
use crate::longopts::{strip_punct, LongOptionTable};
use crate::quote::quote;

/// Rendering switches taken from the invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub normalize_punct: bool,
    pub elide_errors: bool,
}

/// The result string under construction. Every token is appended with a
/// leading space; [`OutputBuffer::as_str`] drops the first one.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    buf: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_token(&mut self, token: &str) {
        self.buf.push(' ');
        self.buf.push_str(token);
    }

    fn push_quoted(&mut self, value: &str) {
        self.push_token(&quote(value));
    }

    /// Append one classified step.
    pub fn push_step(&mut self, step: &Step, table: &LongOptionTable, opts: RenderOptions) {
        let arg = match step {
            Step::Short { opt, arg, joined } => {
                if *joined {
                    self.buf.push(*opt);
                } else {
                    self.push_token(&format!("-{}", opt));
                }
                arg
            }
            Step::Long { index, arg } => {
                let name = table.get(*index).map(|o| o.name.as_str()).unwrap_or_default();
                if opts.normalize_punct {
                    self.push_token(&format!("--{}", strip_punct(name)));
                } else {
                    self.push_token(&format!("--{}", name));
                }
                arg
            }
            Step::Operand(value) => {
                self.push_quoted(value);
                return;
            }
            Step::MissingArgument(_) => {
                if !opts.elide_errors {
                    self.push_token("':'");
                }
                return;
            }
            Step::UnknownOption(_) => {
                if !opts.elide_errors {
                    self.push_token("'?'");
                }
                return;
            }
        };

        if let Some(value) = arg {
            self.push_quoted(value);
        }
    }

    /// Close the option list with `--` and append the operands.
    pub fn finish(&mut self, operands: &[String]) {
        self.push_token("--");
        for operand in operands {
            self.push_quoted(operand);
        }
    }

    /// Throw away everything rendered so far.
    pub fn discard(&mut self) {
        self.buf.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        self.buf.strip_prefix(' ').unwrap_or(&self.buf)
    }
}
