//! The environment the builtin runs in.
//!
//! A shell embedding `getoptx` supplies its own [`Host`]: its positional
//! parameters, its script name, its variable assignment and its error
//! stream. [`StdHost`] serves the standalone binary, where there are no
//! shell variables and assignments are printed as code for `eval`.

use std::io::{self, Write};

use crate::quote::quote;

pub trait Host {
    /// Input used when no explicit arguments follow the short-option spec.
    fn positional_params(&self) -> Vec<String>;

    /// Default name for diagnostics when `-n` is not given.
    fn script_name(&self) -> Option<String>;

    /// The shell's own `$0`, used when there is no script name.
    fn argzero(&self) -> Option<String>;

    /// Write one line of normal output.
    fn print(&mut self, line: &str) -> io::Result<()>;

    /// Report a diagnostic.
    fn warn(&mut self, message: &str);

    fn assign_scalar(&mut self, name: &str, value: &str) -> Result<(), String>;

    fn assign_array(&mut self, name: &str, values: Vec<String>) -> Result<(), String>;
}

/// Host for the `getoptx` executable.
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn positional_params(&self) -> Vec<String> {
        Vec::new()
    }

    fn script_name(&self) -> Option<String> {
        None
    }

    fn argzero(&self) -> Option<String> {
        None
    }

    fn print(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn assign_scalar(&mut self, name: &str, value: &str) -> Result<(), String> {
        self.print(&format!("{}={}", name, quote(value)))
            .map_err(|e| e.to_string())
    }

    fn assign_array(&mut self, name: &str, values: Vec<String>) -> Result<(), String> {
        let words: Vec<String> = values.iter().map(|v| quote(v)).collect();
        self.print(&format!("{}=({})", name, words.join(" ")))
            .map_err(|e| e.to_string())
    }
}

/// A value bound through [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Scalar(String),
    Array(Vec<String>),
}

/// Host that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub params: Vec<String>,
    pub script_name: Option<String>,
    pub argzero: Option<String>,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub bindings: Vec<(String, Binding)>,
    /// Names whose assignment fails, like readonly shell variables.
    pub readonly: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest value bound to `name`.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    fn bind(&mut self, name: &str, binding: Binding) -> Result<(), String> {
        if self.readonly.iter().any(|r| r == name) {
            return Err("read-only variable".to_string());
        }
        self.bindings.push((name.to_string(), binding));
        Ok(())
    }
}

impl Host for MemoryHost {
    fn positional_params(&self) -> Vec<String> {
        self.params.clone()
    }

    fn script_name(&self) -> Option<String> {
        self.script_name.clone()
    }

    fn argzero(&self) -> Option<String> {
        self.argzero.clone()
    }

    fn print(&mut self, line: &str) -> io::Result<()> {
        self.stdout.push(line.to_string());
        Ok(())
    }

    fn warn(&mut self, message: &str) {
        self.stderr.push(message.to_string());
    }

    fn assign_scalar(&mut self, name: &str, value: &str) -> Result<(), String> {
        self.bind(name, Binding::Scalar(value.to_string()))
    }

    fn assign_array(&mut self, name: &str, values: Vec<String>) -> Result<(), String> {
        self.bind(name, Binding::Array(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_host_records_latest_binding() {
        let mut host = MemoryHost::new();
        host.assign_scalar("x", "1").unwrap();
        host.assign_array("x", vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(
            host.binding("x"),
            Some(&Binding::Array(vec!["a".into(), "b".into()]))
        );
        assert_eq!(host.binding("y"), None);
    }

    #[test]
    fn memory_host_readonly() {
        let mut host = MemoryHost {
            readonly: vec!["ro".into()],
            ..Default::default()
        };
        assert!(host.assign_scalar("ro", "v").is_err());
        assert!(host.bindings.is_empty());
    }
}
