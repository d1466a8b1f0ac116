//! Compiler selection from the environment.

use super::CheckError;
use std::env;

const INCLUDE_FLAGS: [&str; 2] = ["-I.", "-I.."];
const SYNTAX_ONLY_FLAGS: [&str; 2] = ["-pedantic", "-fsyntax-only"];

/// The `CC`/`CXX` family of variables, read once per document check.
///
/// Empty variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: Option<String>,
    pub cxx: Option<String>,
    pub cflags: Option<String>,
    pub cxxflags: Option<String>,
    pub cppflags: Option<String>,
}

fn variable(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn split_flags(variable: &'static str, value: Option<&str>) -> Result<Vec<String>, CheckError> {
    match value {
        Some(value) => shell_words::split(value).map_err(|source| CheckError::Flags { variable, source }),
        None => Ok(Vec::new()),
    }
}

impl Toolchain {
    pub fn from_env() -> Self {
        Self {
            cc: variable("CC"),
            cxx: variable("CXX"),
            cflags: variable("CFLAGS"),
            cxxflags: variable("CXXFLAGS"),
            cppflags: variable("CPPFLAGS"),
        }
    }

    /// `bash -n`, which only parses the script.
    pub fn bash_command(&self) -> Vec<String> {
        vec!["bash".to_string(), "-n".to_string()]
    }

    pub fn c_command(&self) -> Result<Vec<String>, CheckError> {
        let compiler = self.cc.as_deref().unwrap_or("gcc");
        self.gcc_command(compiler, ("CFLAGS", self.cflags.as_deref()))
    }

    pub fn cpp_command(&self) -> Result<Vec<String>, CheckError> {
        let compiler = self.cxx.as_deref().unwrap_or("g++");
        self.gcc_command(compiler, ("CXXFLAGS", self.cxxflags.as_deref()))
    }

    fn gcc_command(&self, compiler: &str, flags: (&'static str, Option<&str>)) -> Result<Vec<String>, CheckError> {
        let mut command = vec![compiler.to_string()];
        command.extend(split_flags(flags.0, flags.1)?);
        command.extend(split_flags("CPPFLAGS", self.cppflags.as_deref())?);
        command.extend(INCLUDE_FLAGS.iter().chain(&SYNTAX_ONLY_FLAGS).map(|flag| flag.to_string()));
        Ok(command)
    }
}
