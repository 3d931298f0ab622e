/*  Copyright (C) 2023 by the bat2ccdb authors
    This file is part of bat2ccdb.

    bat2ccdb is a tool to generate compilation database for clang tooling.

    bat2ccdb is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    bat2ccdb is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use serde::Deserialize;

// Represents the application configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Configuration {
    pub platforms: Vec<String>,
    pub compilation: Compilation,
    pub output: Output,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            platforms: vec![String::from("windows")],
            compilation: Compilation::default(),
            output: Output::default(),
        }
    }
}

impl Configuration {
    /// The build script dialect is only meaningful on the listed platforms,
    /// everywhere else the tool has nothing to do.
    pub fn runs_on(&self, platform: &str) -> bool {
        self.platforms.iter().any(|candidate| candidate == platform)
    }
}

// Represents how the compiler invocation is assembled.
//
// The variable names are the keys of the build script assignments that
// hold the source list, the compiler flags and the linker flags.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Compilation {
    pub compiler: String,
    pub sources: String,
    pub compiler_flags: String,
    pub linker_flags: String,
}

impl Default for Compilation {
    fn default() -> Self {
        Compilation {
            compiler: String::from("cl"),
            sources: String::from("SOURCES"),
            compiler_flags: String::from("CXXFLAGS"),
            linker_flags: String::from("LDFLAGS"),
        }
    }
}

// Groups together the output related configurations.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Output {
    pub layout: Layout,
}

/// Controls the whitespace of the written JSON document.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(try_from = "String")]
pub enum Layout {
    #[default]
    Compact,
    Pretty,
}

impl TryFrom<String> for Layout {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "compact" =>
                Ok(Layout::Compact),
            "pretty" =>
                Ok(Layout::Pretty),
            _ =>
                Err(format!(r#"Unknown value "{value}" for output layout"#)),
        }
    }
}

pub mod io {
    use std::io::stdin;

    use thiserror::Error;

    use super::*;

    /// This error type encompasses any error that can be returned by this module.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
        #[error("Syntax error: {0}")]
        SyntaxError(#[from] serde_json::Error),
    }

    /// Load the content of the given file and parse it as Configuration.
    pub fn from_file(file: &std::path::Path) -> Result<Configuration, Error> {
        let reader = std::fs::OpenOptions::new().read(true).open(file)?;
        let result = from_reader(reader)?;

        Ok(result)
    }

    pub fn from_stdin() -> Result<Configuration, Error> {
        let reader = stdin();
        let result = from_reader(reader)?;

        Ok(result)
    }

    /// Load the content of the given stream and parse it as Configuration.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Configuration, serde_json::Error> {
        serde_json::from_reader(reader)
    }

}
