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

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::configuration;
use crate::extraction::VariableTable;

/// Represents a single compilation database entry.
///
/// The field order is the order of the fields in the written JSON object.
#[derive(Debug, PartialEq, Serialize)]
pub struct Unit<'a> {
    pub directory: &'a Path,
    pub arguments: &'a [String],
    pub file: &'a str,
}

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Variable {0} is not set")]
    MissingVariable(String),
}

/// Represents the compiler call described by the build script.
///
/// The build script compiles and links every source with a single compiler
/// invocation, so every source is reported with that same argument list.
#[derive(Debug, PartialEq)]
pub struct Compilation {
    working_dir: PathBuf,
    arguments: Vec<String>,
    sources: Vec<String>,
}

impl Compilation {
    pub fn new(
        variables: &VariableTable,
        config: &configuration::Compilation,
        working_dir: PathBuf,
    ) -> Result<Self, Error> {
        let sources = require(variables, &config.sources)?;
        let compiler_flags = require(variables, &config.compiler_flags)?;
        let linker_flags = require(variables, &config.linker_flags)?;

        let mut arguments = Vec::with_capacity(1 + compiler_flags.len() + sources.len() + linker_flags.len());
        arguments.push(config.compiler.clone());
        arguments.extend_from_slice(compiler_flags);
        arguments.extend_from_slice(sources);
        arguments.extend_from_slice(linker_flags);

        Ok(Compilation { working_dir, arguments, sources: sources.to_vec() })
    }

    /// Lazily yields one entry per source, in the order of the source list.
    pub fn units(&self) -> impl Iterator<Item=Unit<'_>> + '_ {
        self.sources.iter()
            .map(move |source| Unit {
                directory: self.working_dir.as_path(),
                arguments: self.arguments.as_slice(),
                file: source.as_str(),
            })
    }
}

fn require<'a>(variables: &'a VariableTable, key: &str) -> Result<&'a [String], Error> {
    variables.get(key)
        .ok_or_else(|| Error::MissingVariable(key.to_string()))
}

#[cfg(test)]
mod test {
    use crate::extraction;

    use super::*;

    fn variables(content: &str) -> VariableTable {
        extraction::from_reader(content.as_bytes()).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_units_per_source() -> Result<(), Error> {
        let input = variables("set CXXFLAGS=/O2 /W4\nset SOURCES=a.cpp b.cpp\nset LDFLAGS=/LTCG\n");

        let sut = Compilation::new(&input, &configuration::Compilation::default(), PathBuf::from("C:\\proj"))?;

        let arguments = strings(&["cl", "/O2", "/W4", "a.cpp", "b.cpp", "/LTCG"]);
        let expected = vec![
            Unit {
                directory: Path::new("C:\\proj"),
                arguments: arguments.as_slice(),
                file: "a.cpp",
            },
            Unit {
                directory: Path::new("C:\\proj"),
                arguments: arguments.as_slice(),
                file: "b.cpp",
            },
        ];

        let result: Vec<Unit> = sut.units().collect();

        assert_eq!(expected, result);

        Ok(())
    }

    #[test]
    fn test_units_keep_source_order() -> Result<(), Error> {
        let input = variables("set SOURCES=z.cpp a.cpp m.cpp a.cpp\nset CXXFLAGS=\nset LDFLAGS=\n");

        let sut = Compilation::new(&input, &configuration::Compilation::default(), PathBuf::from("/work"))?;

        let files: Vec<&str> = sut.units().map(|unit| unit.file).collect();
        assert_eq!(vec!["z.cpp", "a.cpp", "m.cpp", "a.cpp"], files);

        let expected = strings(&["cl", "z.cpp", "a.cpp", "m.cpp", "a.cpp"]);
        assert!(sut.units().all(|unit| unit.arguments == expected.as_slice()));

        Ok(())
    }

    #[test]
    fn test_empty_sources() -> Result<(), Error> {
        let input = variables("set SOURCES=\nset CXXFLAGS=/O2\nset LDFLAGS=/LTCG\n");

        let sut = Compilation::new(&input, &configuration::Compilation::default(), PathBuf::from("/work"))?;

        assert_eq!(0, sut.units().count());

        Ok(())
    }

    #[test]
    fn test_configured_names() -> Result<(), Error> {
        let input = variables("set SRC=main.c\nset CFLAGS=-Wall\nset LFLAGS=-lm\n");
        let config = configuration::Compilation {
            compiler: String::from("clang-cl"),
            sources: String::from("SRC"),
            compiler_flags: String::from("CFLAGS"),
            linker_flags: String::from("LFLAGS"),
        };

        let sut = Compilation::new(&input, &config, PathBuf::from("/work"))?;

        let arguments = strings(&["clang-cl", "-Wall", "main.c", "-lm"]);
        let expected = vec![
            Unit {
                directory: Path::new("/work"),
                arguments: arguments.as_slice(),
                file: "main.c",
            },
        ];

        let result: Vec<Unit> = sut.units().collect();

        assert_eq!(expected, result);

        Ok(())
    }

    #[test]
    fn test_missing_variables() {
        let config = configuration::Compilation::default();

        let input = variables("set CXXFLAGS=/O2\nset LDFLAGS=/LTCG\n");
        assert_eq!(
            Err(Error::MissingVariable(String::from("SOURCES"))),
            Compilation::new(&input, &config, PathBuf::from("/work"))
        );

        let input = variables("set SOURCES=a.cpp\nset LDFLAGS=/LTCG\n");
        assert_eq!(
            Err(Error::MissingVariable(String::from("CXXFLAGS"))),
            Compilation::new(&input, &config, PathBuf::from("/work"))
        );

        let input = variables("set SOURCES=a.cpp\nset CXXFLAGS=/O2\n");
        assert_eq!(
            Err(Error::MissingVariable(String::from("LDFLAGS"))),
            Compilation::new(&input, &config, PathBuf::from("/work"))
        );
    }
}
