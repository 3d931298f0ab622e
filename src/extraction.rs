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

use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

const ASSIGNMENT_PREFIX: &str = "set ";

/// Variables assigned by the `set KEY=value` lines of a build script.
///
/// Each value is kept as the whitespace separated tokens of the right-hand
/// side. A later assignment of the same key replaces the former one.
#[derive(Debug, Default, PartialEq)]
pub struct VariableTable {
    variables: HashMap<String, Vec<String>>,
}

impl VariableTable {
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.variables.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed assignment at line {line}: {content}")]
    MalformedAssignment { line: usize, content: String },
}

/// Read the build script from the given stream and collect the assignments.
pub fn from_reader(reader: impl BufRead) -> Result<VariableTable, Error> {
    let mut variables = HashMap::new();
    let mut skipped: usize = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if !line.starts_with(ASSIGNMENT_PREFIX) {
            skipped += 1;
            continue;
        }

        let (key, values) = parse_assignment(line)
            .ok_or_else(|| Error::MalformedAssignment { line: index + 1, content: line.to_string() })?;
        log::trace!("assignment found, {} = {:?}", key, values);
        variables.insert(key, values);
    }

    log::debug!("Skipped {skipped} lines, which are not assignments.");
    Ok(VariableTable { variables })
}

fn parse_assignment(line: &str) -> Option<(String, Vec<String>)> {
    let (lhs, rhs) = line.split_once('=')?;

    let mut names = lhs.split(' ');
    let key = match (names.next(), names.next(), names.next()) {
        (Some(_), Some(key), None) if !key.is_empty() => key,
        _ => return None,
    };
    let values = rhs.split_whitespace()
        .map(str::to_string)
        .collect();

    Some((key.to_string(), values))
}
