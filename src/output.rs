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

use std::io::Write;

use serde::ser::{SerializeSeq, Serializer as _};
use serde_json::ser::Formatter;
use serde_json::Serializer;
use thiserror::Error;

use crate::compilation::Unit;
use crate::configuration::Layout;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    EncodingError(#[from] serde_json::Error),
}

/// Write the entries as a JSON array into the given stream.
///
/// The entries are serialized one by one as the iterator yields them.
pub fn write<'a>(writer: impl Write, units: impl Iterator<Item=Unit<'a>>, layout: Layout) -> Result<(), Error> {
    match layout {
        Layout::Compact =>
            write_with(Serializer::new(writer), units),
        Layout::Pretty =>
            write_with(Serializer::pretty(writer), units),
    }
}

fn write_with<'a, W: Write, F: Formatter>(
    mut serializer: Serializer<W, F>,
    units: impl Iterator<Item=Unit<'a>>,
) -> Result<(), Error> {
    let mut count: usize = 0;

    let mut sequence = (&mut serializer).serialize_seq(None)?;
    for unit in units {
        sequence.serialize_element(&unit)?;
        count += 1;
    }
    sequence.end()?;
    serializer.into_inner().flush()?;

    log::debug!("Written {count} entries.");
    Ok(())
}
