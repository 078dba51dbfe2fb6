use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use dncl_core::utils::prelude::Error;
use utf8_chars::BufReadCharsExt;

/// Reads a program from `path`, or from stdin when `path` is `-`.
pub fn read(path: &Path) -> Result<String, Error> {
    if path == Path::new("-") {
        return read_chars(&mut std::io::stdin().lock());
    }

    let file = File::open(path).map_err(|err| Error::StdIo { err: err.kind() })?;

    read_chars(&mut BufReader::new(file))
}

fn read_chars(reader: &mut impl BufRead) -> Result<String, Error> {
    reader.chars()
        .map(|ch| ch.map_err(|err| Error::StdIo { err: err.kind() }))
        .collect()
}
