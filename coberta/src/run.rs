use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cobertura::Coverage;
use crate::emit;
use crate::error::CobertaError;
use crate::locate;
use crate::mapper;
use crate::profile;
use crate::structure::SynStructure;

pub fn convert(input: &mut impl Read, output: &mut impl Write) -> Result<(), CobertaError> {
    convert_with_roots(input, output, &locate::source_roots())
}

pub fn convert_with_roots(
    input: &mut impl Read,
    output: &mut impl Write,
    roots: &[PathBuf],
) -> Result<(), CobertaError> {
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .map_err(|source| CobertaError::Input { source })?;

    let profiles = profile::parse_profiles(&raw)?;
    let mut coverage = Coverage::new(locate::root_names(roots), timestamp_ms());
    let provider = SynStructure;
    for profile in &profiles {
        mapper::apply_profile(&mut coverage, profile, roots, &provider)?;
    }
    coverage.finalize();

    let document = emit::render(&coverage).map_err(|err| CobertaError::Output {
        source: std::io::Error::other(err.to_string()),
    })?;
    output
        .write_all(&document)
        .map_err(|source| CobertaError::Output { source })?;
    Ok(())
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
