#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{BufReader, Cursor, Write};
use trafo::input::PolicyOverrides;
use trafo::output::Output;
use trafo::{run_project, ProjectFlags};

fuzz_target!(|data: &[u8]| {
    let _run = run_project(
        BufReader::new(Cursor::new(data)),
        FuzzOutput,
        &PolicyOverrides::default(),
        &ProjectFlags::all(),
    );
});

/// An output that discards everything but is not a no-op, so the report writers still run.
#[derive(Debug, Default)]
pub struct FuzzOutput;

impl Output for FuzzOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }
}
