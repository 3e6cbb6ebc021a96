use anyhow::anyhow;
use formatx::formatx;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file in a directory, named by filling in a template
/// with the location key and the file extension (in that order).
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|e| anyhow!("Could not build output file name: {e:?}"))?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// An output that keeps every written "file" in memory, keyed by `{location_key}.{file_extension}`.
#[derive(Clone, Debug, Default)]
pub struct MemoryOutput {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Default::default()
    }

    /// Names of the files written so far, in the order they were first opened.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .lock()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn contents(&self, file_name: &str) -> Option<String> {
        self.files
            .lock()
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = format!("{location_key}.{file_extension}");
        {
            let mut files = self.files.lock();
            files.retain(|(name, _)| *name != file_name);
            files.push((file_name.clone(), vec![]));
        }

        Ok(MemoryFileWriter {
            files: self.files.clone(),
            file_name,
        })
    }
}

impl Output for &MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <MemoryOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

struct MemoryFileWriter {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    file_name: String,
}

impl Write for MemoryFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut files = self.files.lock();
        let (_, bytes) = files
            .iter_mut()
            .find(|(name, _)| *name == self.file_name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "output file was removed"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
