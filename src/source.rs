use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::error::{AnalyzerError, Result};

const READ_BUFFER: usize = 64 * 1024;

/// A log file on disk. Every call to [`LineSource::open`] starts a fresh pass
/// from the first line.
#[derive(Debug, Clone)]
pub struct LineSource {
    path: PathBuf,
}

/// Lazy sequence of lines from one pass over a [`LineSource`].
pub struct Lines {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    done: bool,
}

impl LineSource {
    pub fn new<P: AsRef<Path>>(path: P) -> LineSource {
        LineSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<Lines> {
        let file = File::open(&self.path).map_err(|source| AnalyzerError::Open {
            path: self.path.clone(),
            source,
        })?;
        Ok(Lines {
            path: self.path.clone(),
            reader: BufReader::with_capacity(READ_BUFFER, file),
            buf: Vec::new(),
            done: false,
        })
    }
}

impl Iterator for Lines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(source) => {
                self.done = true;
                Some(Err(AnalyzerError::Read {
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}
