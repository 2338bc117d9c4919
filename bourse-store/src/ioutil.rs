// File reader/writer wrapper with an atomic-rewrite idiom: a `Writer`
// flushes, syncs, and hands back its paired `Reader` only once the bytes
// are durably on disk.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Result, Seek, Write},
    path::PathBuf,
};

pub trait Reader: Read + Seek + Send + Sized {}

pub trait Writer: Write + Seek + Send + Sized {
    type PairedReader: Reader;
    fn try_into_reader(self) -> Result<Self::PairedReader>;
}

pub struct FileReader {
    file: BufReader<File>,
}

impl FileReader {
    fn open(path: &PathBuf) -> Result<Self> {
        Ok(Self { file: BufReader::new(File::open(path)?) })
    }
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> Result<u64> {
        self.file.seek(pos)
    }
}

impl Reader for FileReader {}

pub struct FileWriter {
    file: BufWriter<File>,
    path: PathBuf,
}

impl FileWriter {
    /// Creates (or truncates) the file at `path` for writing. Truncating
    /// rather than `create_new` means a leftover temp file from a crash
    /// mid-write doesn't block the next save.
    pub fn try_create_fresh(path: PathBuf) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { file: BufWriter::new(file), path })
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }
    fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }
}

impl Seek for FileWriter {
    fn seek(&mut self, pos: std::io::SeekFrom) -> Result<u64> {
        self.file.seek(pos)
    }
}

impl Writer for FileWriter {
    type PairedReader = FileReader;
    fn try_into_reader(self) -> Result<Self::PairedReader> {
        let Self { mut file, path } = self;
        file.flush()?;
        let file = file.into_inner()?;
        file.sync_all()?;
        drop(file);
        FileReader::open(&path)
    }
}
