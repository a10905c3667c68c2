use crate::{File, IoContext, Result};

use std::io::Write;

pub struct FileWriter<'a> {
    file: &'a File,
}

impl<'a> FileWriter<'a> {
    pub fn new(file: &'a File) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &File {
        self.file
    }

    pub fn write(&self, body: &str) -> Result<()> {
        self.write_string(body)
    }

    pub fn append(&self, body: &str) -> Result<()> {
        self.append_string(body)
    }

    pub fn write_string(&self, body: &str) -> Result<()> {
        self.write_data(body.as_bytes())
    }

    pub fn append_string(&self, body: &str) -> Result<()> {
        self.append_data(body.as_bytes())
    }

    /// replace contents atomically: readers see the old or the new bytes, never a mix
    pub fn write_data(&self, data: &[u8]) -> Result<()> {
        let path = self.file.path();
        let dir = self.file.dir_path();
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).at(&dir)?;
        tmp.write_all(data).at(tmp.path())?;
        tmp.persist(&path).map_err(|e| e.error).at(&path)?;
        Ok(())
    }

    /// append at the end of an existing file; fails if it is missing
    pub fn append_data(&self, data: &[u8]) -> Result<()> {
        let path = self.file.path();
        let mut handle = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .at(&path)?;
        handle.write_all(data).at(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedSandbox, StoreDirectory};

    #[test]
    fn writer_append_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = FixedSandbox::new(dir.path());
        let file = File::with_name(&sandbox, StoreDirectory::Home, "a.txt").unwrap();
        assert!(FileWriter::new(&file).append("x").is_err());
        FileWriter::new(&file).write("x").unwrap();
        FileWriter::new(&file).append("y").unwrap();
        assert_eq!(crate::FileReader::new(&file).read().unwrap(), "xy");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = FixedSandbox::new(dir.path());
        let file = File::document(&sandbox, "a.txt").unwrap();
        assert!(matches!(
            FileWriter::new(&file).write("x"),
            Err(crate::Error::Io { .. })
        ));
    }
}
