use crate::{Error, File, IoContext, Result};

/// reopens the file on every read
pub struct FileReader<'a> {
    file: &'a File,
}

impl<'a> FileReader<'a> {
    pub fn new(file: &'a File) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &File {
        self.file
    }

    pub fn read(&self) -> Result<String> {
        self.read_string()
    }

    pub fn read_string(&self) -> Result<String> {
        let path = self.file.path();
        String::from_utf8(self.read_data()?).map_err(|_| Error::Utf8 { path })
    }

    pub fn read_data(&self) -> Result<Vec<u8>> {
        let path = self.file.path();
        std::fs::read(&path).at(&path)
    }
}
