//! file reference value type

use crate::{filer, path, FileReader, FileWriter, Result, Sandbox, StoreDirectory};

use std::path::PathBuf;

/// a (root, sub-directory, name) triple; holds no handle and caches no content
#[derive(Clone, Debug)]
pub struct File {
    /// absolute root resolved when the reference was built
    root: PathBuf,
    directory: StoreDirectory,
    dir_name: Option<String>,
    file_name: String,
}

impl File {
    pub fn new<S: Sandbox + ?Sized>(
        sandbox: &S,
        directory: StoreDirectory,
        dir_name: Option<&str>,
        file_name: &str,
    ) -> Result<Self> {
        Ok(Self::at_root(
            directory.path(sandbox)?,
            directory,
            dir_name,
            file_name,
        ))
    }

    /// reference `path` ("dir/sub/name") under `directory`
    pub fn with_path<S: Sandbox + ?Sized>(
        sandbox: &S,
        directory: StoreDirectory,
        path: &str,
    ) -> Result<Self> {
        let (dir_name, file_name) = path::parse_path(path);
        Self::new(sandbox, directory, dir_name.as_deref(), &file_name)
    }

    pub fn with_name<S: Sandbox + ?Sized>(
        sandbox: &S,
        directory: StoreDirectory,
        file_name: &str,
    ) -> Result<Self> {
        Self::new(sandbox, directory, None, file_name)
    }

    pub fn document<S: Sandbox + ?Sized>(sandbox: &S, file_name: &str) -> Result<Self> {
        Self::with_name(sandbox, StoreDirectory::Document, file_name)
    }

    /// reference an absolute path or `file://` url; `None` outside the sandbox
    pub fn from_absolute<S: Sandbox + ?Sized>(sandbox: &S, absolute: &str) -> Option<Self> {
        let (directory, dir_name, file_name) = path::parse_absolute(sandbox, absolute)?;
        Self::new(sandbox, directory, dir_name.as_deref(), &file_name).ok()
    }

    pub(crate) fn at_root(
        root: PathBuf,
        directory: StoreDirectory,
        dir_name: Option<&str>,
        file_name: &str,
    ) -> Self {
        Self {
            root,
            directory,
            dir_name: dir_name.map(|v| path::to_dir_name(v).to_string()),
            file_name: file_name.to_string(),
        }
    }

    pub fn directory(&self) -> StoreDirectory {
        self.directory
    }

    pub fn dir_name(&self) -> Option<&str> {
        self.dir_name.as_deref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// absolute path of the containing directory
    pub fn dir_path(&self) -> PathBuf {
        match self.dir_name.as_deref() {
            Some(dir) if !dir.is_empty() => self.root.join(dir),
            _ => self.root.clone(),
        }
    }

    pub fn path(&self) -> PathBuf {
        if self.file_name.is_empty() {
            self.dir_path()
        } else {
            self.dir_path().join(&self.file_name)
        }
    }

    /// path below the root, `/`-delimited
    pub fn relative_path(&self) -> String {
        match self.dir_name.as_deref() {
            Some(dir) => path::join(dir, &self.file_name),
            None => self.file_name.clone(),
        }
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path().display())
    }

    /// text after the last `.` of the file name; `None` for a name without
    /// a dot instead of echoing the whole name back
    pub fn ext(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    pub fn is_directory(&self) -> bool {
        self.path().is_dir()
    }

    pub fn delete(&self) -> Result<()> {
        filer::remove(&self.path())
    }

    /// copy to `to`, relative to this file's root
    pub fn copy_to(&self, to: &str) -> Result<()> {
        filer::copy(&self.path(), &self.root.join(to))
    }

    /// move to `to`, relative to this file's root
    pub fn move_to(&self, to: &str) -> Result<()> {
        filer::rename(&self.path(), &self.root.join(to))
    }

    pub fn read(&self) -> Result<String> {
        FileReader::new(self).read()
    }

    pub fn read_data(&self) -> Result<Vec<u8>> {
        FileReader::new(self).read_data()
    }

    pub fn write(&self, body: &str) -> Result<()> {
        FileWriter::new(self).write(body)
    }

    pub fn write_data(&self, data: &[u8]) -> Result<()> {
        FileWriter::new(self).write_data(data)
    }

    /// append text, creating the file if missing
    pub fn append(&self, body: &str) -> Result<()> {
        if self.exists() {
            FileWriter::new(self).append(body)
        } else {
            FileWriter::new(self).write(body)
        }
    }

    /// append bytes, creating the file if missing
    pub fn append_data(&self, data: &[u8]) -> Result<()> {
        if self.exists() {
            FileWriter::new(self).append_data(data)
        } else {
            FileWriter::new(self).write_data(data)
        }
    }
}

impl core::fmt::Display for File {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "File {}", self.path().display())
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for File {}

impl core::hash::Hash for File {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.path().hash(state)
    }
}
