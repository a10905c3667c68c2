//! shell-flavoured file commands against a [`StoreDirectory`]
//!
//! Every command resolves its root through the sandbox when called and goes
//! straight to the OS. Failures come back as [`Error`] and are logged at
//! `debug`; nothing is retried.

use crate::{path, Error, File, IoContext, Result, Sandbox, StoreDirectory};

use std::path::{Path, PathBuf};

const MIB: f64 = 1024. * 1024.;

pub struct Filer<S: Sandbox> {
    sandbox: S,
}

impl<S: Sandbox> Filer<S> {
    pub fn new(sandbox: S) -> Self {
        Self { sandbox }
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    pub fn root(&self, directory: StoreDirectory) -> Result<PathBuf> {
        directory.path(&self.sandbox)
    }

    fn resolve(&self, directory: StoreDirectory, relative: &str) -> Result<PathBuf> {
        Ok(self.root(directory)?.join(relative))
    }

    /// create the roots an application expects at launch
    pub fn ensure_roots(&self) -> Result<()> {
        for directory in StoreDirectory::standard() {
            let root = self.root(directory)?;
            std::fs::create_dir_all(&root).at(&root)?;
        }
        Ok(())
    }

    /// create `dir_name` and any missing parents
    pub fn mkdir(&self, directory: StoreDirectory, dir_name: &str) -> Result<()> {
        let path = self.resolve(directory, dir_name)?;
        std::fs::create_dir_all(&path)
            .at(&path)
            .inspect_err(|e| log::debug!("mkdir: {e}"))
    }

    pub fn touch(&self, directory: StoreDirectory, path: &str) -> Result<()> {
        File::with_path(&self.sandbox, directory, path)?
            .write("")
            .inspect_err(|e| log::debug!("touch: {e}"))
    }

    /// remove a file or a whole directory tree
    pub fn rm(&self, directory: StoreDirectory, path: &str) -> Result<()> {
        remove(&self.resolve(directory, path)?).inspect_err(|e| log::debug!("rm: {e}"))
    }

    pub fn rmdir(&self, directory: StoreDirectory, dir_name: &str) -> Result<()> {
        self.rm(directory, dir_name)
    }

    /// move within one root; fails if `to_path` already exists
    pub fn mv(&self, directory: StoreDirectory, src_path: &str, to_path: &str) -> Result<()> {
        rename(
            &self.resolve(directory, src_path)?,
            &self.resolve(directory, to_path)?,
        )
        .inspect_err(|e| log::debug!("mv: {e}"))
    }

    /// copy a file or a directory tree within one root; fails if `to_path` already exists
    pub fn cp(&self, directory: StoreDirectory, src_path: &str, to_path: &str) -> Result<()> {
        copy(
            &self.resolve(directory, src_path)?,
            &self.resolve(directory, to_path)?,
        )
        .inspect_err(|e| log::debug!("cp: {e}"))
    }

    pub fn test(&self, directory: StoreDirectory, path: &str) -> bool {
        self.resolve(directory, path).is_ok_and(|v| v.exists())
    }

    pub fn exists(&self, directory: StoreDirectory, path: &str) -> bool {
        self.test(directory, path)
    }

    pub fn is_directory(&self, directory: StoreDirectory, path: &str) -> bool {
        self.resolve(directory, path).is_ok_and(|v| v.is_dir())
    }

    /// immediate children of `dir`, sorted by name
    pub fn ls(&self, directory: StoreDirectory, dir: &str) -> Result<Vec<File>> {
        let root = self.root(directory)?;
        let path = root.join(dir);
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&path)
            .at(&path)
            .inspect_err(|e| log::debug!("ls: {e}"))?
        {
            let entry = entry.at(&path)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => log::debug!("ls: skipping non utf-8 name {name:?}"),
            }
        }
        names.sort();
        let dir = path::to_dir_name(dir);
        let dir_name = (!dir.is_empty()).then_some(dir);
        Ok(names
            .iter()
            .map(|name| File::at_root(root.clone(), directory, dir_name, name))
            .collect())
    }

    pub fn cat(&self, directory: StoreDirectory, path: &str) -> Result<String> {
        File::with_path(&self.sandbox, directory, path)?.read()
    }

    /// size in bytes
    pub fn du(&self, directory: StoreDirectory, path: &str) -> Result<u64> {
        let path = self.resolve(directory, path)?;
        Ok(std::fs::metadata(&path).at(&path)?.len())
    }

    /// children of `dir` whose contents mention any of `needles`
    pub fn grep(&self, directory: StoreDirectory, dir: &str, needles: &[&str]) -> Result<Vec<File>> {
        Ok(self
            .ls(directory, dir)?
            .into_iter()
            .filter(|file| match file.read_data() {
                Ok(body) => {
                    let body = String::from_utf8_lossy(&body);
                    needles.iter().any(|needle| body.contains(needle))
                }
                Err(_) => false,
            })
            .collect())
    }

    /// every file below `dir`, depth first; a directory's subtrees come before its own files
    pub fn tree(&self, directory: StoreDirectory, dir: &str) -> Result<Vec<File>> {
        let (dirs, files): (Vec<File>, Vec<File>) = self
            .ls(directory, dir)?
            .into_iter()
            .partition(|file| file.is_directory());
        let mut ret = Vec::new();
        for sub in dirs {
            ret.extend(self.tree(directory, &sub.relative_path())?);
        }
        ret.extend(files);
        Ok(ret)
    }

    /// free space in MiB on the volume holding the library, or -1 if unknown
    pub fn df(&self) -> f64 {
        let Ok(library) = self.root(StoreDirectory::Library) else {
            return -1.;
        };
        let disks = sysinfo::Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| library.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().components().count())
            .map(|disk| disk.available_space() as f64 / MIB)
            .unwrap_or(-1.)
    }
}

fn already_exists(path: &Path) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source: std::io::ErrorKind::AlreadyExists.into(),
    }
}

pub(crate) fn remove(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path).at(path)?;
    if meta.is_dir() {
        std::fs::remove_dir_all(path).at(path)
    } else {
        std::fs::remove_file(path).at(path)
    }
}

pub(crate) fn rename(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        return Err(already_exists(to));
    }
    std::fs::rename(from, to).at(from)
}

pub(crate) fn copy(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        return Err(already_exists(to));
    }
    if !from.is_dir() {
        return std::fs::copy(from, to).at(from).map(|_| ());
    }
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::Io {
            path: e.path().unwrap_or(from).to_path_buf(),
            source: e.into(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).at(&target)?;
        } else {
            std::fs::copy(entry.path(), &target).at(entry.path())?;
        }
    }
    Ok(())
}
