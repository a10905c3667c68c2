//! logical storage roots and their resolution to absolute paths
//!
//! A [`StoreDirectory`] is only a name. Turning it into a path always goes
//! through a [`Sandbox`], which is asked again on every call: roots may move
//! between launches, so nothing here caches a resolved path.

use crate::{Error, Result};

use std::path::{Path, PathBuf};

const DOCUMENTS: &str = "Documents";
const LIBRARY: &str = "Library";
const CACHES: &str = "Caches";
const INBOX: &str = "Inbox";
const APPLICATION_SUPPORT: &str = "Application Support";

/// well-known directories beyond the fixed sandbox roots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SearchDirectory {
    Document,
    Caches,
    Library,
    ApplicationSupport,
    Desktop,
    Downloads,
    Music,
}

impl SearchDirectory {
    /// location of `self` inside an application home
    pub fn under_home(&self, home: &Path) -> PathBuf {
        match self {
            Self::Document => home.join(DOCUMENTS),
            Self::Caches => home.join(LIBRARY).join(CACHES),
            Self::Library => home.join(LIBRARY),
            Self::ApplicationSupport => home.join(LIBRARY).join(APPLICATION_SUPPORT),
            Self::Desktop => home.join("Desktop"),
            Self::Downloads => home.join("Downloads"),
            Self::Music => home.join("Music"),
        }
    }
}

/// source of the absolute roots every [`StoreDirectory`] hangs off
pub trait Sandbox {
    /// application home directory
    fn home(&self) -> Result<PathBuf>;

    /// scratch space; contents may vanish between launches
    fn temp(&self) -> Result<PathBuf>;

    fn search(&self, directory: SearchDirectory) -> Result<PathBuf> {
        Ok(directory.under_home(&self.home()?))
    }
}

impl<S: Sandbox + ?Sized> Sandbox for &S {
    fn home(&self) -> Result<PathBuf> {
        (**self).home()
    }

    fn temp(&self) -> Result<PathBuf> {
        (**self).temp()
    }

    fn search(&self, directory: SearchDirectory) -> Result<PathBuf> {
        (**self).search(directory)
    }
}

impl<S: Sandbox + ?Sized> Sandbox for std::sync::Arc<S> {
    fn home(&self) -> Result<PathBuf> {
        (**self).home()
    }

    fn temp(&self) -> Result<PathBuf> {
        (**self).temp()
    }

    fn search(&self, directory: SearchDirectory) -> Result<PathBuf> {
        (**self).search(directory)
    }
}

/// sandbox rooted in the per-user data directory of the host OS
#[derive(Clone, Debug)]
pub struct OsSandbox {
    app: String,
}

impl OsSandbox {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }
}

impl Sandbox for OsSandbox {
    fn home(&self) -> Result<PathBuf> {
        Ok(dirs::data_dir().ok_or(Error::NoRoot("data"))?.join(&self.app))
    }

    fn temp(&self) -> Result<PathBuf> {
        Ok(std::env::temp_dir().join(&self.app))
    }

    fn search(&self, directory: SearchDirectory) -> Result<PathBuf> {
        let user = match directory {
            SearchDirectory::Desktop => dirs::desktop_dir(),
            SearchDirectory::Downloads => dirs::download_dir(),
            SearchDirectory::Music => dirs::audio_dir(),
            _ => None,
        };
        match user {
            Some(path) => Ok(path),
            None => Ok(directory.under_home(&self.home()?)),
        }
    }
}

/// sandbox with pinned roots
#[derive(Clone, Debug)]
pub struct FixedSandbox {
    home: PathBuf,
    temp: PathBuf,
}

impl FixedSandbox {
    /// pin home at `home`, with temp at `<home>/tmp`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let temp = home.join("tmp");
        Self { home, temp }
    }

    pub fn with_temp(home: impl Into<PathBuf>, temp: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            temp: temp.into(),
        }
    }
}

impl Sandbox for FixedSandbox {
    fn home(&self) -> Result<PathBuf> {
        Ok(self.home.clone())
    }

    fn temp(&self) -> Result<PathBuf> {
        Ok(self.temp.clone())
    }
}

/// symbolic root of a stored file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StoreDirectory {
    Home,
    Temp,
    Document,
    Cache,
    Inbox,
    Library,
    Search(SearchDirectory),
}

/// symbolic names as they appear below the application home
const NAMES: [(&str, StoreDirectory); 6] = [
    ("/", StoreDirectory::Home),
    ("/tmp", StoreDirectory::Temp),
    ("/Documents", StoreDirectory::Document),
    ("/Caches", StoreDirectory::Cache),
    ("/Library", StoreDirectory::Library),
    ("/Library/Inbox", StoreDirectory::Inbox),
];

impl StoreDirectory {
    /// resolve to an absolute path; asks `sandbox` every time
    pub fn path<S: Sandbox + ?Sized>(&self, sandbox: &S) -> Result<PathBuf> {
        match self {
            Self::Home => sandbox.home(),
            Self::Temp => sandbox.temp(),
            Self::Document => Self::Search(SearchDirectory::Document).path(sandbox),
            Self::Cache => Self::Search(SearchDirectory::Caches).path(sandbox),
            Self::Library => Self::Search(SearchDirectory::Library).path(sandbox),
            Self::Inbox => Ok(Self::Library.path(sandbox)?.join(INBOX)),
            Self::Search(directory) => sandbox.search(*directory),
        }
    }

    pub fn paths() -> &'static [(&'static str, StoreDirectory)] {
        &NAMES
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NAMES.iter().find(|(n, _)| *n == name).map(|(_, d)| *d)
    }

    /// symbolic name, for the roots that have one
    pub fn name(&self) -> Option<&'static str> {
        NAMES.iter().find(|(_, d)| d == self).map(|(n, _)| *n)
    }

    /// roots an application expects to exist at launch
    pub fn standard() -> [StoreDirectory; 5] {
        [
            Self::Document,
            Self::Library,
            Self::Cache,
            Self::Inbox,
            Self::Temp,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_follow_sandbox_layout() {
        let sandbox = FixedSandbox::new("/app");
        let path = |d: StoreDirectory| d.path(&sandbox).unwrap();
        assert_eq!(path(StoreDirectory::Home), PathBuf::from("/app"));
        assert_eq!(path(StoreDirectory::Temp), PathBuf::from("/app/tmp"));
        assert_eq!(path(StoreDirectory::Document), PathBuf::from("/app/Documents"));
        assert_eq!(path(StoreDirectory::Library), PathBuf::from("/app/Library"));
        assert_eq!(path(StoreDirectory::Cache), PathBuf::from("/app/Library/Caches"));
        assert_eq!(path(StoreDirectory::Inbox), PathBuf::from("/app/Library/Inbox"));
        assert_eq!(
            path(StoreDirectory::Search(SearchDirectory::ApplicationSupport)),
            PathBuf::from("/app/Library/Application Support")
        );
    }

    #[test]
    fn names_round_trip() {
        for (name, directory) in StoreDirectory::paths() {
            assert_eq!(StoreDirectory::from_name(name), Some(*directory));
            assert_eq!(directory.name(), Some(*name));
        }
        assert_eq!(StoreDirectory::from_name("/nope"), None);
        assert_eq!(StoreDirectory::Search(SearchDirectory::Music).name(), None);
    }

    #[test]
    fn resolution_is_not_cached() {
        struct Moving(std::cell::Cell<u32>);
        impl Sandbox for Moving {
            fn home(&self) -> Result<PathBuf> {
                self.0.set(self.0.get() + 1);
                Ok(PathBuf::from(format!("/launch{}", self.0.get())))
            }
            fn temp(&self) -> Result<PathBuf> {
                Err(Error::NoRoot("temp"))
            }
        }
        let sandbox = Moving(std::cell::Cell::new(0));
        let a = StoreDirectory::Document.path(&sandbox).unwrap();
        let b = StoreDirectory::Document.path(&sandbox).unwrap();
        assert_ne!(a, b);
        assert!(StoreDirectory::Temp.path(&sandbox).is_err());
    }
}
