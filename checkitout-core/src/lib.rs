//! sandboxed file store and pad session logic shared by every frontend

use std::path::{Path, PathBuf};

pub mod catalog;
pub mod file;
pub mod filer;
pub mod pads;
pub mod path;
pub mod reader;
pub mod session;
pub mod settings;
pub mod store;
pub mod writer;

pub use catalog::{Catalog, Sample};
pub use file::File;
pub use filer::Filer;
pub use pads::{Mode, PadMap};
pub use reader::FileReader;
pub use session::{Action, Alert, RecordState, Session};
pub use settings::Settings;
pub use store::{FixedSandbox, OsSandbox, Sandbox, SearchDirectory, StoreDirectory};
pub use writer::FileWriter;

pub const PAD_COUNT: usize = 16;
pub const PAD_COLUMNS: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no {0} directory on this system")]
    NoRoot(&'static str),
    #[error("{} is not valid utf-8", .path.display())]
    Utf8 { path: PathBuf },
    #[error("bad settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} is outside the sandbox")]
    NotInSandbox(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// attach the offending path to a std::io error
pub(crate) trait IoContext<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}
