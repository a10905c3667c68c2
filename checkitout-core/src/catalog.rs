//! samples offered in the table: bundled first, then the documents root

use crate::{Filer, Sandbox, Settings, StoreDirectory};

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// last path component, as shown in the table
    pub name: String,
    pub path: PathBuf,
    pub bundled: bool,
}

impl Sample {
    fn new(path: PathBuf, bundled: bool) -> Self {
        let name = path
            .file_name()
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            bundled,
        }
    }

    /// identity used by the pad map
    pub fn key(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    samples: Vec<Sample>,
}

impl Catalog {
    /// rebuild from disk; missing bundled samples and an unreadable documents
    /// root are logged and skipped
    pub fn load<S: Sandbox>(filer: &Filer<S>, settings: &Settings) -> Self {
        let mut samples = Vec::new();
        for name in settings.bundled.iter() {
            let path = settings.bundle.join(format!("{name}.wav"));
            if path.is_file() {
                samples.push(Sample::new(path, true));
            } else {
                log::warn!("bundled sample missing: {}", path.display());
            }
        }
        match filer.ls(StoreDirectory::Document, "") {
            Ok(files) => samples.extend(
                files
                    .into_iter()
                    .filter(|file| !file.is_directory())
                    .map(|file| Sample::new(file.path(), false)),
            ),
            Err(e) => log::warn!("failed to list documents: {e}"),
        }
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, row: usize) -> Option<&Sample> {
        self.samples.get(row)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&Sample> {
        self.samples.iter().find(|v| v.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, FixedSandbox};

    #[test]
    fn bundled_before_documents() {
        let dir = tempfile::tempdir().unwrap();
        let filer = Filer::new(FixedSandbox::new(dir.path().join("home")));
        filer.ensure_roots().unwrap();
        let bundle = dir.path().join("bundle");
        std::fs::create_dir(&bundle).unwrap();
        std::fs::write(bundle.join("kirin.wav"), b"").unwrap();
        std::fs::write(bundle.join("hosaka.wav"), b"").unwrap();
        filer.touch(StoreDirectory::Document, "mine.wav").unwrap();
        filer.mkdir(StoreDirectory::Document, "folder").unwrap();

        let settings = Settings {
            bundle,
            bundled: vec!["hosaka".into(), "missing".into(), "kirin".into()],
            ..Settings::default()
        };
        let catalog = Catalog::load(&filer, &settings);
        let names: Vec<_> = catalog.samples().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["hosaka.wav", "kirin.wav", "mine.wav"]);
        assert!(catalog.get(0).unwrap().bundled);
        assert!(!catalog.get(2).unwrap().bundled);

        let mine = File::document(filer.sandbox(), "mine.wav").unwrap();
        let key = mine.path().display().to_string();
        assert_eq!(catalog.find(&key).map(|v| v.name.as_str()), Some("mine.wav"));
    }

    #[test]
    fn unreadable_documents_keep_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let filer = Filer::new(FixedSandbox::new(dir.path().join("nowhere")));
        let catalog = Catalog::load(
            &filer,
            &Settings {
                bundle: dir.path().to_path_buf(),
                bundled: vec![],
                ..Settings::default()
            },
        );
        assert!(catalog.is_empty());
    }
}
