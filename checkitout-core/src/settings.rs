//! persisted application settings

use crate::{File, Result, Sandbox, StoreDirectory};

use std::path::PathBuf;

const FILE_NAME: &str = "settings.json";

/// samples shipped next to the binary, in table order
const BUNDLED: [&str; 20] = [
    "hosaka",
    "kirin",
    "taguchi",
    "touyou",
    "1korekara_cut",
    "2korekara_cut",
    "3apuri_cut",
    "4setumei_cut",
    "5suruze_cut",
    "6onsei_cut",
    "7rokuon_cut",
    "8minnnawo_cut",
    "9rockon_cut",
    "10korede_cut",
    "11yourname_cut",
    "12todoroku_cut",
    "13menber_cut",
    "14menta-_cut",
    "15minnade_cut",
    "16chekera_cut",
];

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// directory holding the bundled samples
    pub bundle: PathBuf,
    /// bundled sample names, without the `.wav` extension
    pub bundled: Vec<String>,
    /// scratch recording, relative to the documents root
    pub scratch: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// midi note mapped to pad 0
    pub midi_base_note: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bundle: PathBuf::from("samples"),
            bundled: BUNDLED.iter().map(|v| v.to_string()).collect(),
            scratch: "temp.wav".to_string(),
            sample_rate: 44100,
            channels: 2,
            midi_base_note: 36,
        }
    }
}

impl Settings {
    fn file<S: Sandbox + ?Sized>(sandbox: &S) -> Result<File> {
        File::with_name(sandbox, StoreDirectory::Library, FILE_NAME)
    }

    /// read settings from the library, writing defaults there on first launch
    pub fn load<S: Sandbox + ?Sized>(sandbox: &S) -> Result<Self> {
        let file = Self::file(sandbox)?;
        if !file.exists() {
            let settings = Self::default();
            settings.save(sandbox)?;
            log::info!("wrote default settings to {}", file.path().display());
            return Ok(settings);
        }
        Ok(serde_json::from_str(&file.read()?)?)
    }

    pub fn save<S: Sandbox + ?Sized>(&self, sandbox: &S) -> Result<()> {
        Self::file(sandbox)?.write(&serde_json::to_string_pretty(self)?)
    }
}
