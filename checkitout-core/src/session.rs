//! pad screen logic, independent of any toolkit
//!
//! The frontend forwards button presses here and carries out the returned
//! [`Action`]s against its audio backend; [`Alert`]s are shown to the user.

use crate::{Catalog, File, Filer, Mode, PadMap, Result, Sandbox, Settings, StoreDirectory, PAD_COUNT};

use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordState {
    #[default]
    Idle,
    Recording,
    Recorded,
}

/// side effects for the audio backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// play pad from the start, restarting it if already playing
    Trigger(usize),
    /// rebuild every pad voice from [`Session::players`]
    LoadPlayers,
    PrepareRecorder,
    StartRecording(PathBuf),
    StopRecording,
    Preview(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alert {
    EmptyName,
    SaveFailed,
    Saved(String),
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Alert::EmptyName | Alert::SaveFailed => "ERROR",
            Alert::Saved(_) => "saved",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Alert::EmptyName => "set a file name first".to_string(),
            Alert::SaveFailed => "save failed".to_string(),
            Alert::Saved(name) => format!("saved {name}"),
        }
    }
}

pub struct Session<S: Sandbox> {
    filer: Filer<S>,
    settings: Settings,
    catalog: Catalog,
    pads: PadMap,
    mode: Mode,
    selected: Option<usize>,
    record: RecordState,
    title: String,
}

impl<S: Sandbox> Session<S> {
    pub fn new(filer: Filer<S>, settings: Settings) -> Self {
        let catalog = Catalog::load(&filer, &settings);
        Self {
            filer,
            settings,
            catalog,
            pads: PadMap::new(),
            mode: Mode::Play,
            selected: None,
            record: RecordState::Idle,
            title: String::new(),
        }
    }

    pub fn filer(&self) -> &Filer<S> {
        &self.filer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pads(&self) -> &PadMap {
        &self.pads
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn record_state(&self) -> RecordState {
        self.record
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }

    pub fn reload(&mut self) {
        self.catalog = Catalog::load(&self.filer, &self.settings);
    }

    /// (name, pad label) per table row
    pub fn rows(&self) -> Vec<(String, String)> {
        self.catalog
            .samples()
            .iter()
            .map(|v| (v.name.clone(), self.pads.label(&v.key())))
            .collect()
    }

    /// file behind every pad, for building voices
    pub fn players(&self) -> [Option<PathBuf>; PAD_COUNT] {
        core::array::from_fn(|i| self.pads.sample_at(i).map(PathBuf::from))
    }

    pub fn scratch(&self) -> Result<File> {
        File::with_path(self.filer.sandbox(), StoreDirectory::Document, &self.settings.scratch)
    }

    pub fn record_panel_visible(&self) -> bool {
        self.mode == Mode::Record
    }

    pub fn play_enabled(&self) -> bool {
        self.mode != Mode::Play
    }

    pub fn edit_enabled(&self) -> bool {
        self.mode != Mode::Edit
    }

    pub fn rec_enabled(&self) -> bool {
        self.mode != Mode::Record
    }

    pub fn record_enabled(&self) -> bool {
        self.record != RecordState::Recording
    }

    pub fn stop_enabled(&self) -> bool {
        self.record == RecordState::Recording
    }

    pub fn preview_enabled(&self) -> bool {
        self.record == RecordState::Recorded
    }

    pub fn tap_pad(&mut self, pad: usize) -> Option<Action> {
        if pad >= PAD_COUNT {
            return None;
        }
        match self.mode {
            Mode::Play => Some(Action::Trigger(pad)),
            Mode::Edit => {
                let row = self.selected.take()?;
                if let Some(sample) = self.catalog.get(row) {
                    self.pads.assign(&sample.key(), pad);
                }
                None
            }
            Mode::Record => None,
        }
    }

    /// only in edit mode
    pub fn select_row(&mut self, row: usize) -> bool {
        if self.mode != Mode::Edit || row >= self.catalog.len() {
            return false;
        }
        self.selected = Some(row);
        true
    }

    fn leave_record(&mut self, actions: &mut Vec<Action>) {
        if self.record == RecordState::Recording {
            actions.push(Action::StopRecording);
            self.record = RecordState::Recorded;
        }
    }

    pub fn push_play(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.leave_record(&mut actions);
        self.mode = Mode::Play;
        self.selected = None;
        self.reload();
        actions.push(Action::LoadPlayers);
        actions
    }

    pub fn push_edit(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.leave_record(&mut actions);
        self.mode = Mode::Edit;
        actions
    }

    /// no-op when already recording mode, so a running take is never lost
    pub fn push_record(&mut self) -> Vec<Action> {
        if self.mode == Mode::Record {
            return Vec::new();
        }
        self.mode = Mode::Record;
        self.selected = None;
        self.record = RecordState::Idle;
        vec![Action::PrepareRecorder]
    }

    pub fn start_recording(&mut self) -> Option<Action> {
        if self.mode != Mode::Record || !self.record_enabled() {
            return None;
        }
        let path = self.scratch().inspect_err(|e| log::warn!("{e}")).ok()?.path();
        self.record = RecordState::Recording;
        Some(Action::StartRecording(path))
    }

    pub fn stop_recording(&mut self) -> Option<Action> {
        if !self.stop_enabled() {
            return None;
        }
        self.record = RecordState::Recorded;
        Some(Action::StopRecording)
    }

    /// recorder never started, nothing to preview
    pub fn abort_recording(&mut self) {
        if self.record == RecordState::Recording {
            self.record = RecordState::Idle;
        }
    }

    pub fn play_recording(&self) -> Option<Action> {
        if self.mode != Mode::Record || !self.preview_enabled() {
            return None;
        }
        Some(Action::Preview(self.scratch().ok()?.path()))
    }

    /// move the scratch recording to `<title>.wav` in the documents root
    pub fn save(&mut self) -> Alert {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Alert::EmptyName;
        }
        // the take stays a direct child of the documents root
        if title.contains(['/', '\\', '\0']) {
            log::warn!("refusing to save as {title:?}");
            return Alert::SaveFailed;
        }
        if self.record == RecordState::Recording {
            log::warn!("refusing to save while recording");
            return Alert::SaveFailed;
        }
        let name = format!("{title}.wav");
        match self
            .filer
            .mv(StoreDirectory::Document, &self.settings.scratch, &name)
        {
            Ok(()) => {
                log::info!("saved {name}");
                self.record = RecordState::Idle;
                self.reload();
                Alert::Saved(name)
            }
            Err(e) => {
                log::warn!("save {name}: {e}");
                Alert::SaveFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedSandbox;

    fn session() -> (tempfile::TempDir, Session<FixedSandbox>) {
        let dir = tempfile::tempdir().unwrap();
        let filer = Filer::new(FixedSandbox::new(dir.path().join("home")));
        filer.ensure_roots().unwrap();
        let bundle = dir.path().join("bundle");
        std::fs::create_dir(&bundle).unwrap();
        for name in ["a", "b", "c"] {
            std::fs::write(bundle.join(format!("{name}.wav")), b"").unwrap();
        }
        let settings = Settings {
            bundle,
            bundled: vec!["a".into(), "b".into(), "c".into()],
            ..Settings::default()
        };
        (dir, Session::new(filer, settings))
    }

    #[test]
    fn play_mode_triggers() {
        let (_dir, mut session) = session();
        assert_eq!(session.mode(), Mode::Play);
        assert!(!session.play_enabled());
        assert_eq!(session.tap_pad(3), Some(Action::Trigger(3)));
        assert_eq!(session.tap_pad(PAD_COUNT), None);
        assert!(!session.select_row(0));
    }

    #[test]
    fn edit_assigns_selected_row() {
        let (_dir, mut session) = session();
        session.push_edit();
        assert_eq!(session.tap_pad(0), None);
        assert!(session.pads().is_empty());

        assert!(session.select_row(1));
        assert_eq!(session.tap_pad(4), None);
        assert_eq!(session.selected(), None);
        assert_eq!(session.rows()[1].1, "PAD 4");

        // same sample onto another pad moves it
        session.select_row(1);
        session.tap_pad(7);
        assert_eq!(session.rows()[1].1, "PAD 7");
        assert_eq!(session.pads().sample_at(4), None);

        // another sample onto a taken pad evicts
        session.select_row(0);
        session.tap_pad(7);
        assert_eq!(session.rows()[0].1, "PAD 7");
        assert_eq!(session.rows()[1].1, "NONE");
        assert!(!session.select_row(99));
    }

    #[test]
    fn push_play_rebuilds_players() {
        let (_dir, mut session) = session();
        session.push_edit();
        session.select_row(2);
        session.tap_pad(0);
        session.select_row(1);
        assert_eq!(session.push_play(), vec![Action::LoadPlayers]);
        assert_eq!(session.selected(), None);
        let players = session.players();
        assert_eq!(players[0], session.catalog().get(2).map(|v| v.path.clone()));
        assert!(players[1..].iter().all(Option::is_none));
    }

    #[test]
    fn record_flow_and_save() {
        let (_dir, mut session) = session();
        assert_eq!(session.start_recording(), None);
        assert_eq!(session.push_record(), vec![Action::PrepareRecorder]);
        assert!(session.record_panel_visible());
        assert!(session.record_enabled() && !session.stop_enabled() && !session.preview_enabled());
        assert_eq!(session.play_recording(), None);

        let scratch = session.scratch().unwrap();
        assert_eq!(
            session.start_recording(),
            Some(Action::StartRecording(scratch.path()))
        );
        assert!(!session.record_enabled() && session.stop_enabled());
        assert_eq!(session.start_recording(), None);
        session.abort_recording();
        assert!(session.record_enabled() && !session.preview_enabled());
        assert!(session.start_recording().is_some());
        session.title_mut().push_str("kick");
        assert_eq!(session.save(), Alert::SaveFailed);

        scratch.write_data(b"RIFF").unwrap();
        assert_eq!(session.stop_recording(), Some(Action::StopRecording));
        assert!(session.preview_enabled());
        assert_eq!(
            session.play_recording(),
            Some(Action::Preview(scratch.path()))
        );

        assert_eq!(session.save(), Alert::Saved("kick.wav".to_string()));
        assert!(!scratch.exists());
        assert_eq!(session.record_state(), RecordState::Idle);
        assert_eq!(session.catalog().len(), 4);
        assert!(session
            .catalog()
            .samples()
            .iter()
            .any(|v| v.name == "kick.wav"));
    }

    #[test]
    fn save_alerts() {
        let (_dir, mut session) = session();
        session.push_record();
        session.title_mut().push_str("   ");
        assert_eq!(session.save(), Alert::EmptyName);
        session.title_mut().push_str("take");
        // nothing recorded yet
        assert_eq!(session.save(), Alert::SaveFailed);
        assert_eq!(Alert::SaveFailed.title(), "ERROR");
    }

    #[test]
    fn reentering_record_keeps_take() {
        let (_dir, mut session) = session();
        session.push_record();
        let scratch = session.scratch().unwrap();
        assert!(session.start_recording().is_some());
        scratch.write_data(b"RIFF").unwrap();
        assert_eq!(session.push_record(), vec![]);
        assert_eq!(session.record_state(), RecordState::Recording);
        session.title_mut().push_str("kick");
        assert_eq!(session.save(), Alert::SaveFailed);
        assert!(scratch.exists());
        assert_eq!(session.stop_recording(), Some(Action::StopRecording));
        assert_eq!(session.save(), Alert::Saved("kick.wav".to_string()));
    }

    #[test]
    fn save_stays_in_documents() {
        let (_dir, mut session) = session();
        session.push_record();
        let scratch = session.scratch().unwrap();
        scratch.write_data(b"RIFF").unwrap();
        session.start_recording();
        session.stop_recording();
        for title in ["../kick", "sub/kick", "a\\b"] {
            session.title_mut().clear();
            session.title_mut().push_str(title);
            assert_eq!(session.save(), Alert::SaveFailed);
            assert!(scratch.exists());
        }
        assert!(!session.filer().exists(StoreDirectory::Home, "kick.wav"));
    }

    #[test]
    fn leaving_record_stops_recorder() {
        let (_dir, mut session) = session();
        session.push_record();
        session.start_recording();
        assert_eq!(session.push_edit(), vec![Action::StopRecording]);
        assert_eq!(session.record_state(), RecordState::Recorded);
        assert!(!session.record_panel_visible());
    }
}
