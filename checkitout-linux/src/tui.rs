use crate::{audio, input, record};

use checkitout_core::{Action, Alert, Mode, Sandbox, Session, PAD_COLUMNS, PAD_COUNT};
use color_eyre::eyre::Result;
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::Stylize,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Padding, Paragraph, Sparkline, Widget, Wrap},
    DefaultTerminal, Frame,
};
use std::{
    collections::VecDeque,
    path::Path,
    sync::mpsc::{Receiver, Sender},
    time::{Duration, Instant},
};

const LOG_DURATION: Duration = Duration::from_millis(1000);
const HIT_DURATION: Duration = Duration::from_millis(150);
const METER_LEN: usize = 256;

pub enum Cmd {
    Log(String),
    /// pad hit from a midi controller
    Pad(usize),
    /// input peak, 0..1
    Meter(f32),
}

pub struct TuiHandler<S: Sandbox> {
    session: Session<S>,
    recorder: Option<record::Recorder>,

    /// table row under the cursor
    cursor: usize,
    editing: bool,
    alert: Option<Alert>,
    hits: heapless::Vec<(u8, Instant), PAD_COUNT>,
    meter: VecDeque<u64>,
    log: Option<(Instant, String)>,
    out_rate: u32,

    audio_tx: Sender<audio::Cmd>,
    tui_tx: Sender<Cmd>,
    /// voices the audio thread is done with
    spent_rx: Receiver<Box<audio::Voice>>,
}

impl<S: Sandbox> TuiHandler<S> {
    pub fn new(
        session: Session<S>,
        audio_tx: Sender<audio::Cmd>,
        tui_tx: Sender<Cmd>,
        spent_rx: Receiver<Box<audio::Voice>>,
        out_rate: u32,
    ) -> Self {
        Self {
            session,
            recorder: None,

            cursor: 0,
            editing: false,
            alert: None,
            hits: heapless::Vec::new(),
            meter: VecDeque::with_capacity(METER_LEN),
            log: None,
            out_rate,

            audio_tx,
            tui_tx,
            spent_rx,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal, tui_rx: Receiver<Cmd>) -> Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        loop {
            let mut flush = false;
            if let Some((start, ..)) = &self.log {
                if start.elapsed() >= LOG_DURATION {
                    self.log = None;
                    flush = true;
                }
            }
            let hits = self.hits.len();
            self.hits.retain(|(_, t)| t.elapsed() < HIT_DURATION);
            flush |= hits != self.hits.len();

            if crossterm::event::poll(Duration::from_millis(16))? {
                if self.kbd()? {
                    break;
                }
                flush = true;
            }
            loop {
                match tui_rx.try_recv() {
                    Ok(cmd) => {
                        self.cmd(cmd)?;
                        flush = true;
                    }
                    Err(std::sync::mpsc::TryRecvError::Empty) => break,
                    Err(e) => Err(e)?,
                }
            }
            // dropped here rather than in the output callback
            self.spent_rx.try_iter().for_each(drop);
            if flush {
                terminal.draw(|frame| self.draw(frame))?;
            }
        }
        if let Some(mut recorder) = self.recorder.take() {
            recorder.stop()?;
        }
        Ok(())
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.log = Some((Instant::now(), msg.into()));
    }

    /// returns true if should exit
    fn kbd(&mut self) -> Result<bool> {
        let event::Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            return Ok(false);
        };
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        // any key dismisses an alert
        if self.alert.take().is_some() {
            return Ok(false);
        }
        if self.editing {
            match code {
                KeyCode::Esc | KeyCode::Enter => self.editing = false,
                KeyCode::Backspace => {
                    self.session.title_mut().pop();
                }
                KeyCode::Char(c) => self.session.title_mut().push(c),
                _ => (),
            }
            return Ok(false);
        }
        match code {
            KeyCode::Esc => return Ok(true),
            KeyCode::F(1) => {
                let actions = self.session.push_play();
                self.cursor = self.cursor.min(self.session.catalog().len().saturating_sub(1));
                self.act_all(actions)?;
            }
            KeyCode::F(2) => {
                let actions = self.session.push_edit();
                self.act_all(actions)?;
            }
            KeyCode::F(3) if self.session.rec_enabled() => {
                let actions = self.session.push_record();
                self.act_all(actions)?;
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.cursor + 1 < self.session.catalog().len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if self.session.select_row(self.cursor) {
                    self.flash("tap a pad to assign");
                }
            }
            KeyCode::F(5) if self.session.mode() == Mode::Record => {
                let action = if self.session.stop_enabled() {
                    self.session.stop_recording()
                } else {
                    self.session.start_recording()
                };
                if let Some(action) = action {
                    self.act(action)?;
                }
            }
            KeyCode::F(6) => {
                if let Some(action) = self.session.play_recording() {
                    self.act(action)?;
                }
            }
            KeyCode::F(7) if self.session.mode() == Mode::Record => self.editing = true,
            KeyCode::F(8) if self.session.mode() == Mode::Record => {
                self.alert = Some(self.session.save());
            }
            KeyCode::Char(c) => {
                if let Some(pad) = input::key_pad(c) {
                    self.pad(pad)?;
                }
            }
            _ => (),
        }
        Ok(false)
    }

    fn cmd(&mut self, cmd: Cmd) -> Result<()> {
        match cmd {
            Cmd::Log(msg) => self.flash(msg),
            Cmd::Pad(pad) => self.pad(pad)?,
            Cmd::Meter(peak) => {
                if self.meter.len() == METER_LEN {
                    self.meter.pop_front();
                }
                self.meter.push_back((peak.clamp(0., 1.) * 100.) as u64);
            }
        }
        Ok(())
    }

    fn pad(&mut self, pad: usize) -> Result<()> {
        if self.hits.is_full() {
            self.hits.remove(0);
        }
        let _ = self.hits.push((pad as u8, Instant::now()));
        if let Some(action) = self.session.tap_pad(pad) {
            self.act(action)?;
        }
        Ok(())
    }

    fn act_all(&mut self, actions: Vec<Action>) -> Result<()> {
        for action in actions {
            self.act(action)?;
        }
        Ok(())
    }

    fn act(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Trigger(pad) => self.audio_tx.send(audio::Cmd::Trigger(pad))?,
            Action::LoadPlayers => self.load_players()?,
            Action::PrepareRecorder => {
                if self.recorder.is_none() {
                    let settings = self.session.settings();
                    match record::Recorder::new(settings.sample_rate, settings.channels) {
                        Ok(recorder) => self.recorder = Some(recorder),
                        Err(e) => {
                            log::warn!("recorder: {e}");
                            self.flash(format!("no recorder: {e}"));
                        }
                    }
                }
            }
            Action::StartRecording(path) => {
                self.meter.clear();
                self.audio_tx.send(audio::Cmd::StopPreview)?;
                let started = match self.recorder.as_mut() {
                    Some(recorder) => recorder
                        .start(&path, self.tui_tx.clone())
                        .inspect_err(|e| log::warn!("record: {e}"))
                        .is_ok(),
                    None => false,
                };
                if !started {
                    self.session.abort_recording();
                    self.flash("recording failed");
                }
            }
            Action::StopRecording => {
                if let Some(recorder) = self.recorder.as_mut() {
                    if let Err(e) = recorder.stop() {
                        log::warn!("record: {e}");
                        self.flash("recording failed");
                    }
                }
            }
            Action::Preview(path) => match self.voice(&path) {
                Some(voice) => self.audio_tx.send(audio::Cmd::Preview(voice))?,
                None => self.flash("nothing to play"),
            },
        }
        Ok(())
    }

    fn voice(&self, path: &Path) -> Option<Box<audio::Voice>> {
        audio::Voice::load(path, self.out_rate)
            .inspect_err(|e| log::warn!("load {}: {e}", path.display()))
            .ok()
            .map(Box::new)
    }

    fn load_players(&mut self) -> Result<()> {
        for (index, path) in self.session.players().iter().enumerate() {
            let voice = path.as_deref().and_then(|v| self.voice(v));
            self.audio_tx.send(audio::Cmd::LoadPad(index, voice))?;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn render_modes(&self, area: Rect, buf: &mut Buffer) {
        let button = |label: &str, enabled: bool| {
            let span = Span::raw(format!(" {label} "));
            if enabled {
                span.bold()
            } else {
                span.reversed()
            }
        };
        let line = Line::from(vec![
            button("F1 play", self.session.play_enabled()),
            Span::raw("  "),
            button("F2 edit", self.session.edit_enabled()),
            Span::raw("  "),
            button("F3 rec", self.session.rec_enabled()),
        ]);
        Paragraph::new(line)
            .centered()
            .block(Block::bordered().title(" checkitout "))
            .render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" samples ")
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        block.render(area, buf);
        let rows = self.session.rows();
        if rows.is_empty() {
            Paragraph::new(Text::raw("no samples found </3")).render(inner, buf);
            return;
        }
        let height = inner.height.max(1) as usize;
        let offset = self.cursor.saturating_sub(height - 1);
        let label_width = 7;
        let name_width = (inner.width as usize).saturating_sub(label_width + 1);
        let edit = self.session.mode() == Mode::Edit;
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, (name, label))| {
                let name: String = name.chars().take(name_width).collect();
                let line = Line::raw(format!("{name:<name_width$} {label:>label_width$}"));
                if self.session.selected() == Some(i) {
                    line.bold().reversed()
                } else if edit && i == self.cursor {
                    line.reversed()
                } else if label == "NONE" {
                    line.dim()
                } else {
                    line
                }
            })
            .collect();
        Paragraph::new(Text::from(lines)).render(inner, buf);
    }

    fn render_pads(&self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::vertical([Constraint::Ratio(1, 4); PAD_COUNT / PAD_COLUMNS]).split(area);
        for (r, row) in rows.iter().enumerate() {
            let cells = Layout::horizontal([Constraint::Ratio(1, 4); PAD_COLUMNS]).split(*row);
            for (c, cell) in cells.iter().enumerate() {
                self.render_pad(r * PAD_COLUMNS + c, *cell, buf);
            }
        }
    }

    fn render_pad(&self, index: usize, area: Rect, buf: &mut Buffer) {
        let name = self
            .session
            .pads()
            .sample_at(index)
            .and_then(|v| Path::new(v).file_stem())
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_else(|| "-".to_string());
        let key = input::pad_key(index).unwrap_or(' ');
        let mut block = Block::bordered().title(format!(" {key} "));
        if self.hits.iter().any(|(i, _)| *i as usize == index) {
            block = block.reversed();
        }
        Paragraph::new(Text::raw(name))
            .centered()
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }

    fn render_record(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().bold().title(" record ");
        let inner = block.inner(area);
        block.render(area, buf);
        let [buttons_area, title_area, meter_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)])
                .areas(inner);
        let button = |label: &str, enabled: bool| {
            let span = Span::raw(format!(" {label} "));
            if enabled {
                span
            } else {
                span.dim()
            }
        };
        let recording = self.recorder.as_ref().is_some_and(|v| v.is_recording());
        Paragraph::new(Line::from(vec![
            button("F5 record", self.session.record_enabled()),
            button("F5 stop", self.session.stop_enabled()),
            button("F6 play", self.session.preview_enabled()),
            button("F8 save", true),
            if recording {
                Span::raw(" ● rec").red()
            } else {
                Span::raw("")
            },
        ]))
        .render(buttons_area, buf);
        let cursor = if self.editing { "_" } else { "" };
        let title = Line::raw(format!(" F7 name: {}{cursor}", self.session.title()));
        Paragraph::new(if self.editing { title.reversed() } else { title }).render(title_area, buf);
        let data: Vec<u64> = self.meter.iter().copied().collect();
        Sparkline::default()
            .data(&data)
            .max(100)
            .render(meter_area, buf);
    }

    fn render_log(&self, area: Rect, buf: &mut Buffer) {
        if let Some((_, msg)) = &self.log {
            Paragraph::new(Text::raw(msg)).centered().render(area, buf);
        }
    }

    fn render_alert(&self, alert: &Alert, area: Rect, buf: &mut Buffer) {
        let [area] = Layout::vertical([Constraint::Length(5)])
            .flex(Flex::Center)
            .areas(area);
        let [area] = Layout::horizontal([Constraint::Max(40)])
            .flex(Flex::Center)
            .areas(area);
        Clear.render(area, buf);
        Paragraph::new(vec![Line::raw(alert.message()), Line::raw(""), Line::raw("[ OK ]").bold()])
            .centered()
            .block(Block::bordered().bold().title(format!(" {} ", alert.title())))
            .render(area, buf);
    }
}

impl<S: Sandbox> Widget for &TuiHandler<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [mode_area, body_area, log_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .areas(area);
        let [table_area, right_area] =
            Layout::horizontal(Constraint::from_percentages([45, 55])).areas(body_area);
        self.render_modes(mode_area, buf);
        self.render_table(table_area, buf);
        if self.session.record_panel_visible() {
            let [pads_area, record_area] =
                Layout::vertical([Constraint::Min(8), Constraint::Length(8)]).areas(right_area);
            self.render_pads(pads_area, buf);
            self.render_record(record_area, buf);
        } else {
            self.render_pads(right_area, buf);
        }
        self.render_log(log_area, buf);
        if let Some(alert) = &self.alert {
            self.render_alert(alert, area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkitout_core::{Filer, FixedSandbox, Settings};
    use std::sync::mpsc::channel;

    fn handler() -> (
        tempfile::TempDir,
        TuiHandler<FixedSandbox>,
        Receiver<audio::Cmd>,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let filer = Filer::new(FixedSandbox::new(dir.path()));
        filer.ensure_roots().unwrap();
        filer.touch(checkitout_core::StoreDirectory::Document, "mine.wav").unwrap();
        let settings = Settings {
            bundled: vec![],
            ..Settings::default()
        };
        let (audio_tx, audio_rx) = channel();
        let (tui_tx, _) = channel();
        let (_, spent_rx) = channel();
        let handler = TuiHandler::new(
            Session::new(filer, settings),
            audio_tx,
            tui_tx,
            spent_rx,
            48000,
        );
        (dir, handler, audio_rx)
    }

    #[test]
    fn midi_pad_triggers_in_play_mode() {
        let (_dir, mut handler, audio_rx) = handler();
        handler.cmd(Cmd::Pad(3)).unwrap();
        assert!(matches!(audio_rx.try_recv(), Ok(audio::Cmd::Trigger(3))));
        assert_eq!(handler.hits.len(), 1);
    }

    #[test]
    fn play_mode_loads_every_pad() {
        let (_dir, mut handler, audio_rx) = handler();
        let actions = handler.session.push_play();
        handler.act_all(actions).unwrap();
        let loads = audio_rx
            .try_iter()
            .filter(|v| matches!(v, audio::Cmd::LoadPad(_, None)))
            .count();
        assert_eq!(loads, PAD_COUNT);
    }

    #[test]
    fn log_flashes_message() {
        let (_dir, mut handler, _audio_rx) = handler();
        handler
            .cmd(Cmd::Log("midi port x unavailable".to_string()))
            .unwrap();
        assert_eq!(
            handler.log.as_ref().map(|(_, msg)| msg.as_str()),
            Some("midi port x unavailable")
        );
    }

    #[test]
    fn meter_is_bounded() {
        let (_dir, mut handler, _audio_rx) = handler();
        for _ in 0..METER_LEN + 10 {
            handler.cmd(Cmd::Meter(2.)).unwrap();
        }
        assert_eq!(handler.meter.len(), METER_LEN);
        assert!(handler.meter.iter().all(|v| *v == 100));
    }

    #[test]
    fn renders_rows_and_labels() {
        let (_dir, mut handler, _audio_rx) = handler();
        handler.session.push_edit();
        handler.session.select_row(0);
        handler.pad(5).unwrap();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        (&handler).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("mine.wav"));
        assert!(text.contains("PAD 5"));
    }
}
