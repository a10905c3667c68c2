use checkitout_core::PAD_COUNT;

use color_eyre::eyre::{eyre, Result};
use cpal::{
    traits::DeviceTrait,
    FromSample, Sample, SizedSample,
};
use std::{
    path::Path,
    sync::mpsc::{Receiver, Sender},
    sync::Arc,
};

pub enum Cmd {
    LoadPad(usize, Option<Box<Voice>>),
    Trigger(usize),
    Preview(Box<Voice>),
    StopPreview,
}

/// a sample decoded into memory, played from the start on every trigger
pub struct Voice {
    /// interleaved frames, -1..1
    pcm: Arc<[f32]>,
    channels: usize,
    /// source frames per output frame
    step: f64,
    /// fractional frame index
    pos: f64,
    playing: bool,
}

impl Voice {
    pub fn load(path: &Path, out_rate: u32) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let pcm: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };
        log::debug!(
            "loaded {} ({} frames, {} Hz)",
            path.display(),
            pcm.len() / spec.channels.max(1) as usize,
            spec.sample_rate
        );
        Ok(Self::new(pcm, spec.channels, spec.sample_rate, out_rate))
    }

    pub fn new(pcm: Vec<f32>, channels: u16, rate: u32, out_rate: u32) -> Self {
        Self {
            pcm: pcm.into(),
            channels: channels.max(1) as usize,
            step: rate as f64 / out_rate.max(1) as f64,
            pos: 0.,
            playing: false,
        }
    }

    fn frames(&self) -> usize {
        self.pcm.len() / self.channels
    }

    /// restart from the first frame
    pub fn trigger(&mut self) {
        self.pos = 0.;
        self.playing = true;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// mix into an interleaved buffer with linear interpolation
    fn read_add(&mut self, buffer: &mut [f32], channels: usize) {
        if !self.playing {
            return;
        }
        let frames = self.frames();
        for frame in buffer.chunks_exact_mut(channels) {
            let index = self.pos as usize;
            if index + 1 >= frames {
                self.playing = false;
                return;
            }
            let fract = self.pos.fract() as f32;
            for (c, out) in frame.iter_mut().enumerate() {
                // mono sources feed every output channel
                let src = c % self.channels;
                let a = self.pcm[index * self.channels + src];
                let b = self.pcm[(index + 1) * self.channels + src];
                *out += a + (b - a) * fract;
            }
            self.pos += self.step;
        }
    }
}

pub struct SystemHandler {
    voices: [Option<Box<Voice>>; PAD_COUNT],
    preview: Option<Box<Voice>>,
    mix: Vec<f32>,
    cmd_rx: Receiver<Cmd>,
    /// replaced voices go back so they are freed off the audio thread
    spent_tx: Sender<Box<Voice>>,
}

impl SystemHandler {
    pub fn new(cmd_rx: Receiver<Cmd>, spent_tx: Sender<Box<Voice>>) -> Self {
        Self {
            voices: core::array::from_fn(|_| None),
            preview: None,
            mix: Vec::new(),
            cmd_rx,
            spent_tx,
        }
    }

    fn retire(&self, voice: Option<Box<Voice>>) {
        if let Some(voice) = voice {
            let _ = self.spent_tx.send(voice);
        }
    }

    fn cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::LoadPad(index, voice) => {
                if let Some(slot) = self.voices.get_mut(index) {
                    let old = core::mem::replace(slot, voice);
                    self.retire(old);
                }
            }
            Cmd::Trigger(index) => {
                if let Some(voice) = self.voices.get_mut(index).and_then(|v| v.as_mut()) {
                    voice.trigger();
                }
            }
            Cmd::Preview(mut voice) => {
                voice.trigger();
                let old = self.preview.replace(voice);
                self.retire(old);
            }
            Cmd::StopPreview => {
                let old = self.preview.take();
                self.retire(old);
            }
        }
    }

    pub fn tick<T>(&mut self, buffer: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<f32>,
    {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            self.cmd(cmd);
        }
        self.mix.clear();
        self.mix.resize(buffer.len(), 0.);
        for voice in self.voices.iter_mut().flatten() {
            voice.read_add(&mut self.mix, channels);
        }
        if let Some(voice) = self.preview.as_mut() {
            voice.read_add(&mut self.mix, channels);
        }
        for (out, v) in buffer.iter_mut().zip(self.mix.iter()) {
            *out = T::from_sample(v.clamp(-1., 1.));
        }
    }
}

pub fn build_output(
    device: &cpal::Device,
    config: cpal::SupportedStreamConfig,
    handler: SystemHandler,
) -> Result<cpal::Stream> {
    let format = config.sample_format();
    let config: cpal::StreamConfig = config.into();
    match format {
        cpal::SampleFormat::F32 => run::<f32>(device, &config, handler),
        cpal::SampleFormat::I16 => run::<i16>(device, &config, handler),
        cpal::SampleFormat::U16 => run::<u16>(device, &config, handler),
        cpal::SampleFormat::I32 => run::<i32>(device, &config, handler),
        other => Err(eyre!("unsupported output sample format {other}")),
    }
}

fn run<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut handler: SystemHandler,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |buffer: &mut [T], _: &cpal::OutputCallbackInfo| handler.tick(buffer, channels),
        |e| log::error!("output stream: {e}"),
        None,
    )?;
    Ok(stream)
}
