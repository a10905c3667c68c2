use crate::tui;

use color_eyre::eyre::{eyre, Result};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SizedSample,
};
use std::{
    io::BufWriter,
    path::Path,
    sync::{mpsc::Sender, Arc, Mutex},
};

type WavWriter = hound::WavWriter<BufWriter<std::fs::File>>;

/// default input device captured to 16-bit pcm wav
pub struct Recorder {
    device: cpal::Device,
    config: cpal::StreamConfig,
    format: cpal::SampleFormat,
    writer: Arc<Mutex<Option<WavWriter>>>,
    stream: Option<cpal::Stream>,
}

impl Recorder {
    /// open the default input, preferring `channels` at `sample_rate`
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| eyre!("no input device"))?;
        let preferred = device
            .supported_input_configs()?
            .find(|c| {
                c.channels() == channels
                    && c.min_sample_rate().0 <= sample_rate
                    && sample_rate <= c.max_sample_rate().0
            })
            .map(|c| c.with_sample_rate(cpal::SampleRate(sample_rate)));
        let supported = match preferred {
            Some(config) => config,
            None => {
                let config = device.default_input_config()?;
                log::warn!(
                    "input cannot do {channels}ch @ {sample_rate} Hz, using {}ch @ {} Hz",
                    config.channels(),
                    config.sample_rate().0
                );
                config
            }
        };
        log::info!(
            "recorder ready on {}",
            device.name().unwrap_or_else(|_| "unknown device".to_string())
        );
        Ok(Self {
            device,
            format: supported.sample_format(),
            config: supported.into(),
            writer: Arc::new(Mutex::new(None)),
            stream: None,
        })
    }

    /// start capturing into `path`, replacing any earlier take
    pub fn start(&mut self, path: &Path, tui_tx: Sender<tui::Cmd>) -> Result<()> {
        self.stop()?;
        let spec = hound::WavSpec {
            channels: self.config.channels,
            sample_rate: self.config.sample_rate.0,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        *self.writer.lock().map_err(|_| eyre!("recorder poisoned"))? =
            Some(hound::WavWriter::create(path, spec)?);
        let stream = match self.format {
            cpal::SampleFormat::F32 => self.build::<f32>(tui_tx)?,
            cpal::SampleFormat::I16 => self.build::<i16>(tui_tx)?,
            cpal::SampleFormat::U16 => self.build::<u16>(tui_tx)?,
            cpal::SampleFormat::I32 => self.build::<i32>(tui_tx)?,
            other => return Err(eyre!("unsupported input sample format {other}")),
        };
        stream.play()?;
        self.stream = Some(stream);
        log::info!("recording to {}", path.display());
        Ok(())
    }

    fn build<T>(&self, tui_tx: Sender<tui::Cmd>) -> Result<cpal::Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let writer = self.writer.clone();
        let err_tx = tui_tx.clone();
        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let peak = data
                    .iter()
                    .copied()
                    .map(|v| v.to_sample::<f32>().abs())
                    .fold(0f32, f32::max);
                if let Ok(mut writer) = writer.lock() {
                    if let Some(writer) = writer.as_mut() {
                        for v in data.iter().copied() {
                            let v: f32 = v.to_sample();
                            if let Err(e) = writer.write_sample(v.to_sample::<i16>()) {
                                log::error!("record: {e}");
                                break;
                            }
                        }
                    }
                }
                let _ = tui_tx.send(tui::Cmd::Meter(peak));
            },
            move |e| {
                log::error!("input stream: {e}");
                let _ = err_tx.send(tui::Cmd::Log(format!("input: {e}")));
            },
            None,
        )?;
        Ok(stream)
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    /// stop capturing and finalize the wav header
    pub fn stop(&mut self) -> Result<()> {
        self.stream = None;
        let writer = self
            .writer
            .lock()
            .map_err(|_| eyre!("recorder poisoned"))?
            .take();
        if let Some(writer) = writer {
            writer.finalize()?;
            log::info!("recording stopped");
        }
        Ok(())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("recorder: {e}");
        }
    }
}
