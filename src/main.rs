use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use voxline::audio::source::AudioSource;
use voxline::audio::wav::WavAudioSource;
use voxline::cli::{Cli, Commands};
use voxline::config::Config;
use voxline::engine::vosk::VoskEngine;
use voxline::output::TerminalSink;
use voxline::session::{ControllerConfig, ControllerState, SessionController, scan_models};

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "cpal-audio")]
    voxline::audio::capture::suppress_backend_chatter();

    match &cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_recognition(&cli, &config)?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Models) => {
            let config = load_config(cli.config.as_deref())?;
            list_installed_models(&cli, &config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

/// Model directory scanned when neither --models-dir nor config names one.
fn default_models_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("voxline").join("models"))
}

fn resolve_models_dir(cli: &Cli, config: &Config) -> Option<PathBuf> {
    cli.models_dir
        .clone()
        .or_else(|| config.model.models_dir.as_ref().map(PathBuf::from))
        .or_else(default_models_dir)
}

/// Picks the model to load: explicit flag, then config, then the first
/// installed model in the models directory.
fn resolve_model_path(cli: &Cli, config: &Config) -> Result<PathBuf> {
    if let Some(path) = &cli.model {
        return Ok(path.clone());
    }
    if let Some(path) = &config.model.path {
        return Ok(PathBuf::from(path));
    }

    if let Some(dir) = resolve_models_dir(cli, config)
        && dir.is_dir()
        && let Ok(models) = scan_models(&dir)
        && let Some(first) = models.into_iter().next()
    {
        return Ok(first);
    }

    bail!(
        "no model found; pass --model <DIR> or install one under {}",
        resolve_models_dir(cli, config)
            .unwrap_or_else(|| PathBuf::from("~/.local/share/voxline/models"))
            .display()
    );
}

fn open_audio_source(cli: &Cli, config: &Config) -> Result<Box<dyn AudioSource>> {
    if let Some(wav) = &cli.wav {
        let source = if wav.as_os_str() == "-" {
            WavAudioSource::from_stdin().context("failed to read WAV data from stdin")?
        } else {
            WavAudioSource::open(wav)
                .with_context(|| format!("failed to open {}", wav.display()))?
        };
        return Ok(Box::new(source));
    }

    // Piped stdin without --wav is still pipe mode.
    if !std::io::stdin().is_terminal() {
        let source = WavAudioSource::from_stdin().context("failed to read WAV data from stdin")?;
        return Ok(Box::new(source));
    }

    open_microphone(cli, config)
}

#[cfg(feature = "cpal-audio")]
fn open_microphone(cli: &Cli, config: &Config) -> Result<Box<dyn AudioSource>> {
    let device = cli.device.as_deref().or(config.audio.device.as_deref());
    let source = voxline::audio::capture::CpalAudioSource::new(device)
        .context("failed to open audio input device")?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "cpal-audio"))]
fn open_microphone(_cli: &Cli, _config: &Config) -> Result<Box<dyn AudioSource>> {
    bail!("microphone capture is not compiled in; pipe WAV data or use --wav");
}

fn run_recognition(cli: &Cli, config: &Config) -> Result<()> {
    let model_path = resolve_model_path(cli, config)?;

    let controller_config = ControllerConfig {
        sample_rate: config.audio.sample_rate,
        queue_capacity: config.session.queue_capacity,
        ..Default::default()
    };
    let mut controller = SessionController::new(Arc::new(VoskEngine::new()), controller_config);

    if !cli.quiet {
        eprintln!("voxline: loading model {}", model_path.display());
    }
    controller
        .select_model(&model_path)
        .with_context(|| format!("failed to load model {}", model_path.display()))?;

    let source = open_audio_source(cli, config)?;
    let live_input = !source.is_finite();
    controller.start(source, Box::new(TerminalSink::new(cli.quiet)))?;

    if live_input && !cli.quiet {
        eprintln!("voxline: listening (Ctrl-C to stop)");
    }

    while controller.state() == ControllerState::Recording {
        std::thread::sleep(Duration::from_millis(50));
    }

    controller.shutdown();
    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = voxline::audio::capture::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }
    for device in devices {
        println!("{device}");
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    bail!("microphone capture is not compiled in");
}

fn list_installed_models(cli: &Cli, config: &Config) -> Result<()> {
    let Some(dir) = resolve_models_dir(cli, config) else {
        bail!("could not determine a models directory; pass --models-dir");
    };

    if !dir.is_dir() {
        println!("No models installed under {}.", dir.display());
        return Ok(());
    }

    let models = scan_models(&dir)?;
    if models.is_empty() {
        println!("No models installed under {}.", dir.display());
        return Ok(());
    }

    for model in models {
        println!("{}", model.display());
    }
    Ok(())
}
