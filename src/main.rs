//! Headless flattening tool.
//!
//! Loads a radiograph, applies a recorded inference response and a saved
//! drawing set, and writes the flattened `annotated_<name>` PNG.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use thiserror::Error;

    use opgat::config::{AppConfig, ConfigError};
    use opgat::editor::EditorMessage;
    use opgat::export::ExportError;
    use opgat::inference::{InferenceMode, RecordedClient};
    use opgat::model::Drawing;
    use opgat::render::{load_font, load_system_font};
    use opgat::scaling::Size;
    use opgat::session::{InferenceOutcome, NoticeLevel, Session};

    #[derive(Parser, Debug)]
    #[command(
        name = "opgat-native",
        version,
        about = "Flatten dental radiograph annotations into a PNG"
    )]
    pub struct Cli {
        /// Source radiograph
        #[arg(long)]
        image: PathBuf,
        /// Recorded inference response JSON
        #[arg(long)]
        response: Option<PathBuf>,
        /// Drawings JSON array, in displayed-canvas pixels
        #[arg(long)]
        drawings: Option<PathBuf>,
        /// Width the drawings were made at (defaults to the image width)
        #[arg(long, requires = "displayed_height")]
        displayed_width: Option<f32>,
        /// Height the drawings were made at (defaults to the image height)
        #[arg(long, requires = "displayed_width")]
        displayed_height: Option<f32>,
        /// Inference model: qc or path
        #[arg(long, value_parser = parse_mode)]
        mode: Option<InferenceMode>,
        /// Export the bare image without annotations
        #[arg(long)]
        no_annotations: bool,
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Configuration file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Remember --mode as the default mode in the configuration file
        #[arg(long, requires = "mode")]
        pub save_mode: bool,
    }

    fn parse_mode(value: &str) -> Result<InferenceMode, String> {
        InferenceMode::from_model_name(value)
            .ok_or_else(|| format!("unknown mode '{}', expected qc or path", value))
    }

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("I/O error on {path:?}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },

        #[error("Cannot decode image: {0}")]
        Image(#[from] image::ImageError),

        #[error("Invalid drawings file: {0}")]
        Drawings(#[from] serde_json::Error),

        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error(transparent)]
        Export(#[from] ExportError),
    }

    fn read(path: &Path) -> Result<Vec<u8>, CliError> {
        std::fs::read(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_string(path: &Path) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
        match &cli.config {
            Some(path) => Ok(AppConfig::load(path)?),
            None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    /// Store `--mode` as the default mode, in `--config` or the default path.
    pub fn save_mode(cli: &Cli, config: &mut AppConfig) -> Result<(), CliError> {
        let Some(mode) = cli.mode else {
            return Ok(());
        };
        config.default_mode = mode;
        match &cli.config {
            Some(path) => config.save(path)?,
            None => config.save_to_default_path()?,
        }
        Ok(())
    }

    pub fn run(cli: &Cli, config: &AppConfig) -> Result<PathBuf, CliError> {
        let font = config
            .font_path
            .as_deref()
            .and_then(|path| load_font(Path::new(path)))
            .or_else(load_system_font);
        let mut session = Session::from_config(config).with_font(font);
        if let Some(mode) = cli.mode {
            session.set_mode(mode);
        }

        let file_name = cli
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.png".to_string());
        let pending = session.load_image(file_name, read(&cli.image)?)?;

        match (pending, &cli.response) {
            (Some(pending), Some(path)) => {
                log::info!(
                    "📼 Using recorded response {:?} in place of {}",
                    path,
                    pending.endpoint
                );
                let mut client = RecordedClient::new(read_string(path)?);
                if let InferenceOutcome::Applied { classes } = session.run_inference(&mut client, pending) {
                    log::info!("🦷 Applied {} detection classes", classes);
                }
            }
            _ => log::info!("No inference response given, exporting drawings only"),
        }

        if let Some(path) = &cli.drawings {
            let drawings: Vec<Drawing> = serde_json::from_str(&read_string(path)?)?;
            log::info!("✏️ Loaded {} drawings", drawings.len());
            session.editor_mut().store_mut().replace_drawings(drawings);
        }

        let displayed = match (cli.displayed_width, cli.displayed_height) {
            (Some(width), Some(height)) => Size::new(width, height),
            _ => session.image().map(|i| i.size()).unwrap_or_default(),
        };
        session.observe_display_size(displayed);

        if cli.no_annotations {
            session.update(EditorMessage::SetAnnotationsEnabled(false));
        }

        let result = session.export();
        for notice in session.take_notices() {
            match notice.level {
                NoticeLevel::Success => log::info!("✅ {}", notice.message),
                NoticeLevel::Error => log::error!("❌ {}", notice.message),
            }
        }
        let artifact = result?;

        std::fs::create_dir_all(&cli.out_dir).map_err(|source| CliError::Io {
            path: cli.out_dir.clone(),
            source,
        })?;
        Ok(artifact.write_to(&cli.out_dir)?)
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    let cli = cli::Cli::parse();
    let mut config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if cli.save_mode {
        if let Err(e) = cli::save_mode(&cli, &mut config) {
            log::error!("❌ Failed to save configuration: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    }

    match cli::run(&cli, &config) {
        Ok(path) => {
            println!("{}", path.display());
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
