//! Main application entry point (native).

#[cfg(feature = "native")]
mod cli {
    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use inkmark_app::{App, AppConfig, ExportFormat, load_clipboard, load_file, load_script};
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(
        name = "inkmark",
        version,
        about = "Annotate an image with freehand strokes and text, then export it"
    )]
    struct Cli {
        /// Image to annotate
        image: Option<PathBuf>,
        /// Take the image from the clipboard instead of a file
        #[arg(long, conflicts_with = "image")]
        clipboard: bool,
        /// JSON session script to replay against the image
        #[arg(long)]
        script: Option<PathBuf>,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory exports are written to
        #[arg(long, short, default_value = ".")]
        output_dir: PathBuf,
        /// Export format (overrides the config file)
        #[arg(long, value_parser = parse_format)]
        format: Option<ExportFormat>,
        /// Font file for labels and the stamp
        #[arg(long)]
        font: Option<PathBuf>,
        /// Leave the file name and date stamp off exports
        #[arg(long)]
        no_stamp: bool,
        /// Also write the final display-size frame as PNG
        #[arg(long)]
        preview: Option<PathBuf>,
    }

    fn parse_format(value: &str) -> Result<ExportFormat, String> {
        match value.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            other => Err(format!("unsupported format `{other}` (expected jpeg or png)")),
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let mut config = match &cli.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(format) = cli.format {
            config.format = format;
        }
        if let Some(font) = cli.font {
            config.font_path = Some(font);
        }
        if cli.no_stamp {
            config.stamp = false;
        }

        let fonts = config.fonts();
        let date = chrono::Local::now().format("%m/%d/%Y").to_string();
        let mut app = App::new(config, fonts).with_stamp_date(date);

        let image = match (&cli.image, cli.clipboard) {
            (Some(path), _) => load_file(path)?,
            (None, true) => load_clipboard()?,
            (None, false) => bail!("no image given; pass a path or --clipboard"),
        };
        app.load(image)?;

        let mut exports = match &cli.script {
            Some(path) => app.replay(&load_script(path)?)?,
            None => Vec::new(),
        };
        if exports.is_empty() {
            exports.push(app.export(None)?);
        }

        std::fs::create_dir_all(&cli.output_dir)
            .with_context(|| format!("creating {}", cli.output_dir.display()))?;
        for export in &exports {
            let path = cli.output_dir.join(&export.file_name);
            std::fs::write(&path, &export.bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Exported {}", path.display());
            println!("{}", path.display());
        }

        if let Some(path) = &cli.preview {
            app.frame()?
                .save(path)
                .with_context(|| format!("writing preview {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(feature = "native")]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting inkmark");

    cli::run()
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
