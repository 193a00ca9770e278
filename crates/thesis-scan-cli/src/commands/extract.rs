//! Extract command - run one extraction mode over a set of page images.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use thesis_scan_core::models::config::{ScanConfig, TuningPreset};
use thesis_scan_core::{ExtractionMode, ExtractionResult, ScanEngine, create_engine_from_dir};

use super::config::load_config;
use super::models::{get_active_variant, get_variant_dir};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Fields to extract
    #[arg(value_enum)]
    mode: ModeArg,

    /// Page images or glob patterns, in page order
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Options shared by every command that runs recognition.
#[derive(Args)]
pub struct EngineArgs {
    /// Model directory
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Tuning preset
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Fail when any image cannot be decoded
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Title and authors from the title page
    TitleAuthors,
    /// Program/course and publication date
    ProgramDate,
    /// Abstract body
    Abstract,
    /// Keyword list
    Keywords,
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::TitleAuthors => ExtractionMode::TitleAuthors,
            ModeArg::ProgramDate => ExtractionMode::ProgramDate,
            ModeArg::Abstract => ExtractionMode::Abstract,
            ModeArg::Keywords => ExtractionMode::Keywords,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PresetArg {
    /// CPU friendly: smaller pages, no magnification
    LowResource,
    /// Larger pages, magnified recognition, confidence floors
    HighFidelity,
}

impl From<PresetArg> for TuningPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::LowResource => TuningPreset::LowResource,
            PresetArg::HighFidelity => TuningPreset::HighFidelity,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mode = ExtractionMode::from(args.mode);

    let config = engine_config(&args.engine, config_path)?;
    let files = expand_inputs(&args.inputs)?;
    let model_dir = resolve_model_dir(args.engine.model_dir.as_deref(), &config)?;

    info!("Extracting {} from {} images", mode, files.len());

    let images = read_images(&files)?;

    let pb = spinner();
    pb.set_message("Loading OCR models...");
    let engine = load_engine(&model_dir, config)?;

    pb.set_message(format!("Extracting {}...", mode));
    let result = tokio::task::spawn_blocking(move || engine.extract(mode, &images)).await??;
    pb.finish_and_clear();

    let output = format_result(&result, args.format)?;
    write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Load configuration and apply command line overrides.
pub fn engine_config(args: &EngineArgs, config_path: Option<&str>) -> anyhow::Result<ScanConfig> {
    let mut config = load_config(config_path)?;

    if let Some(preset) = args.preset {
        config.apply_preset(preset.into());
    }
    if args.strict {
        config.extraction.strict_decode = true;
    }

    debug!("Using {} preset", config.ocr.preset);

    Ok(config)
}

/// Expand file arguments and glob patterns into image paths.
///
/// Arguments keep their order; matches of one pattern are sorted.
pub fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.contains(['*', '?', '[']) {
            let mut matches: Vec<PathBuf> = glob(input)?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect();
            matches.sort();

            if matches.is_empty() {
                anyhow::bail!("No files match pattern: {}", input);
            }
            files.extend(matches);
        } else {
            let path = PathBuf::from(input);
            if !path.is_file() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            files.push(path);
        }
    }

    Ok(files)
}

/// Pick the model directory: explicit flag, configured directory, then the
/// active downloaded variant.
pub fn resolve_model_dir(explicit: Option<&Path>, config: &ScanConfig) -> anyhow::Result<PathBuf> {
    let model_dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None if config.model_path(&config.models.detection_model).exists() => {
            config.models.model_dir.clone()
        }
        None => get_variant_dir(get_active_variant()),
    };

    let required = [
        &config.models.detection_model,
        &config.models.recognition_model,
        &config.models.dictionary,
    ];
    if required.iter().any(|name| !model_dir.join(name).exists()) {
        let active = get_active_variant();
        anyhow::bail!(
            "OCR models not found at {}.\n\n\
             Run 'thesis-scan models download -v {}' to download {} models.",
            model_dir.display(),
            active,
            active
        );
    }

    Ok(model_dir)
}

pub fn read_images(files: &[PathBuf]) -> anyhow::Result<Vec<Vec<u8>>> {
    files
        .iter()
        .map(|path| {
            fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
        })
        .collect()
}

pub fn load_engine(model_dir: &Path, config: ScanConfig) -> anyhow::Result<ScanEngine> {
    debug!("Using models from {}", model_dir.display());
    create_engine_from_dir(model_dir, config)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))
}

pub fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

pub fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output_path) = path {
        fs::write(output_path, output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let entries = result.fields.entries();
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = entries.iter().map(|(name, _)| *name).collect();
    header.push("accuracy");
    wtr.write_record(&header)?;

    let mut row: Vec<String> = entries
        .iter()
        .map(|(_, value)| value.unwrap_or_default().to_string())
        .collect();
    row.push(result.accuracy.to_string());
    wtr.write_record(&row)?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    for (name, value) in result.fields.entries() {
        output.push_str(&format!("{}: {}\n", name, value.unwrap_or("-")));
    }
    output.push_str(&format!("accuracy: {:.2}%", result.accuracy));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_scan_core::ExtractedFields;

    fn keywords_result() -> ExtractionResult {
        ExtractionResult {
            fields: ExtractedFields::Keywords {
                keywords: Some("rivers, lakes".to_string()),
            },
            accuracy: 87.5,
        }
    }

    #[test]
    fn test_csv_quotes_list_values() {
        let csv = format_csv(&keywords_result()).unwrap();
        assert_eq!(csv, "keywords,accuracy\n\"rivers, lakes\",87.5\n");
    }

    #[test]
    fn test_text_marks_missing_fields() {
        let result = ExtractionResult {
            fields: ExtractedFields::TitleAuthors {
                title: Some("A Study of Rivers".to_string()),
                authors: None,
            },
            accuracy: 40.0,
        };

        assert_eq!(
            format_text(&result),
            "title: A Study of Rivers\nauthors: -\naccuracy: 40.00%"
        );
    }

    #[test]
    fn test_expand_inputs_sorts_glob_matches() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page2.png", "page1.png", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let pattern = dir.path().join("page*.png").display().to_string();
        let files = expand_inputs(&[pattern]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["page1.png", "page2.png"]);
    }

    #[test]
    fn test_expand_inputs_rejects_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png").display().to_string();
        assert!(expand_inputs(&[missing]).is_err());

        let pattern = dir.path().join("*.jpg").display().to_string();
        assert!(expand_inputs(&[pattern]).is_err());
    }
}
