//! Record command - assemble a full thesis record from grouped pages.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use thesis_scan_core::{RecordPages, ThesisRecord};

use super::extract::{
    EngineArgs, OutputFormat, engine_config, expand_inputs, load_engine, read_images,
    resolve_model_dir, spinner, write_output,
};

/// Arguments for the record command.
#[derive(Args)]
pub struct RecordArgs {
    /// Title page images or globs
    #[arg(long, num_args = 1..)]
    title_pages: Vec<String>,

    /// Approval sheet images naming department and date
    #[arg(long, num_args = 1..)]
    program_pages: Vec<String>,

    /// Abstract page images
    #[arg(long, num_args = 1..)]
    abstract_pages: Vec<String>,

    /// Keyword page images
    #[arg(long, num_args = 1..)]
    keywords_pages: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    engine: EngineArgs,
}

pub async fn run(args: RecordArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let groups = [
        &args.title_pages,
        &args.program_pages,
        &args.abstract_pages,
        &args.keywords_pages,
    ];
    if groups.iter().all(|group| group.is_empty()) {
        anyhow::bail!(
            "No pages given. Use --title-pages, --program-pages, --abstract-pages or --keywords-pages."
        );
    }

    let config = engine_config(&args.engine, config_path)?;
    let pages = RecordPages {
        title_authors: load_group(&args.title_pages)?,
        program_date: load_group(&args.program_pages)?,
        abstract_text: load_group(&args.abstract_pages)?,
        keywords: load_group(&args.keywords_pages)?,
    };
    let model_dir = resolve_model_dir(args.engine.model_dir.as_deref(), &config)?;

    let pb = spinner();
    pb.set_message("Loading OCR models...");
    let engine = load_engine(&model_dir, config)?;

    pb.set_message("Scanning record...");
    let record = tokio::task::spawn_blocking(move || engine.scan_record(&pages)).await??;
    pb.finish_and_clear();

    info!("Record assembled with accuracy {:.2}", record.accuracy);

    let missing = record.missing_fields();
    if !missing.is_empty() {
        eprintln!(
            "{} Missing required fields: {}",
            style("⚠").yellow(),
            missing.join(", ")
        );
    }

    let output = format_record(&record, args.format)?;
    write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn load_group(inputs: &[String]) -> anyhow::Result<Vec<Vec<u8>>> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    read_images(&expand_inputs(inputs)?)
}

fn format_record(record: &ThesisRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn record_fields(record: &ThesisRecord) -> [(&'static str, Option<String>); 7] {
    [
        ("title", record.title.clone()),
        ("authors", record.authors.clone()),
        ("program_course", record.program_course.clone()),
        ("date_published", record.date_published.clone()),
        (
            "date_published_iso",
            record.date_published_iso.map(|d| d.to_string()),
        ),
        ("abstract", record.abstract_text.clone()),
        ("keywords", record.keywords.clone()),
    ]
}

fn format_csv(record: &ThesisRecord) -> anyhow::Result<String> {
    let fields = record_fields(record);
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    header.push("accuracy");
    wtr.write_record(&header)?;

    let mut row: Vec<String> = fields
        .into_iter()
        .map(|(_, value)| value.unwrap_or_default())
        .collect();
    row.push(record.accuracy.to_string());
    wtr.write_record(&row)?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(record: &ThesisRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Title:    {}\n",
        record.title.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Authors:  {}\n",
        record.authors.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Program:  {}\n",
        record.program_course.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Date:     {}",
        record.date_published.as_deref().unwrap_or("-")
    ));
    if let Some(date) = record.date_published_iso {
        output.push_str(&format!(" ({})", date));
    }
    output.push_str("\n\n");

    if let Some(abstract_text) = &record.abstract_text {
        output.push_str("Abstract:\n");
        output.push_str(&format!("  {}\n\n", abstract_text));
    }
    if let Some(keywords) = &record.keywords {
        output.push_str(&format!("Keywords: {}\n\n", keywords));
    }

    output.push_str(&format!("Accuracy: {:.2}%", record.accuracy));

    output
}
