//! pdfsnap – command-line scene → PDF exporter.
//!
//! Usage:
//!   pdfsnap [output-name] [--sample report|ledger|dashboard] [--landscape] [--preview] [--plan plan.json]
//!
//! Renders one of the built-in sample scenes and exports it as
//! `<output-name>.pdf` (default `document.pdf`).

use std::{env, fs, process};

use pdf_snap::config::{ExportConfig, Orientation};
use pdf_snap::document::Document;
use pdf_snap::exporter::DefaultExporter;
use pdf_snap::samples;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut output: Option<String> = None;
    let mut sample_name = "report".to_string();
    let mut landscape = false;
    let mut preview = false;
    let mut plan_path: Option<String> = None;

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--preview" | "-p" => preview = true,
            "--sample" | "-s" => match iter.next() {
                Some(v) => sample_name = v.clone(),
                None => {
                    eprintln!("--sample requires a scene name");
                    process::exit(1);
                }
            },
            "--plan" => match iter.next() {
                Some(v) => plan_path = Some(v.clone()),
                None => {
                    eprintln!("--plan requires a file path");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            name => {
                if output.is_some() {
                    eprintln!("Unexpected argument: {name}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                output = Some(name.to_string());
            }
        }
    }

    let scene = match samples::sample(&sample_name) {
        Some(s) => s,
        None => {
            eprintln!(
                "Unknown sample '{sample_name}' (available: {})",
                samples::SAMPLE_NAMES.join(", ")
            );
            process::exit(1);
        }
    };

    let output = output.unwrap_or_else(|| "document".to_string());
    // Save always appends the extension; accept a name that carries it.
    let output = output
        .strip_suffix(".pdf")
        .unwrap_or(output.as_str())
        .to_string();

    let mut config = ExportConfig::with_file_name(&output);
    if landscape {
        config.orientation = Orientation::Landscape;
    }

    let exporter = DefaultExporter::with_default_stack(scene, config);

    if preview {
        match exporter.preview().await {
            Ok(()) => eprintln!("Preview flow finished for sample '{sample_name}'"),
            Err(e) => {
                eprintln!("Error previewing PDF: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Some(plan_path) = plan_path {
        let (doc, plan) = match exporter.generate_with_plan().await {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("Error generating PDF: {e}");
                process::exit(1);
            }
        };
        if let Err(e) = doc.save(&output).await {
            eprintln!("Error saving PDF: {e}");
            process::exit(1);
        }
        let json = match plan.to_json() {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Error serialising plan: {e}");
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(&plan_path, json) {
            eprintln!("Error writing '{plan_path}': {e}");
            process::exit(1);
        }
        let pages = plan.page_count;
        eprintln!(
            "Wrote '{output}.pdf' ({pages} page{}) and plan '{plan_path}'",
            if pages == 1 { "" } else { "s" }
        );
        return;
    }

    match exporter.download(None).await {
        Ok(()) => eprintln!("Wrote '{output}.pdf'"),
        Err(e) => {
            eprintln!("Error exporting PDF: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("pdfsnap – scene to PDF exporter (pdf-snap)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} [output-name] [--sample NAME] [--landscape] [--preview] [--plan plan.json]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [output-name]  Output file name without extension (default: document)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --sample, -s   Scene to export: report, ledger, dashboard (default: report)");
    eprintln!("  --landscape    Use landscape page orientation");
    eprintln!("  --preview, -p  Run the hidden-frame print flow instead of saving");
    eprintln!("  --plan         Also write the page-slicing plan as JSON");
    eprintln!("  --help         Print this message");
}
