//! atscore CLI - ATS resume scoring tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use atscore::llm::{AtsReport, AtsRubric, EvaluationStep, GeminiClient, LlmConfig, ResumeEvaluator};
use atscore::{FormatAnalyzer, FormatReport, JsonFormat};

#[derive(Parser)]
#[command(name = "atscore")]
#[command(version)]
#[command(about = "Score resume PDFs against ATS formatting rules", long_about = None)]
struct Cli {
    /// Input PDF file (runs the format analysis)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the format analysis and print the report
    Format {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Compact JSON (implies --json)
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the extracted resume text
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Full ATS score: format analysis plus model grading
    Score {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Generative Language API key
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Model name
        #[arg(long, env = "ATSCORE_MODEL", default_value = atscore::llm::DEFAULT_MODEL)]
        model: String,

        /// API base URL
        #[arg(long, env = "ATSCORE_ENDPOINT")]
        endpoint: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Format {
            input,
            json,
            compact,
            output,
        }) => cmd_format(&input, json || compact, compact, output.as_deref()),
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref()),
        Some(Commands::Score {
            input,
            api_key,
            model,
            endpoint,
            json,
        }) => {
            let mut config = LlmConfig::new(api_key).with_model(model);
            if let Some(endpoint) = endpoint {
                config = config.with_endpoint(endpoint);
            }
            cmd_score(&input, config, json)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_format(&input, false, false, None)
            } else {
                println!("{}", "Usage: atscore <FILE>".yellow());
                println!("       atscore --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_format(
    input: &Path,
    json: bool,
    compact: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = FormatAnalyzer::new().analyze(input)?;

    if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        let json = atscore::render::to_json(&report, format)?;
        return write_or_print(output, &json);
    }

    if output.is_some() {
        return write_or_print(output, &atscore::render::to_text(&report));
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &FormatReport) {
    println!("{}", "Format Analysis".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = atscore::render::to_text(report);
    let (metrics, _) = text.split_once("\nScore Breakdown").unwrap_or((text.as_str(), ""));
    for line in metrics.lines().filter(|l| !l.is_empty()) {
        match line.split_once(": ") {
            Some((key, value)) => println!("{}: {}", key.bold(), value),
            None => println!("{}", line),
        }
    }

    println!();
    println!("{}", "Score Breakdown".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for sub in report.score_breakdown.iter() {
        let points = format!("{}/{}", sub.points, sub.max);
        let points = if sub.points == sub.max {
            points.green()
        } else if sub.points * 2 >= sub.max {
            points.yellow()
        } else {
            points.red()
        };
        println!("{}: {}", sub.category.label().bold(), points);
    }

    println!();
    println!(
        "{} {} / 100",
        "Final Resume Score:".bold(),
        report.final_resume_score.to_string().cyan().bold()
    );
}

fn cmd_text(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = atscore::extract_text(input)?;
    write_or_print(output, &text)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn cmd_score(
    input: &Path,
    config: LlmConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let evaluator = ResumeEvaluator::new(GeminiClient::new(config)?, AtsRubric::new());

    let pb = spinner(EvaluationStep::ExtractText.message());
    let result = evaluator.evaluate_with_progress(input, &FormatAnalyzer::new(), |step| {
        pb.set_message(step.message())
    });
    pb.finish_and_clear();
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let AtsReport {
        parsed_resume,
        format,
        evaluation,
    } = report;

    println!("{}", "Parsed Resume".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", serde_json::to_string_pretty(parsed_resume.as_value())?);
    println!();

    print_report(&format);
    println!();

    println!("{}", "ATS Evaluation".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let s = &evaluation.scores;
    for (name, value) in [
        ("Skill Alignment", s.skill_alignment),
        ("Experience Relevance", s.experience_relevance),
        ("Internship Quality", s.internship_quality),
        ("Soft Skills", s.soft_skills),
        ("Impactful Contributions", s.impactful_contributions),
        ("Miscellaneous", s.miscellaneous),
        ("Format", s.format),
    ] {
        println!("{}: {}", name.bold(), value);
    }
    if !evaluation.evaluation.is_empty() {
        println!();
        println!("{}", evaluation.evaluation);
    }

    println!();
    println!(
        "{} {}/100 {}",
        "ATS Score:".bold(),
        evaluation.ats_score().to_string().green().bold(),
        format!("(recomputed: {})", evaluation.computed_total).dimmed()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "atscore".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("ATS resume scoring tool");
    println!();
    println!("License: MIT");
}
