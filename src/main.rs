use clap::{Args, Parser};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;
use trafo::input::{CoolingType, PolicyOverrides};
use trafo::output::FileOutput;
use trafo::{format_load_table, run_project, ProjectFlags, SizingOutcome};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct TrafoArgs {
    input_file: String,
    #[command(flatten)]
    policy: PolicyArgs,
    #[clap(
        long,
        default_value_t = false,
        help = "Only write the sizing summary, not the per-load table"
    )]
    summary_only: bool,
    #[clap(
        long,
        default_value_t = false,
        help = "Also write the complete report as JSON"
    )]
    json: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

#[derive(Args, Clone, Copy, Default, Debug)]
struct PolicyArgs {
    #[arg(long, help = "Override the diversification factor given in the input file")]
    diversification_factor: Option<f64>,
    #[arg(
        long,
        help = "Override the reserve margin given in the input file, as a fraction (0.2 for 20%)"
    )]
    reserve_margin: Option<f64>,
    #[arg(long, value_enum, help = "Override the cooling type given in the input file")]
    cooling_type: Option<CoolingType>,
}

fn main() -> anyhow::Result<()> {
    let args = TrafoArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::TRACE);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };

    let output_path = PathBuf::from(format!("{input_file_stem}__results"));
    fs::create_dir_all(&output_path)?;
    let input_file_name = Path::new(input_file_stem)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or(input_file_stem);
    let file_output = FileOutput::new(output_path, format!("{input_file_name}__{{}}.{{}}"));

    let report = run_project(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        &args.policy.into(),
        &(&args).into(),
    )?;

    println!("{}", format_load_table(&report));
    println!();
    match &report.sizing {
        SizingOutcome::Selected(sizing) => {
            println!(
                "Selected transformer: {} kVA ({}, efficiency {:.2}%)",
                sizing.selected_capacity_kva, sizing.cooling_type, sizing.efficiency_percent
            );
            println!(
                "Final reserve: {:.2} kVA ({:.2}%), loading {:.2}%",
                sizing.final_reserve_kva, sizing.final_reserve_percent, sizing.loading_percent
            );
        }
        SizingOutcome::NoLoad => println!("No load to size a transformer for"),
    }

    debug!("JSON report: {}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

impl From<PolicyArgs> for PolicyOverrides {
    fn from(args: PolicyArgs) -> Self {
        Self {
            diversification_factor: args.diversification_factor,
            reserve_margin: args.reserve_margin,
            cooling_type: args.cooling_type,
        }
    }
}

impl From<&TrafoArgs> for ProjectFlags {
    fn from(args: &TrafoArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if !args.summary_only {
            flags.insert(ProjectFlags::DETAILED_LOAD_OUTPUT);
        }
        if args.json {
            flags.insert(ProjectFlags::JSON_REPORT);
        }

        flags
    }
}
