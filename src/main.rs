use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use ndarray::Array1;
use pretty_env_logger;
use romsrs_reader::reader::{CoordinateEcho, DepthEcho, Extraction, FieldValues};
use romsrs_reader::{Query, RomsReader, RomsReaderBuilder};
use std::path::PathBuf;
use std::process::ExitCode;

const VERSION: &'static str = env!("ROMSRS_READER_VERSION");

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
#[command(version = VERSION)]
struct Cli {
    #[clap(subcommand)]
    mode: Modes,
}

#[derive(Subcommand, Debug)]
enum Modes {
    /// Print the grid, time axis and available variables.
    Info(InfoCliOpts),
    /// Extract variables at points, or the block around them, as CSV.
    Query(QueryCliOpts),
    /// Plot the layer-center depths below the given points.
    Profiles(ProfilesCliOpts),
}

#[derive(Args, Debug)]
struct InfoCliOpts {
    dataset_path: PathBuf,
}

#[derive(Args, Debug)]
struct QueryCliOpts {
    dataset_path: PathBuf,
    #[clap(short, long, value_delimiter = ',', num_args = 1.., required = true)]
    variables: Vec<String>,
    #[clap(short, long, value_delimiter = ',', num_args = 1.., allow_hyphen_values = true)]
    x: Vec<f64>,
    #[clap(short, long, value_delimiter = ',', num_args = 1.., allow_hyphen_values = true)]
    y: Vec<f64>,
    #[clap(
        short,
        long,
        value_delimiter = ',',
        num_args = 1..,
        allow_hyphen_values = true,
        help = "Depths in meters, negative below the surface. Omit for the surface layer."
    )]
    z: Vec<f64>,
    #[clap(short, long, help = "Format: %Y-%m-%dT%H:%M:%S. Defaults to the first record.")]
    time: Option<String>,
    #[clap(long, action)]
    block: bool,
    #[clap(long, default_value = "0")]
    buffer: usize,
    #[clap(short, long)]
    output_filepath: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ProfilesCliOpts {
    dataset_path: PathBuf,
    #[clap(short, long, value_delimiter = ',', num_args = 1.., allow_hyphen_values = true)]
    x: Vec<f64>,
    #[clap(short, long, value_delimiter = ',', num_args = 1.., allow_hyphen_values = true)]
    y: Vec<f64>,
    #[clap(long, action)]
    show_plot: bool,
    #[clap(long)]
    save_plot: Option<PathBuf>,
}

fn open_reader(dataset_path: &PathBuf, buffer: usize) -> anyhow::Result<RomsReader> {
    let reader = RomsReaderBuilder::default()
        .filename(dataset_path)
        .buffer(&buffer)
        .build()
        .with_context(|| format!("Failed to open {}", dataset_path.display()))?;
    Ok(reader)
}

fn run_info(opts: &InfoCliOpts) -> anyhow::Result<()> {
    let reader = open_reader(&opts.dataset_path, 0)?;
    print!("{}", reader);
    Ok(())
}

fn run_query(opts: &QueryCliOpts) -> anyhow::Result<()> {
    let mut reader = open_reader(&opts.dataset_path, opts.buffer)?;
    let mut query = Query::new(
        opts.variables.as_slice(),
        Array1::from_vec(opts.x.clone()),
        Array1::from_vec(opts.y.clone()),
    )
    .z(Array1::from_vec(opts.z.clone()))
    .block(opts.block);
    if let Some(time) = &opts.time {
        let time = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S")
            .with_context(|| format!("Could not parse time {}", time))?;
        query = query.time(time);
    }
    let extraction = reader.get_variables(&query)?;
    match &opts.output_filepath {
        Some(path) => write_extraction(csv::Writer::from_path(path)?, &extraction),
        None => write_extraction(csv::Writer::from_writer(std::io::stdout()), &extraction),
    }
}

fn write_extraction<W: std::io::Write>(
    mut writer: csv::Writer<W>,
    extraction: &Extraction,
) -> anyhow::Result<()> {
    let time = extraction.time.format("%Y-%m-%dT%H:%M:%S").to_string();
    writer.write_record(["variable", "time", "layer", "row", "column", "value", "masked"])?;
    for (name, values) in &extraction.variables {
        match values {
            FieldValues::Points(points) => {
                let (xs, ys) = match (&extraction.x, &extraction.y) {
                    (CoordinateEcho::Physical(xs), CoordinateEcho::Physical(ys)) => (xs, ys),
                    _ => bail!("Point extraction must echo physical coordinates"),
                };
                for ((layer, point), value) in points.data.indexed_iter() {
                    writer.write_record([
                        name.clone(),
                        time.clone(),
                        layer.to_string(),
                        ys[point].to_string(),
                        xs[point].to_string(),
                        value.to_string(),
                        points.mask[[layer, point]].to_string(),
                    ])?;
                }
            }
            FieldValues::Block(block) => {
                let (cols, rows) = match (&extraction.x, &extraction.y) {
                    (CoordinateEcho::Indices(cols), CoordinateEcho::Indices(rows)) => (cols, rows),
                    _ => bail!("Block extraction must echo grid indices"),
                };
                for ((layer, i, j), value) in block.indexed_iter() {
                    writer.write_record([
                        name.clone(),
                        time.clone(),
                        layer.to_string(),
                        rows[i].to_string(),
                        cols[j].to_string(),
                        value.to_string(),
                        false.to_string(),
                    ])?;
                }
            }
        }
    }
    if let DepthEcho::Profiles(z) = &extraction.z {
        log::debug!("Selected layer depths:\n{}", z);
    }
    writer.flush()?;
    Ok(())
}

fn run_profiles(opts: &ProfilesCliOpts) -> anyhow::Result<()> {
    let mut reader = open_reader(&opts.dataset_path, 0)?;
    if opts.x.len() != opts.y.len() {
        bail!("Got {} x values but {} y values", opts.x.len(), opts.y.len());
    }
    let profiles = reader.z_profiles(
        &Array1::from_vec(opts.x.clone()),
        &Array1::from_vec(opts.y.clone()),
    )?;
    println!("{}", profiles.z_r());
    if opts.show_plot || opts.save_plot.is_some() {
        let plot = profiles.make_profile_plot()?;
        if let Some(path) = &opts.save_plot {
            plot.write_html(path);
        }
        if opts.show_plot {
            plot.show();
        }
    }
    Ok(())
}

fn entrypoint() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match &cli.mode {
        Modes::Info(opts) => run_info(opts),
        Modes::Query(opts) => run_query(opts),
        Modes::Profiles(opts) => run_profiles(opts),
    }
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
