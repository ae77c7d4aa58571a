use clap::{Args as ClapArgs, Parser, Subcommand};
use hiclens::graph::ContactGraph;
use hiclens::render::{self, Pipeline};
use hiclens::serve::{self, Defaults};
use hiclens::threshold::threshold_matrix;
use hiclens::{Config, Dataset, Percentile, ViewMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hiclens")]
#[command(author, version, about = "Threshold Hi-C contact matrices into interactive circular graphs")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON config file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(ClapArgs, Debug, Default)]
struct DataArgs {
    /// Contact matrix (.npy, .csv or .tsv)
    #[arg(short, long)]
    matrix: Option<PathBuf>,

    /// Feature table with chromosome,start,end,total_genes,read_count columns
    #[arg(short, long)]
    features: Option<PathBuf>,

    /// Chromosome the feature table is filtered to
    #[arg(long)]
    chromosome: Option<String>,

    /// Window start (inclusive)
    #[arg(long)]
    start: Option<u64>,

    /// Window end (inclusive)
    #[arg(long)]
    end: Option<u64>,
}

#[derive(ClapArgs, Debug, Default)]
struct ViewArgs {
    /// Percentile threshold: 70, 75, 80, 85, 90 or 95 (default: 90)
    #[arg(short, long)]
    percentile: Option<Percentile>,

    /// Node colouring: gene_count or read_count (default: gene_count)
    #[arg(long)]
    view: Option<ViewMode>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the graph to an HTML or JSON file
    Render {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Output file (.html or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the rendered file when done
        #[arg(long)]
        open: bool,
    },

    /// Start the interactive dashboard
    Serve {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Port to listen on
        #[arg(long, default_value = "8501")]
        port: u16,

        /// Don't open the browser
        #[arg(long)]
        no_open: bool,
    },

    /// Print cutoff, edge and isolated-node counts for every slider value
    Stats {
        #[command(flatten)]
        data: DataArgs,
    },
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let base = match args.config {
        Some(ref path) => match Config::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = run(args.command, base) {
        eprintln!("\x1b[31mError:\x1b[0m {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, base: Config) -> hiclens::Result<()> {
    match command {
        Command::Render { data, view, output, open } => {
            let mut config = apply_overrides(base, &data, &view);
            if let Some(output) = output {
                config.output = output;
            }

            let dataset = load(&config)?;
            let rendered = render::render(&dataset, config.percentile, config.view, &config.palette);
            render::generate(&config.output, &rendered)?;

            eprintln!(
                "{} nodes ({} isolated), {} edges at p{} (cutoff {:.3})",
                rendered.summary.nodes,
                rendered.summary.isolated,
                rendered.summary.edges,
                rendered.percentile,
                rendered.summary.cutoff
            );
            eprintln!("\x1b[32mSaved: {}\x1b[0m", config.output.display());

            if open {
                if let Err(e) = open::that(&config.output) {
                    eprintln!("Failed to open {}: {}", config.output.display(), e);
                }
            }
            Ok(())
        }

        Command::Serve { data, view, port, no_open } => {
            let config = apply_overrides(base, &data, &view);
            let dataset = load(&config)?;
            let pipeline = Pipeline::new(dataset, config.palette.clone());
            let defaults = Defaults {
                percentile: config.percentile,
                view: config.view,
            };
            serve::start(port, pipeline, defaults, !no_open)
        }

        Command::Stats { data } => {
            let config = apply_overrides(base, &data, &ViewArgs::default());
            let dataset = load(&config)?;

            println!("{:<12} {:>14} {:>10} {:>10}", "PERCENTILE", "CUTOFF", "EDGES", "ISOLATED");
            println!("{}", "-".repeat(49));
            for p in Percentile::all() {
                let t = threshold_matrix(dataset.matrix().values(), p);
                let graph = ContactGraph::from_matrix(&t.matrix);
                println!(
                    "{:<12} {:>14.4} {:>10} {:>10}",
                    format!("p{}", p),
                    t.cutoff,
                    graph.edge_count(),
                    graph.isolated_count()
                );
            }
            Ok(())
        }
    }
}

fn apply_overrides(mut config: Config, data: &DataArgs, view: &ViewArgs) -> Config {
    if let Some(ref m) = data.matrix {
        config.matrix = m.clone();
    }
    if let Some(ref f) = data.features {
        config.features = f.clone();
    }
    if let Some(ref c) = data.chromosome {
        config.region.chromosome = c.clone();
    }
    if let Some(s) = data.start {
        config.region.start = s;
    }
    if let Some(e) = data.end {
        config.region.end = e;
    }
    if let Some(p) = view.percentile {
        config.percentile = p;
    }
    if let Some(v) = view.view {
        config.view = v;
    }
    config
}

fn load(config: &Config) -> hiclens::Result<Dataset> {
    log::info!(
        "Loading {} and {} (region {})",
        config.matrix.display(),
        config.features.display(),
        config.region
    );
    Dataset::load(&config.matrix, &config.features, &config.region)
}
