use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use cpu_time::ProcessTime;

use sbdd_rs::bdd::Bdd;
use sbdd_rs::trace::{self, Trace};

/// Build shared ROBDDs from a circuit trace file.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Trace file (MODULE/INPUT/OUTPUT/STRUCTURE format).
    trace: PathBuf,

    /// Write a DOT rendering of the output BDDs to this file.
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Unique table size (a prime is recommended).
    #[arg(long, default_value_t = 5003, value_name = "INT")]
    unique_size: usize,

    /// Computed table size (a prime is recommended).
    #[arg(long, default_value_t = 5003, value_name = "INT")]
    cache_size: usize,

    /// Enable debug logging of the synthesis.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!(
        "sbdd {} -- shared ROBDD package with complement edges",
        env!("CARGO_PKG_VERSION")
    );

    let text = fs::read_to_string(&cli.trace)?;
    let trace = Trace::parse(&text)?;
    println!("Primary inputs: {}", trace.num_inputs());

    let num_vars = u16::try_from(trace.num_inputs())
        .map_err(|_| eyre!("trace declares {} inputs, too many", trace.num_inputs()))?;

    let start = ProcessTime::now();
    let bdd = Bdd::new(num_vars, cli.unique_size, cli.cache_size);
    let outputs = trace::synthesize(&bdd, &trace)?;
    let elapsed = start.elapsed();

    let node_count: usize = outputs.iter().map(|&(_, root)| bdd.count_nodes(root)).sum();
    println!("Nodes count: {}", node_count);
    println!("Time in seconds: {:.6}", elapsed.as_secs_f64());
    println!("Memory usage: {} KiB", peak_rss_kib());

    if let Some(path) = &cli.dot {
        fs::write(path, bdd.to_dot(&outputs)?)?;
        println!("DOT written to {}", path.display());
    }

    Ok(())
}

/// Peak resident set size of this process, in KiB.
fn peak_rss_kib() -> i64 {
    // SAFETY: getrusage only writes into the struct we hand it.
    unsafe {
        let mut usage: libc::rusage = std::mem::zeroed();
        libc::getrusage(libc::RUSAGE_SELF, &mut usage);
        usage.ru_maxrss as i64
    }
}
