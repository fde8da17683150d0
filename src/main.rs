use sensor_trends::{cli, Variant};
use structopt::StructOpt;
use strum::IntoEnumIterator;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sensor-trends",
    about = "Indoor air quality and thermal comfort trends from building sensor readings"
)]
struct Cli {
    #[structopt(flatten)]
    opt: cli::Opt,
    /// List the analyses and exit
    #[structopt(long)]
    list: bool,
    /// Analyses to run, all of them if none is given
    variants: Vec<Variant>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::from_args();

    if args.list {
        for variant in Variant::iter() {
            println!("{:<22}{}", variant.to_string(), variant.title());
        }
        return Ok(());
    }

    let variants = if args.variants.is_empty() {
        Variant::iter().collect()
    } else {
        args.variants
    };
    let results = cli::run_all(&variants, &args.opt)?;
    let n_file: usize = results.iter().map(|(_, reports)| reports.len()).sum();
    println!("\n{} analyses completed, {} files written", results.len(), n_file);

    Ok(())
}
