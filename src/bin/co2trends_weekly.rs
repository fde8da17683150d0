use sensor_trends::{cli, Variant};
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = cli::Opt::from_args();
    cli::run(Variant::Co2TrendsWeekly, &opt)?;
    Ok(())
}
