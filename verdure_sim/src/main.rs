use clap::Parser;
use std::process::ExitCode;
use verdure_sim::{simulate, Args};

fn random_seed() -> Option<u64> {
    let mut bytes = [0u8; 8];
    match getrandom::fill(&mut bytes) {
        Ok(()) => Some(u64::from_le_bytes(bytes)),
        Err(e) => {
            log::warn!("No system entropy ({}), using the default seed", e);
            None
        }
    }
}

fn main() -> ExitCode {
    colog::init();
    let args = Args::parse();
    let options = args.sim_options();
    let mut config = options.mode.config();
    if let Some(seed) = args.seed.or_else(random_seed) {
        config.seed = seed;
    }
    match simulate(&config, &options) {
        Ok(report) => {
            println!("{}", report.thumbnail);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
