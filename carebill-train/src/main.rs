use std::error::Error;

use carebill_train::{run, PipelineConfig};
use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(err) = run(&PipelineConfig::default()) {
        eprintln!("Error: {}", err);

        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }

        std::process::exit(1);
    }
}
