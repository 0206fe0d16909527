use clap::Parser;

use stromme::args::Cli;
use stromme::constants::EXIT_FAILURE;
use stromme::logger::Log;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = stromme::commands::dispatch(cli) {
        Log::log_error(&format!("{e:#}"));
        std::process::exit(EXIT_FAILURE);
    }
}
