mod app;
mod args;
mod effects;
mod history;
mod logging;
mod render;

use clap::Parser;

use args::{Command, PanelArgs};

fn main() {
    let args = PanelArgs::parse();
    logging::initialize(args.log);

    let code = match args.command {
        Command::Run(run) => app::run_job(&args.base_url, run),
        Command::Health => app::check_health(&args.base_url),
        Command::Recommend(recommend) => app::recommend(&args.base_url, recommend),
    };
    std::process::exit(code);
}
