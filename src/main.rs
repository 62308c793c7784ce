use anyhow::Context;
use std::io;

mod batch;
mod console;
mod options;
mod stats;

fn main() -> anyhow::Result<()> {
    let Some(args) = options::Args::from_env().context("invalid arguments")? else {
        return Ok(());
    };
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level())
        .init()
        .context("could not install logger")?;

    let rules = batch::load_rules(&args)?;
    let condition = batch::load_condition(&args)?;

    let mut sink = batch::StepSink {
        console: args
            .console()
            .then(|| console::ConsoleRender::new(io::stdout(), args.colored())),
        stats: stats::SwitchRecorder::new(args.stats_file().is_some()),
    };
    let outcome = batch::run_batch(&args, rules, &condition, &mut sink)?;
    log::info!("{} rules completed", outcome.completed);

    if let Some(file_name) = args.output_file() {
        std::fs::write(&file_name, outcome.output)
            .with_context(|| format!("could not write results to {:?}", file_name))?;
    }
    if let Some(file_name) = args.stats_file() {
        sink.stats
            .save(&file_name)
            .with_context(|| format!("could not write statistics to {:?}", file_name))?;
    }

    Ok(())
}
