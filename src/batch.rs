use crate::{
    console::ConsoleRender,
    options::{Args, RuleSource},
    stats::{Recorder, SwitchRecorder},
};
use anyhow::{Context, bail};
use elca::{
    Automaton, ConfigurationList, Observer, RuleList, Symbol,
    enc::{Record, RecordDecoder},
};
use log::{error, info, warn};
use num_bigint::BigUint;
use std::{fmt::Write as _, io};

/// An [`Observer`] that is also told where each rule's run starts and ends
pub trait RunObserver: Observer {
    fn begin_run(&mut self, rule: &BigUint, last_step: usize);
    fn end_run(&mut self) -> io::Result<()>;
}

/// Forwards every step to the renderer and the statistics recorder
pub struct StepSink<W: io::Write> {
    pub console: Option<ConsoleRender<W>>,
    pub stats: SwitchRecorder,
}
impl<W: io::Write> Observer for StepSink<W> {
    fn observe(&mut self, step: usize, cells: &[Symbol]) {
        if let Some(ref mut console) = self.console {
            console.observe(step, cells);
        }
        self.stats.record(step, cells);
    }
}
impl<W: io::Write> RunObserver for StepSink<W> {
    fn begin_run(&mut self, rule: &BigUint, last_step: usize) {
        if let Some(ref mut console) = self.console {
            console.begin(rule, last_step);
        }
        self.stats.begin_rule(rule);
    }
    fn end_run(&mut self) -> io::Result<()> {
        if let Some(ref mut console) = self.console {
            console.finish()?;
        }
        if self.stats.has_report() {
            info!("{}", self.stats.report());
        }
        Ok(())
    }
}

/// What a batch produced
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub completed: usize,
    pub failed: usize,
    /// Every final configuration as a `# rule N` line and a list literal
    pub output: String,
}

pub fn load_rules(args: &Args) -> anyhow::Result<Vec<Record<BigUint>>> {
    let file_name = match args.rule_source() {
        RuleSource::Random => {
            let rule = RuleSource::random_rule(&mut rand::rng());
            info!("random rule: {}", rule);
            return Ok(vec![Record {
                line: 0,
                value: rule,
            }]);
        }
        RuleSource::Single(text) => {
            let rule = RuleList::parse_rule(&text).context("invalid --rule")?;
            return Ok(vec![Record {
                line: 0,
                value: rule,
            }]);
        }
        RuleSource::File(file_name) => file_name,
    };

    let text = std::fs::read_to_string(&file_name)
        .with_context(|| format!("could not read rules from {:?}", file_name))?;
    decode_rules(args, &file_name, &text)
}

/// Decodes a rule list, skipping malformed lines unless `--strict` is set
pub fn decode_rules(args: &Args, source: &str, text: &str) -> anyhow::Result<Vec<Record<BigUint>>> {
    let mut rules = Vec::new();
    for record in RuleList.records(text) {
        match record {
            Ok(record) => rules.push(record),
            Err(err) if args.strict() => {
                return Err(err).with_context(|| format!("malformed rule in {:?}", source));
            }
            Err(err) => warn!("skipping rule in {:?}: {}", source, err),
        }
    }
    Ok(rules)
}

pub fn load_condition(args: &Args) -> anyhow::Result<Vec<Symbol>> {
    let file_name = args.input_file();
    let text = std::fs::read_to_string(&file_name)
        .with_context(|| format!("could not read starting conditions from {:?}", file_name))?;
    select_condition(args, &file_name, &text)
}

/// Picks the `--condition` entry of a starting condition list
pub fn select_condition(args: &Args, source: &str, text: &str) -> anyhow::Result<Vec<Symbol>> {
    let index = args.condition().context("invalid --condition")?;
    let records = ConfigurationList.records(text);
    let count = records.len();
    let Some(record) = records.into_iter().nth(index) else {
        bail!("{:?} has {} starting conditions, no index {}", source, count, index);
    };
    let record = record.with_context(|| format!("malformed starting condition in {:?}", source))?;
    Ok(record.value)
}

/// Runs every rule on `condition`
///
/// A rule that fails is logged and counted, or aborts the batch under `--strict`.
pub fn run_batch<O: RunObserver>(
    args: &Args,
    rules: Vec<Record<BigUint>>,
    condition: &[Symbol],
    observer: &mut O,
) -> anyhow::Result<BatchOutcome> {
    let generations = args.generations().context("invalid --gens")?;
    info!(
        "{} rules, {} cells, {} steps",
        rules.len(),
        condition.len(),
        generations
    );

    let mut outcome = BatchOutcome::default();
    for Record { line, value: rule } in rules {
        observer.begin_run(&rule, generations);
        let mut automaton = Automaton::new(rule.clone()).with_parallel(args.multithreading());
        let result = automaton.run_with(condition, Some(generations), observer);
        observer.end_run().context("could not draw to the terminal")?;

        match result {
            Ok(Some(cells)) => {
                outcome.completed += 1;
                writeln!(outcome.output, "# rule {}", rule)?;
                writeln!(outcome.output, "{}", ConfigurationList::encode(&cells))?;
            }
            Ok(None) => {}
            Err(err) if args.strict() => {
                return Err(err).with_context(|| format!("rule {} (line {})", rule, line));
            }
            Err(err) => {
                outcome.failed += 1;
                error!("rule {} (line {}): {}", rule, line, err);
            }
        }
    }

    if outcome.failed > 0 {
        warn!("{} rules could not be run", outcome.failed);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "30\nbogus\n300\n";

    fn args(list: &[&str]) -> Args {
        Args::new(list).unwrap().expect("args without --help")
    }

    /// Remembers which rules ran and how many steps were seen
    #[derive(Default)]
    struct Tally {
        runs: Vec<String>,
        steps: usize,
        open: bool,
    }
    impl Observer for Tally {
        fn observe(&mut self, _step: usize, _cells: &[Symbol]) {
            assert!(self.open);
            self.steps += 1;
        }
    }
    impl RunObserver for Tally {
        fn begin_run(&mut self, rule: &BigUint, _last_step: usize) {
            self.runs.push(rule.to_string());
            self.open = true;
        }
        fn end_run(&mut self) -> io::Result<()> {
            self.open = false;
            Ok(())
        }
    }

    #[test]
    fn malformed_lines_and_failed_rules_are_skipped() {
        let args = args(&["-g", "3"]);

        let rules = decode_rules(&args, "rules.txt", RULES).unwrap();
        let lines: Vec<_> = rules.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 3]);

        // rule 30 is binary and cannot run a condition holding a 2
        let mut tally = Tally::default();
        let outcome = run_batch(&args, rules, &[0, 1, 2, 0], &mut tally).unwrap();

        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(tally.runs, vec!["30", "300"]);
        assert_eq!(tally.steps, 4);
        assert!(!tally.open);
    }

    #[test]
    fn strict_aborts_on_malformed_line() {
        let args = args(&["--strict"]);

        let err = decode_rules(&args, "rules.txt", RULES).unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("rules.txt"), "{}", message);
        assert!(message.contains("line 2"), "{}", message);
    }

    #[test]
    fn strict_aborts_on_failed_rule() {
        let args = args(&["--strict", "-g", "3"]);
        let rules = decode_rules(&args, "rules.txt", "300\n30\n300\n").unwrap();
        let mut tally = Tally::default();

        let err = run_batch(&args, rules, &[0, 1, 2, 0], &mut tally).unwrap_err();

        assert!(format!("{:#}", err).contains("rule 30 (line 2)"));
        assert_eq!(tally.runs, vec!["300", "30"]);
    }

    #[test]
    fn output_reads_back_as_configurations() {
        let args = args(&["-g", "5"]);
        let rules = decode_rules(&args, "rules.txt", "30\n110\n1000000\n").unwrap();
        let condition = [0, 0, 0, 1, 0, 0, 0];
        let mut sink = StepSink::<Vec<u8>> {
            console: None,
            stats: SwitchRecorder::new(true),
        };

        let outcome = run_batch(&args, rules, &condition, &mut sink).unwrap();

        assert!(outcome.output.starts_with("# rule 30\n["));
        let finals = ConfigurationList.decode(&outcome.output).unwrap();
        let expected: Vec<_> = [30u64, 110, 1_000_000]
            .into_iter()
            .map(|rule| {
                Automaton::from_rule_number(rule)
                    .run(&condition, Some(5))
                    .unwrap()
                    .unwrap()
            })
            .collect();
        assert_eq!(finals, expected);
    }

    #[test]
    fn console_sink_draws_each_run() {
        let args = args(&["-g", "1"]);
        let rules = decode_rules(&args, "rules.txt", "90\n").unwrap();
        let mut sink = StepSink {
            console: Some(ConsoleRender::new(Vec::new(), false)),
            stats: SwitchRecorder::new(false),
        };

        run_batch(&args, rules, &[0, 1, 0], &mut sink).unwrap();

        let console = sink.console.take().unwrap();
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.contains("rule number: 90\n"));
        assert!(text.ends_with("1   101\n    101\n"));
    }

    #[test]
    fn condition_past_the_end_is_an_error() {
        let text = "[0, 1, 0]\n[1, 1, 0]\n";

        let err = select_condition(&args(&["-n", "5"]), "conditions.txt", text).unwrap_err();
        assert!(err.to_string().contains("no index 5"));

        let picked = select_condition(&args(&["-n", "1"]), "conditions.txt", text).unwrap();
        assert_eq!(picked, vec![1, 1, 0]);
    }

    #[test]
    fn malformed_condition_is_an_error() {
        let err = select_condition(&args(&[]), "conditions.txt", "[0, x]\n").unwrap_err();

        assert!(format!("{:#}", err).contains("line 1"));
    }
}
