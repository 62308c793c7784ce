use num_bigint::BigUint;
use rand::Rng;
use std::num::ParseIntError;

const DEFAULT_RULES_FILE: &str = "interesting rules.txt";
const DEFAULT_CONDITIONS_FILE: &str = "starting condition.txt";
const DEFAULT_GENERATIONS: usize = 299;
/// Random rules are drawn from `0..RANDOM_RULE_LIMIT`
const RANDOM_RULE_LIMIT: u64 = 10_000_000;

pub struct Args {
    matches: getopts::Matches,
}

impl Args {
    fn options() -> getopts::Options {
        let mut opts = getopts::Options::new();
        opts.optflag("", "help", "print this help menu");
        opts.optflag("c", "console", "draw every step in color");
        opts.optflag("", "no-color", "draw steps as digits instead of colors");
        opts.optflag("t", "threads", "enables multi-threading within a step");
        opts.optflag("", "random", "run one random rule below 10000000");
        opts.optflag("", "strict", "abort on the first malformed record");
        opts.optflagmulti("v", "verbose", "log more, repeat for trace output");
        opts.optflag("q", "quiet", "only log errors");
        opts.optopt("r", "rules", "rule number list", "FILE");
        opts.optopt("", "rule", "run a single rule number", "NUMBER");
        opts.optopt("i", "input", "starting condition list", "FILE");
        opts.optopt("n", "condition", "starting condition to run", "INDEX");
        opts.optopt("g", "gens", "number of steps to compute", "COUNT");
        opts.optopt("o", "output", "write final configurations", "FILE");
        opts.optopt("", "stats", "write symbol census csv", "FILE");
        opts
    }

    pub fn new<T: AsRef<str>>(args: &[T]) -> Result<Option<Self>, getopts::Fail> {
        let opts = Self::options();
        let matches = opts.parse(args.iter().map(T::as_ref))?;
        if matches.opt_present("help") {
            println!("{}", opts.usage("usage: elca [options]"));
            Ok(None)
        } else {
            Ok(Some(Self { matches }))
        }
    }
    pub fn from_env() -> Result<Option<Self>, getopts::Fail> {
        let env = std::env::args().collect::<Vec<_>>();
        Self::new(&env[1..])
    }

    pub fn console(&self) -> bool {
        self.matches.opt_present("console") || self.matches.opt_present("no-color")
    }
    pub fn colored(&self) -> bool {
        !self.matches.opt_present("no-color")
    }
    pub fn multithreading(&self) -> bool {
        self.matches.opt_present("threads")
    }
    pub fn strict(&self) -> bool {
        self.matches.opt_present("strict")
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.matches.opt_present("quiet") {
            return log::LevelFilter::Error;
        }
        match self.matches.opt_count("verbose") {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn generations(&self) -> Result<usize, ParseIntError> {
        Ok(self.matches.opt_get("gens")?.unwrap_or(DEFAULT_GENERATIONS))
    }
    pub fn condition(&self) -> Result<usize, ParseIntError> {
        Ok(self.matches.opt_get("condition")?.unwrap_or(0))
    }

    pub fn rule_source(&self) -> RuleSource {
        if self.matches.opt_present("random") {
            RuleSource::Random
        } else if let Some(rule) = self.matches.opt_str("rule") {
            RuleSource::Single(rule)
        } else {
            RuleSource::File(
                self.matches
                    .opt_str("rules")
                    .unwrap_or_else(|| DEFAULT_RULES_FILE.to_owned()),
            )
        }
    }

    pub fn input_file(&self) -> String {
        self.matches
            .opt_str("input")
            .unwrap_or_else(|| DEFAULT_CONDITIONS_FILE.to_owned())
    }
    pub fn output_file(&self) -> Option<String> {
        self.matches.opt_str("output")
    }
    pub fn stats_file(&self) -> Option<String> {
        self.matches.opt_str("stats")
    }
}

/// Where the batch of rule numbers comes from
#[derive(Debug, PartialEq, Eq)]
pub enum RuleSource {
    File(String),
    Single(String),
    Random,
}
impl RuleSource {
    pub fn random_rule<R: Rng>(rng: &mut R) -> BigUint {
        BigUint::from(rng.random_range(0..RANDOM_RULE_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        Args::new(list).unwrap().expect("args without --help")
    }

    #[test]
    fn defaults_match_the_batch_files() {
        let args = args(&[]);

        assert_eq!(args.generations().unwrap(), 299);
        assert_eq!(args.condition().unwrap(), 0);
        assert_eq!(
            args.rule_source(),
            RuleSource::File("interesting rules.txt".to_owned())
        );
        assert_eq!(args.input_file(), "starting condition.txt");
        assert!(!args.console());
        assert_eq!(args.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn single_rule_and_gens_parse() {
        let args = args(&["--rule", "110", "-g", "12", "-n", "2"]);

        assert_eq!(args.rule_source(), RuleSource::Single("110".to_owned()));
        assert_eq!(args.generations().unwrap(), 12);
        assert_eq!(args.condition().unwrap(), 2);
    }

    #[test]
    fn random_takes_priority() {
        let args = args(&["--random", "--rule", "30"]);

        assert_eq!(args.rule_source(), RuleSource::Random);
    }

    #[test]
    fn no_color_implies_console() {
        let args = args(&["--no-color"]);

        assert!(args.console());
        assert!(!args.colored());
    }

    #[test]
    fn verbosity_stacks() {
        assert_eq!(args(&["-v"]).log_level(), log::LevelFilter::Debug);
        assert_eq!(args(&["-vv"]).log_level(), log::LevelFilter::Trace);
        assert_eq!(args(&["-v", "-q"]).log_level(), log::LevelFilter::Error);
    }

    #[test]
    fn bad_gens_is_an_error() {
        assert!(args(&["-g", "many"]).generations().is_err());
    }

    #[test]
    fn random_rule_is_below_limit() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let rule = RuleSource::random_rule(&mut rng);
            assert!(rule < BigUint::from(RANDOM_RULE_LIMIT));
        }
    }
}
