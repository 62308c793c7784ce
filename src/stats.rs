use elca::Symbol;
use std::time::Instant;

pub trait Recorder {
    type Str: AsRef<str>;

    fn record(&mut self, step: usize, cells: &[Symbol]);

    fn has_report(&self) -> bool;
    fn report(&mut self) -> Self::Str;
}

/// Number of cells holding 0, 1 and 2
fn census(cells: &[Symbol]) -> [usize; 3] {
    let mut counts = [0; 3];
    for &symbol in cells {
        if let Some(count) = counts.get_mut(symbol as usize) {
            *count += 1;
        }
    }
    counts
}

pub struct SimpleRecord {
    steps: usize,
    steps_in_report: usize,
    last_counts: [usize; 3],
    last_report: Instant,
}
impl SimpleRecord {
    pub fn new() -> Self {
        Self {
            steps: 0,
            steps_in_report: 0,
            last_counts: [0; 3],
            last_report: Instant::now(),
        }
    }
}
impl Recorder for SimpleRecord {
    type Str = String;

    fn record(&mut self, _step: usize, cells: &[Symbol]) {
        self.steps += 1;
        self.steps_in_report += 1;
        self.last_counts = census(cells);
    }

    fn has_report(&self) -> bool {
        self.last_report.elapsed().as_millis() >= 500
    }
    fn report(&mut self) -> Self::Str {
        let steps_per_sec = self.steps_in_report as f64 / self.last_report.elapsed().as_secs_f64();
        // reset stats for next report
        self.last_report = Instant::now();
        self.steps_in_report = 0;

        let [zeros, ones, twos] = self.last_counts;
        format!(
            "{:.02}step/s steps:{}, cells:{}/{}/{}",
            steps_per_sec, self.steps, zeros, ones, twos
        )
    }
}

/// Keeps the symbol census of every recorded step for CSV export
pub struct CensusRecord {
    inner: SimpleRecord,
    rule: String,
    data: Vec<(String, usize, [usize; 3])>,
}
impl CensusRecord {
    pub fn new() -> Self {
        Self {
            inner: SimpleRecord::new(),
            rule: String::new(),
            data: Vec::new(),
        }
    }

    /// Labels the following records with `rule`
    pub fn begin_rule<T: ToString>(&mut self, rule: T) {
        self.rule = rule.to_string();
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        use std::{
            fs,
            io::{self, Write},
        };

        let file = fs::File::create(path)?;
        let mut file = io::BufWriter::new(file);
        self.write_csv(&mut file)?;
        file.flush()
    }

    fn write_csv<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(b"rule,step,zeros,ones,twos\n")?;
        for (rule, step, [zeros, ones, twos]) in &self.data {
            writeln!(out, "{},{},{},{},{}", rule, step, zeros, ones, twos)?;
        }
        Ok(())
    }
}
impl Recorder for CensusRecord {
    type Str = <SimpleRecord as Recorder>::Str;

    fn record(&mut self, step: usize, cells: &[Symbol]) {
        self.data.push((self.rule.clone(), step, census(cells)));
        self.inner.record(step, cells);
    }

    fn has_report(&self) -> bool {
        self.inner.has_report()
    }
    fn report(&mut self) -> Self::Str {
        self.inner.report()
    }
}

pub enum SwitchRecorder {
    Census(CensusRecord),
    Simple(SimpleRecord),
}
impl SwitchRecorder {
    pub fn new(census: bool) -> Self {
        if census {
            Self::Census(CensusRecord::new())
        } else {
            Self::Simple(SimpleRecord::new())
        }
    }
    pub fn begin_rule<T: ToString>(&mut self, rule: T) {
        if let Self::Census(r) = self {
            r.begin_rule(rule);
        }
    }
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        match self {
            Self::Census(r) => r.save(path),
            Self::Simple(_) => Err(std::io::Error::other(
                "cannot save statistics without a census recorder",
            )),
        }
    }
}
impl Recorder for SwitchRecorder {
    type Str = String;

    fn record(&mut self, step: usize, cells: &[Symbol]) {
        match self {
            Self::Census(r) => r.record(step, cells),
            Self::Simple(r) => r.record(step, cells),
        }
    }
    fn has_report(&self) -> bool {
        match self {
            Self::Census(r) => r.has_report(),
            Self::Simple(r) => r.has_report(),
        }
    }
    fn report(&mut self) -> Self::Str {
        match self {
            Self::Census(r) => r.report(),
            Self::Simple(r) => r.report(),
        }
    }
}
