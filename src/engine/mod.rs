mod index;

pub use self::index::{Alphabet, RuleTable, Symbol};
use crate::error::{Error, InputError, Result};
use num_bigint::BigUint;
use rayon::prelude::*;

/// Lattices smaller than this are always stepped serially
const PARALLEL_THRESHOLD: usize = 4096;

/// Lifecycle of an [`Automaton`] invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Only the rule number is known
    Uninitialized,
    /// Table resolved and initial configuration loaded
    Ready,
    /// Some but not all requested steps have been emitted
    Running,
    /// The final step has been emitted
    Done,
}

/// Plain callback form of an [`Observer`]
pub type StepCallback<'a> = dyn FnMut(usize, &[Symbol]) + 'a;

/// Receives every configuration of a run, in ascending step order
pub trait Observer {
    fn observe(&mut self, step: usize, cells: &[Symbol]);
}
impl<F: FnMut(usize, &[Symbol]) + ?Sized> Observer for F {
    #[inline]
    fn observe(&mut self, step: usize, cells: &[Symbol]) {
        self(step, cells)
    }
}

/// A one-dimensional cellular automaton on a circular lattice
#[derive(Debug)]
pub struct Automaton {
    rule: BigUint,
    table: Option<RuleTable>,
    parallel: bool,

    cells: Vec<Symbol>,
    next: Vec<Symbol>,
    step: usize,
    target: usize,
    state: State,
}

impl Automaton {
    pub fn new(rule: BigUint) -> Self {
        Self {
            rule,
            table: None,
            parallel: false,
            cells: Vec::new(),
            next: Vec::new(),
            step: 0,
            target: 0,
            state: State::Uninitialized,
        }
    }

    #[inline]
    pub fn from_rule_number(rule: u64) -> Self {
        Self::new(BigUint::from(rule))
    }

    /// Computes the cells of large lattices on the rayon thread pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    pub fn rule_number(&self) -> &BigUint {
        &self.rule
    }

    /// The rule table, building and caching it on first use
    pub fn table(&mut self) -> &RuleTable {
        self.table
            .get_or_insert_with(|| RuleTable::build(&self.rule))
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// The configuration at the current step
    #[inline]
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Loads a new initial configuration, discarding any previous run
    ///
    /// Every symbol is checked against the rule's alphabet up front so that no
    /// step is computed for an input that cannot be run to completion.
    pub fn reset(&mut self, initial: &[Symbol], steps: usize) -> Result<()> {
        if initial.is_empty() {
            return Err(InputError::EmptyConfiguration.into());
        }
        let alphabet = self.table().alphabet();
        if let Some((index, &symbol)) = initial
            .iter()
            .enumerate()
            .find(|&(_, &symbol)| !alphabet.contains(symbol))
        {
            return Err(InputError::SymbolOutOfAlphabet {
                index,
                symbol,
                alphabet,
            }
            .into());
        }

        // both buffers are reused between runs of the same length
        self.cells.clear();
        self.cells.extend_from_slice(initial);
        self.next.clear();
        self.next.resize(initial.len(), 0);
        self.step = 0;
        self.target = steps;
        self.state = State::Ready;

        log::debug!(
            "rule {}: {} cells for {} steps",
            self.rule,
            initial.len(),
            steps
        );
        Ok(())
    }

    /// Applies the rule once to every cell
    ///
    /// All next states are computed from the unmodified current configuration
    /// before the two buffers swap roles.
    pub fn next_generation(&mut self) -> Result<()> {
        let table = self
            .table
            .get_or_insert_with(|| RuleTable::build(&self.rule));
        if self.parallel && self.cells.len() >= PARALLEL_THRESHOLD {
            next_cells_parallel(table, &self.cells, &mut self.next)?;
        } else {
            next_cells(table, &self.cells, &mut self.next)?;
        }
        std::mem::swap(&mut self.cells, &mut self.next);
        self.step += 1;

        log::trace!("rule {}: step {}", self.rule, self.step);
        Ok(())
    }

    /// Emits the current configuration, then advances unless it is the final step
    ///
    /// Returns `false` once the final step has been emitted.
    fn emit_then_advance<O: Observer + ?Sized>(&mut self, observer: &mut O) -> Result<bool> {
        match self.state {
            State::Ready | State::Running => {}
            State::Uninitialized | State::Done => return Ok(false),
        }

        observer.observe(self.step, &self.cells);
        if self.step == self.target {
            self.state = State::Done;
            return Ok(false);
        }

        self.state = State::Running;
        self.next_generation()?;
        Ok(true)
    }

    /// Runs `initial` for `steps` generations and returns the final configuration
    ///
    /// Without a step count nothing is computed and [`None`] is returned.
    pub fn run(&mut self, initial: &[Symbol], steps: Option<usize>) -> Result<Option<Vec<Symbol>>> {
        self.run_with(initial, steps, &mut |_: usize, _: &[Symbol]| {})
    }

    /// Same as [`Automaton::run`], but every configuration from step 0 to
    /// `steps` is passed to `observer` before the automaton advances past it
    pub fn run_with<O: Observer + ?Sized>(
        &mut self,
        initial: &[Symbol],
        steps: Option<usize>,
        observer: &mut O,
    ) -> Result<Option<Vec<Symbol>>> {
        let Some(steps) = steps else {
            return Ok(None);
        };

        self.reset(initial, steps)?;
        while self.emit_then_advance(observer)? {}
        Ok(Some(self.cells.clone()))
    }

    /// Lazily yields the configuration of every step from 0 to `steps`
    ///
    /// Each transition is only computed when the following item is requested.
    pub fn generations(&mut self, initial: &[Symbol], steps: usize) -> Result<Generations<'_>> {
        self.reset(initial, steps)?;
        Ok(Generations {
            automaton: self,
            pending: false,
        })
    }
}

/// Computes `next` from `cells` using wraparound neighbors
fn next_cells(table: &RuleTable, cells: &[Symbol], next: &mut [Symbol]) -> Result<()> {
    for (c, out) in next.iter_mut().enumerate() {
        *out = next_cell(table, cells, c)?;
    }
    Ok(())
}

fn next_cells_parallel(table: &RuleTable, cells: &[Symbol], next: &mut [Symbol]) -> Result<()> {
    next.par_iter_mut().enumerate().try_for_each(|(c, out)| {
        *out = next_cell(table, cells, c)?;
        Ok(())
    })
}

#[inline]
fn next_cell(table: &RuleTable, cells: &[Symbol], c: usize) -> Result<Symbol> {
    let n = cells.len();
    let left = cells[(c + n - 1) % n];
    let center = cells[c];
    let right = cells[(c + 1) % n];

    table
        .lookup(left, center, right)
        .ok_or_else(|| Error::InvalidSymbol {
            cell: c,
            key: [left, center, right]
                .iter()
                .map(|symbol| symbol.to_string())
                .collect(),
        })
}

/// One emitted configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub step: usize,
    pub cells: Vec<Symbol>,
}

/// Iterator returned by [`Automaton::generations`]
pub struct Generations<'a> {
    automaton: &'a mut Automaton,
    /// Whether the previously yielded configuration still has to be advanced past
    pending: bool,
}

impl Generations<'_> {
    /// Drains the remaining steps and returns the final configuration
    pub fn finish(mut self) -> Result<Vec<Symbol>> {
        for generation in self.by_ref() {
            generation?;
        }
        Ok(self.automaton.cells.clone())
    }
}

impl Iterator for Generations<'_> {
    type Item = Result<Generation>;

    fn next(&mut self) -> Option<Self::Item> {
        let automaton = &mut *self.automaton;
        if self.pending {
            self.pending = false;
            if let Err(err) = automaton.next_generation() {
                automaton.state = State::Done;
                return Some(Err(err));
            }
        }

        match automaton.state {
            State::Ready | State::Running => {}
            State::Uninitialized | State::Done => return None,
        }
        let generation = Generation {
            step: automaton.step,
            cells: automaton.cells.clone(),
        };
        if automaton.step == automaton.target {
            automaton.state = State::Done;
        } else {
            automaton.state = State::Running;
            self.pending = true;
        }
        Some(Ok(generation))
    }
}

/// Decodes a rule number into its transition table
#[inline]
pub fn build_rule_table(rule: &BigUint) -> RuleTable {
    RuleTable::build(rule)
}

/// Runs a one-off automaton, optionally reporting every step to `observer`
pub fn run(
    rule: &BigUint,
    initial: &[Symbol],
    steps: Option<usize>,
    observer: Option<&mut StepCallback<'_>>,
) -> Result<Option<Vec<Symbol>>> {
    let mut automaton = Automaton::new(rule.clone());
    match observer {
        Some(observer) => automaton.run_with(initial, steps, observer),
        None => automaton.run(initial, steps),
    }
}
