use num_bigint::BigUint;
use std::fmt;

/// A single cell value
pub type Symbol = u8;

/// Every neighborhood is three cells wide
const WIDTH: usize = 3;
/// The number of neighborhoods for the largest supported alphabet
const MAX_NEIGHBORHOODS: usize = 27;
/// Rule numbers above this select the ternary alphabet
const MAX_BINARY_RULE: u32 = 255;

/// The set of symbols a rule operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Binary,
    Ternary,
}
impl Alphabet {
    /// Selects the alphabet implied by a rule number
    pub fn for_rule(rule: &BigUint) -> Self {
        if *rule <= BigUint::from(MAX_BINARY_RULE) {
            Self::Binary
        } else {
            Self::Ternary
        }
    }

    #[inline]
    pub const fn base(self) -> u8 {
        match self {
            Self::Binary => 2,
            Self::Ternary => 3,
        }
    }

    /// The number of distinct neighborhoods, `base^3`
    #[inline]
    pub const fn neighborhoods(self) -> usize {
        let base = self.base() as usize;
        base * base * base
    }

    #[inline]
    pub const fn contains(self, symbol: Symbol) -> bool {
        symbol < self.base()
    }

    /// Packs a neighborhood into its numeric value, left being the most significant digit
    ///
    /// Returns [`None`] if any of the symbols is outside this alphabet.
    #[inline]
    pub fn index(self, left: Symbol, center: Symbol, right: Symbol) -> Option<usize> {
        if !(self.contains(left) && self.contains(center) && self.contains(right)) {
            return None;
        }
        let base = self.base() as usize;
        Some((left as usize * base + center as usize) * base + right as usize)
    }

    /// Formats a neighborhood value as a zero-padded digit string
    pub fn key(self, index: usize) -> String {
        let base = self.base() as usize;
        (0..WIDTH)
            .rev()
            .map(|place| {
                let digit = (index / base.pow(place as u32)) % base;
                char::from(b'0' + digit as u8)
            })
            .collect()
    }
}
impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Ternary => "ternary",
        })
    }
}

/// Writes `value` in `base` as exactly `width` digits, most significant first
///
/// Shorter values are zero-padded on the left. Longer values keep only their
/// low-order `width` digits.
fn padded_digits(value: &BigUint, base: u8, width: usize) -> Vec<u8> {
    // little-endian, so truncating keeps the low-order digits
    let mut digits = value.to_radix_le(base as u32);
    digits.resize(width, 0);
    digits.reverse();
    digits
}

/// The complete local transition table of a rule
///
/// Maps every neighborhood of the rule's alphabet to the next state of the
/// center cell. Built once from a rule number and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleTable {
    alphabet: Alphabet,
    /// Indexed by neighborhood value, only the first `alphabet.neighborhoods()` are meaningful
    outputs: [Symbol; MAX_NEIGHBORHOODS],
}

impl RuleTable {
    /// Decodes a rule number into its transition table
    ///
    /// The rule number is written in the alphabet's base and padded to one
    /// digit per neighborhood. Neighborhoods are enumerated from the highest
    /// value down to zero and the i-th neighborhood takes the i-th digit, so
    /// `111` receives the most significant bit of a binary rule and `000` the
    /// least significant one.
    pub fn build(rule: &BigUint) -> Self {
        let alphabet = Alphabet::for_rule(rule);
        let count = alphabet.neighborhoods();
        let digits = padded_digits(rule, alphabet.base(), count);

        let mut outputs = [0; MAX_NEIGHBORHOODS];
        let descending = (0..count).rev();
        for (neighborhood, &digit) in descending.zip(digits.iter()) {
            outputs[neighborhood] = digit;
        }

        log::debug!("built {} rule table for rule {}", alphabet, rule);
        Self { alphabet, outputs }
    }

    #[inline]
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Number of entries, 8 for binary rules and 27 for ternary rules
    #[inline]
    pub fn len(&self) -> usize {
        self.alphabet.neighborhoods()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next state of a center cell given its neighborhood
    #[inline]
    pub fn lookup(&self, left: Symbol, center: Symbol, right: Symbol) -> Option<Symbol> {
        self.alphabet
            .index(left, center, right)
            .map(|index| self.outputs[index])
    }

    /// Looks up a neighborhood by its digit string, e.g. `"110"`
    pub fn get(&self, key: &str) -> Option<Symbol> {
        let &[left, center, right] = key.as_bytes() else {
            return None;
        };
        let digit = |c: u8| c.checked_sub(b'0');
        self.lookup(digit(left)?, digit(center)?, digit(right)?)
    }

    /// Iterates all `(neighborhood, next state)` pairs, highest neighborhood first
    pub fn entries(&self) -> impl Iterator<Item = (String, Symbol)> + '_ {
        (0..self.len())
            .rev()
            .map(|index| (self.alphabet.key(index), self.outputs[index]))
    }
}

impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, symbol)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", key, symbol)?;
        }
        Ok(())
    }
}
