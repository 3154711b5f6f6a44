//! Sampling façade over a single seeded stream.
//!
//! Dice, ranges and weighted picks all draw from the same stream in call
//! order. Named phases branch off memoized child streams so a phase can
//! consume any amount of entropy without shifting its siblings.

use std::collections::BTreeMap;

use crate::seed::SeedManager;
use crate::stream::SeededStream;

#[derive(Clone, Debug)]
pub struct GenerationContext {
    stream: SeededStream,
    phases: BTreeMap<String, SeededStream>,
}

impl GenerationContext {
    pub fn new(stream: SeededStream) -> Self {
        Self { stream, phases: BTreeMap::new() }
    }

    pub fn from_seed(seed: i64) -> Self {
        Self::new(SeededStream::new(seed))
    }

    pub fn seed(&self) -> i64 {
        self.stream.seed()
    }

    /// One die in `1..=sides`; zero when `sides <= 0`.
    pub fn roll_dice(&mut self, sides: i32) -> i32 {
        if sides <= 0 {
            return 0;
        }
        self.stream.int_range(1, i64::from(sides)) as i32
    }

    pub fn roll_multiple_dice(&mut self, count: i32, sides: i32) -> Vec<i32> {
        (0..count.max(0)).map(|_| self.roll_dice(sides)).collect()
    }

    pub fn roll_dice_sum(&mut self, count: i32, sides: i32) -> i32 {
        self.roll_multiple_dice(count, sides).into_iter().sum()
    }

    pub fn random_choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.stream.index(items.len()).map(|index| &items[index])
    }

    /// Inclusive on both ends; `min >= max` returns `min`.
    pub fn random_int_range(&mut self, min: i32, max: i32) -> i32 {
        self.stream.int_range(i64::from(min), i64::from(max)) as i32
    }

    pub fn random_float(&mut self) -> f64 {
        self.stream.unit_f64()
    }

    pub fn random_float_range(&mut self, min: f64, max: f64) -> f64 {
        self.stream.float_range(min, max)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.stream.chance(probability)
    }

    /// Picks an item proportionally to its weight.
    ///
    /// Weights are scanned in the order given, so callers must pass a stable
    /// order. A length mismatch or a non-positive total falls back to a
    /// uniform pick.
    pub fn weighted_choice<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
        if items.len() != weights.len() {
            return self.random_choice(items);
        }
        match self.stream.weighted_index(weights) {
            Some(index) => Some(&items[index]),
            None => self.random_choice(items),
        }
    }

    /// Weighted pick over an explicitly ordered `(key, weight)` table.
    pub fn weighted_pick<T: Copy>(&mut self, table: &[(T, f64)]) -> Option<T> {
        let weights: Vec<f64> = table.iter().map(|&(_, weight)| weight).collect();
        let index = match self.stream.weighted_index(&weights) {
            Some(index) => index,
            None => self.stream.index(table.len())?,
        };
        Some(table[index].0)
    }

    /// Child stream for `phase_label`, created on first use and reused afterwards.
    pub fn sub_stream(&mut self, phase_label: &str) -> &mut SeededStream {
        let parent = &mut self.stream;
        self.phases
            .entry(phase_label.to_owned())
            .or_insert_with(|| SeedManager::create_sub_rng(parent, phase_label))
    }
}
