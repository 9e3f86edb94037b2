//! Character-level string mutation for the raw-string fuzzing mode.

use crate::rng::{Seed, Xorshift64};

/// Mutates strings by inserting, replacing, and removing random
/// characters.
#[derive(Debug, Clone)]
pub struct StringMutator {
    max_mutations: u64,
    rng: Xorshift64,
}

impl StringMutator {
    /// Create a mutator applying between 1 and `max_mutations - 1`
    /// operations per round. A `max_mutations` of 1 or less always
    /// applies exactly one operation.
    #[must_use]
    pub fn new(max_mutations: usize, seed: Seed) -> Self {
        Self {
            max_mutations: max_mutations as u64,
            rng: Xorshift64::new(seed),
        }
    }

    /// Mutate the input with a freshly drawn number of single-character
    /// operations, each chosen uniformly among insert, replace, and
    /// delete.
    pub fn mutate(&mut self, input: &str) -> String {
        let mutations = self.rng.next_range(1, self.max_mutations);
        let mut chars: Vec<char> = input.chars().collect();
        for _ in 0..mutations {
            let roll = self.rng.next_f64();
            if roll < 1.0 / 3.0 {
                self.insert_character(&mut chars);
            } else if roll < 2.0 / 3.0 {
                self.replace_character(&mut chars);
            } else {
                self.remove_character(&mut chars);
            }
        }
        chars.into_iter().collect()
    }

    fn random_character(&mut self) -> char {
        char::from_u32(self.rng.next_range(0, 256) as u32).unwrap()
    }

    fn insert_character(&mut self, chars: &mut Vec<char>) {
        if chars.is_empty() {
            let ch = self.random_character();
            chars.push(ch);
            return;
        }
        let position = self.rng.next_index(chars.len());
        let ch = self.random_character();
        chars.insert(position, ch);
    }

    fn replace_character(&mut self, chars: &mut [char]) {
        if chars.is_empty() {
            return;
        }
        let position = self.rng.next_index(chars.len());
        chars[position] = self.random_character();
    }

    fn remove_character(&mut self, chars: &mut Vec<char>) {
        if chars.is_empty() {
            return;
        }
        let position = self.rng.next_index(chars.len());
        chars.remove(position);
    }
}
