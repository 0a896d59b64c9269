// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `stats` module provides the aggregate statistics of the global header report.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Summary statistics over a numeric per-frame metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub avg: f64,
    pub stdev: f64,
    pub min: u64,
    pub max: u64,
}

impl Stats {
    /// Summarize a sequence of values. The standard deviation is the sample standard deviation,
    /// defined as 0 over a single value.
    pub fn from_values(values: &[u64]) -> Stats {
        if values.is_empty() {
            return Stats { avg: 0.0, stdev: 0.0, min: 0, max: 0 };
        }

        let n = values.len() as f64;
        let sum: u64 = values.iter().sum();
        let avg = sum as f64 / n;

        let stdev = if values.len() > 1 {
            let var =
                values.iter().map(|&v| (v as f64 - avg).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        }
        else {
            0.0
        };

        let min = *values.iter().min().unwrap();
        let max = *values.iter().max().unwrap();

        Stats { avg, stdev, min, max }
    }
}

/// Counts of a categorical per-frame metric.
///
/// The mapping is seeded with every declared category at count 0; observations of categories
/// outside the declared set are appended dynamically. Iteration, serialization, and dominance
/// tie-breaking all follow the seeding order.
#[derive(Clone, Debug, Default)]
pub struct Categorical {
    entries: Vec<(String, u64)>,
}

impl Categorical {
    /// Create a mapping seeded with the declared categories, each at count 0.
    pub fn new(categories: &[&str]) -> Categorical {
        Categorical {
            entries: categories.iter().map(|&c| (c.to_string(), 0)).collect(),
        }
    }

    /// Record one observation of a category.
    pub fn observe(&mut self, category: &str) {
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((category.to_string(), 1)),
        }
    }

    /// The category with the highest count. Ties are broken by seeding order.
    pub fn dominant(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;

        for (category, count) in &self.entries {
            match best {
                Some((_, best_count)) if best_count >= *count => (),
                _ => best = Some((category, *count)),
            }
        }

        best
    }

    /// Iterate the categories and their counts in seeding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), *n))
    }
}

impl Serialize for Categorical {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, count) in &self.entries {
            map.serialize_entry(category, count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Categorical, Stats};

    #[test]
    fn verify_stats_from_values() {
        let stats = Stats::from_values(&[417, 418, 417, 418]);

        assert_eq!(stats.min, 417);
        assert_eq!(stats.max, 418);
        assert!((stats.avg - 417.5).abs() < 1e-9);
        // Sample standard deviation of two 417s and two 418s.
        assert!((stats.stdev - (1.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn verify_stats_single_sample() {
        let stats = Stats::from_values(&[1152]);

        assert_eq!(stats.avg, 1152.0);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!(stats.min, 1152);
        assert_eq!(stats.max, 1152);
    }

    #[test]
    fn verify_categorical_seeding_and_observation() {
        let mut cat = Categorical::new(&["1", "2", "2.5"]);

        cat.observe("2");
        cat.observe("2");
        cat.observe("7");

        let entries: Vec<_> = cat.iter().collect();
        assert_eq!(entries, vec![("1", 0), ("2", 2), ("2.5", 0), ("7", 1)]);
        assert_eq!(cat.dominant(), Some(("2", 2)));
    }

    #[test]
    fn verify_categorical_dominant_tie_break() {
        let mut cat = Categorical::new(&["Stereo", "JointStereo", "Mono"]);

        cat.observe("Mono");
        cat.observe("JointStereo");

        // Equal counts resolve to the earlier seeded category.
        assert_eq!(cat.dominant(), Some(("JointStereo", 1)));
    }
}
