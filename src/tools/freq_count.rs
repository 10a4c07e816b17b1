use std::collections::BTreeMap;

/// Symbol counts for one input. Ordered by symbol value so that everything built from it
/// (in particular the Huffman tree) comes out the same on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreqMap {
    counts: BTreeMap<u8, u64>,
}

impl FreqMap {
    /// Count for one symbol, 0 if it never appeared.
    pub fn get(&self, sym: u8) -> u64 {
        self.counts.get(&sym).copied().unwrap_or(0)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Add n occurrences of a symbol. Adding 0 is a no-op, so there are never zero entries.
    pub fn add(&mut self, sym: u8, n: u64) {
        if n > 0 {
            *self.counts.entry(sym).or_insert(0) += n;
        }
    }

    /// (symbol, count) pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&sym, &count)| (sym, count))
    }
}

impl FromIterator<(u8, u64)> for FreqMap {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let mut freqs = FreqMap::default();
        iter.into_iter().for_each(|(sym, n)| freqs.add(sym, n));
        freqs
    }
}

/// Returns a frequency count of the input data.
pub fn freqs(data: &[u8]) -> FreqMap {
    // Count into a flat table first, it is much faster than touching the map per byte.
    let mut table = [0_u64; 256];
    data.iter().for_each(|&el| table[el as usize] += 1);
    table
        .iter()
        .enumerate()
        .map(|(sym, &count)| (sym as u8, count))
        .collect()
}
