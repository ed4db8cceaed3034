use rand::{Rng, seq::SliceRandom};

use crate::{SequenceDataset, SequenceItem};

/// Fixed-size batches over a sequence dataset.
///
/// The last batch holds the remainder. With shuffling enabled every pass
/// draws a fresh permutation from the caller's random source.
#[derive(Debug, Clone, Copy)]
pub struct DataLoader<'a> {
    dataset: &'a SequenceDataset,
    batch_size: usize,
    shuffle: bool,
}

impl<'a> DataLoader<'a> {
    /// A batch size of zero is treated as one.
    #[must_use]
    pub fn new(dataset: &'a SequenceDataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_shuffle(self, shuffle: bool) -> Self {
        Self { shuffle, ..self }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Subject indices of each batch for one pass.
    pub fn batch_indices<R>(&self, rng: &mut R) -> Vec<Vec<usize>>
    where
        R: Rng + ?Sized,
    {
        let mut order = (0..self.dataset.len()).collect::<Vec<_>>();
        if self.shuffle {
            order.shuffle(rng);
        }
        order
            .chunks(self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }

    /// Batches of sequence items for one pass.
    pub fn batches<R>(&self, rng: &mut R) -> Vec<Vec<SequenceItem>>
    where
        R: Rng + ?Sized,
    {
        self.batch_indices(rng)
            .into_iter()
            .map(|indices| {
                indices
                    .into_iter()
                    .filter_map(|i| self.dataset.item(i))
                    .collect()
            })
            .collect()
    }
}
