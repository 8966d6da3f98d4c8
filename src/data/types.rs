//! Observation corpus with flat, handle-indexed storage

use crate::error::LearnError;
use ndarray::Array1;
use std::ops::Range;

/// A corpus of observation sequences.
///
/// Observations live in one flat vector and are identified by their index
/// into it (their *handle*), assigned when the sequence is pushed. Each
/// sequence occupies a contiguous handle range, so the observation at
/// position `i` of sequence `s` has handle `handles(s).start + i`. Handles
/// are what the cluster store keys on; observation values themselves never
/// need to be hashable or comparable.
#[derive(Debug, Clone)]
pub struct Corpus<O> {
    observations: Vec<O>,
    /// `offsets.len() == n_sequences + 1`; sequence `s` spans
    /// `offsets[s]..offsets[s + 1]`.
    offsets: Vec<usize>,
}

impl<O> Corpus<O> {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self {
            observations: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Build a corpus from a collection of sequences.
    pub fn from_sequences<I>(sequences: I) -> Result<Self, LearnError>
    where
        I: IntoIterator<Item = Vec<O>>,
    {
        let mut corpus = Self::new();
        for sequence in sequences {
            corpus.push_sequence(sequence)?;
        }
        Ok(corpus)
    }

    /// Append one sequence, assigning handles to its observations.
    ///
    /// Empty sequences are rejected: they have no first observation for
    /// initial-state estimation and no positions to decode.
    pub fn push_sequence(&mut self, sequence: Vec<O>) -> Result<(), LearnError> {
        if sequence.is_empty() {
            return Err(LearnError::EmptySequence(self.n_sequences()));
        }
        self.observations.extend(sequence);
        self.offsets.push(self.observations.len());
        Ok(())
    }

    /// Number of sequences
    pub fn n_sequences(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of observations across all sequences
    pub fn n_observations(&self) -> usize {
        self.observations.len()
    }

    /// Check if the corpus holds no sequences
    pub fn is_empty(&self) -> bool {
        self.n_sequences() == 0
    }

    /// Observations of sequence `index`, in order
    pub fn sequence(&self, index: usize) -> &[O] {
        &self.observations[self.handles(index)]
    }

    /// Handle range covered by sequence `index`
    pub fn handles(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    /// Observation behind a handle
    pub fn observation(&self, handle: usize) -> &O {
        &self.observations[handle]
    }

    /// All observations in handle order
    pub fn observations(&self) -> &[O] {
        &self.observations
    }

    /// Iterate over sequences in corpus order
    pub fn sequences(&self) -> impl Iterator<Item = &[O]> + '_ {
        (0..self.n_sequences()).map(move |i| self.sequence(i))
    }
}

impl<O> Default for Corpus<O> {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV persistence for vector corpora.
///
/// Format: a `sequence` id column followed by `x0..x{d-1}` value columns;
/// consecutive rows with the same id form one sequence.
impl Corpus<Array1<f64>> {
    pub fn to_csv(&self, path: &str) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let dim = self.observations.first().map(|o| o.len()).unwrap_or(0);
        let mut header = vec!["sequence".to_string()];
        header.extend((0..dim).map(|i| format!("x{}", i)));
        writer.write_record(&header)?;

        for (seq_id, sequence) in self.sequences().enumerate() {
            for obs in sequence {
                let mut record = vec![seq_id.to_string()];
                record.extend(obs.iter().map(|v| v.to_string()));
                writer.write_record(&record)?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    pub fn from_csv(path: &str) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut corpus = Corpus::new();
        let mut current_id: Option<String> = None;
        let mut pending: Vec<Array1<f64>> = Vec::new();

        for result in reader.records() {
            let record = result?;
            let id = record
                .get(0)
                .ok_or_else(|| anyhow::anyhow!("missing sequence column"))?
                .to_string();
            let values = record
                .iter()
                .skip(1)
                .map(str::parse)
                .collect::<Result<Vec<f64>, _>>()?;

            if current_id.as_deref() != Some(id.as_str()) {
                if !pending.is_empty() {
                    corpus.push_sequence(std::mem::take(&mut pending))?;
                }
                current_id = Some(id);
            }
            pending.push(Array1::from(values));
        }

        if !pending.is_empty() {
            corpus.push_sequence(pending)?;
        }

        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_corpus() -> Corpus<usize> {
        Corpus::from_sequences(vec![vec![0, 1, 2], vec![3, 4]]).unwrap()
    }

    #[test]
    fn test_handles_are_contiguous() {
        let corpus = sample_corpus();
        assert_eq!(corpus.n_sequences(), 2);
        assert_eq!(corpus.n_observations(), 5);
        assert_eq!(corpus.handles(0), 0..3);
        assert_eq!(corpus.handles(1), 3..5);
        assert_eq!(*corpus.observation(4), 4);
    }

    #[test]
    fn test_sequence_lookup() {
        let corpus = sample_corpus();
        assert_eq!(corpus.sequence(0), &[0, 1, 2]);
        assert_eq!(corpus.sequence(1), &[3, 4]);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let mut corpus: Corpus<usize> = Corpus::new();
        corpus.push_sequence(vec![7]).unwrap();
        let err = corpus.push_sequence(vec![]).unwrap_err();
        assert!(matches!(err, LearnError::EmptySequence(1)));
        assert_eq!(corpus.n_sequences(), 1);
    }

    #[test]
    fn test_csv_round_trip() {
        let corpus = Corpus::from_sequences(vec![
            vec![array![1.0, 2.0], array![3.0, 4.0]],
            vec![array![5.0, 6.0]],
        ])
        .unwrap();

        let path = std::env::temp_dir().join("segmental_hmm_corpus_test.csv");
        let path = path.to_str().unwrap();

        corpus.to_csv(path).unwrap();
        let loaded = Corpus::from_csv(path).unwrap();

        assert_eq!(loaded.n_sequences(), 2);
        assert_eq!(loaded.n_observations(), 3);
        assert_eq!(loaded.sequence(1)[0], array![5.0, 6.0]);
    }
}
