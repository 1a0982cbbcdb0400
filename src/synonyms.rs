//! Synonym candidates from nearest neighbors in a word-vector table.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::SynonymConfig;
use crate::constants::log::SYNONYMS;
use crate::constants::synonyms::SYNONYM_SEPARATOR;
use crate::errors::LabelError;
use crate::transport::fs::create_output;
use crate::types::Word;

/// Source of nearest neighbors for a vocabulary word.
pub trait NearestNeighbors: Send + Sync {
    /// Up to `k` `(similarity, word)` pairs, most similar first, excluding `word` itself.
    fn nearest_neighbors(&self, word: &str, k: usize) -> Vec<(f32, Word)>;
}

/// In-memory word vectors, unit-normalized so dot product is cosine similarity.
#[derive(Clone, Debug, Default)]
pub struct WordVectors {
    words: Vec<Word>,
    index: HashMap<Word, usize>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl WordVectors {
    /// Build a table from `(word, vector)` pairs. All vectors must share one dimension.
    pub fn from_entries<I>(entries: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = (Word, Vec<f32>)>,
    {
        let mut table = Self::default();
        for (line, (word, vector)) in entries.into_iter().enumerate() {
            table.push(line + 1, word, vector)?;
        }
        Ok(table)
    }

    /// Read the fastText `.vec` text format: an optional `count dim` header, then
    /// one `word v1 v2 ...` line per word.
    pub fn read_vec<R: BufRead>(input: R) -> Result<Self, LabelError> {
        let mut table = Self::default();
        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();
            if idx == 0 && values.len() == 1 && is_vec_header(word, values[0]) {
                continue;
            }
            let vector = values
                .iter()
                .map(|value| {
                    value.parse::<f32>().map_err(|err| LabelError::Vectors {
                        line: line_no,
                        details: format!("'{value}' is not a number: {err}"),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            table.push(line_no, word.to_string(), vector)?;
        }
        Ok(table)
    }

    /// Read a `.vec` file from disk.
    pub fn read_vec_file(path: &Path) -> Result<Self, LabelError> {
        let table = Self::read_vec(BufReader::new(File::open(path)?))?;
        debug!(
            "{SYNONYMS} loaded {} vectors of dimension {} from {}",
            table.len(),
            table.dim,
            path.display()
        );
        Ok(table)
    }

    fn push(&mut self, line: usize, word: Word, mut vector: Vec<f32>) -> Result<(), LabelError> {
        if vector.is_empty() {
            return Err(LabelError::Vectors {
                line,
                details: format!("word '{word}' has no components"),
            });
        }
        if self.dim == 0 {
            self.dim = vector.len();
        } else if vector.len() != self.dim {
            return Err(LabelError::Vectors {
                line,
                details: format!(
                    "word '{word}' has {} components, expected {}",
                    vector.len(),
                    self.dim
                ),
            });
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        if self.index.contains_key(&word) {
            return Ok(());
        }
        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.vectors.push(vector);
        Ok(())
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the table holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `word` has a vector.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }
}

fn is_vec_header(first: &str, second: &str) -> bool {
    first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
}

impl NearestNeighbors for WordVectors {
    fn nearest_neighbors(&self, word: &str, k: usize) -> Vec<(f32, Word)> {
        let Some(&query_idx) = self.index.get(word) else {
            return Vec::new();
        };
        let query = &self.vectors[query_idx];
        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != query_idx)
            .map(|(idx, vector)| {
                let similarity = query.iter().zip(vector).map(|(a, b)| a * b).sum::<f32>();
                (similarity, idx)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(k);
        scored
            .into_iter()
            .map(|(similarity, idx)| (similarity, self.words[idx].clone()))
            .collect()
    }
}

/// Synonym line for one word, or `None` unless more than one neighbor passes the threshold.
pub fn synonym_line(
    word: &str,
    neighbors: &dyn NearestNeighbors,
    config: &SynonymConfig,
) -> Option<String> {
    let synonyms: Vec<Word> = neighbors
        .nearest_neighbors(word, config.neighbors)
        .into_iter()
        .filter(|(similarity, _)| *similarity >= config.similarity_threshold)
        .map(|(_, neighbor)| neighbor)
        .collect();
    (synonyms.len() > 1).then(|| synonyms.join(SYNONYM_SEPARATOR))
}

/// Synonym lines for every word, in input order, computed in parallel.
pub fn synonym_lines(
    words: &[Word],
    neighbors: &dyn NearestNeighbors,
    config: &SynonymConfig,
) -> Vec<String> {
    words
        .par_iter()
        .filter_map(|word| synonym_line(word, neighbors, config))
        .collect()
}

/// Read one word per line, trimming whitespace and skipping blank lines.
pub fn read_words<R: BufRead>(input: R) -> Result<Vec<Word>, LabelError> {
    let mut words = Vec::new();
    for line in input.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// Load vectors and words, then write synonym lines to `output_path`.
///
/// Returns the number of lines written.
pub fn run_synonyms(
    vectors_path: &Path,
    words_path: &Path,
    output_path: &Path,
    config: &SynonymConfig,
) -> Result<usize, LabelError> {
    if !(0.0..=1.0).contains(&config.similarity_threshold) {
        return Err(LabelError::Configuration(format!(
            "similarity threshold {} is outside [0, 1]",
            config.similarity_threshold
        )));
    }
    let vectors = WordVectors::read_vec_file(vectors_path)?;
    let words = read_words(BufReader::new(File::open(words_path)?))?;
    let missing = words.iter().filter(|word| !vectors.contains(word)).count();
    info!(
        "{SYNONYMS} finding synonyms for {} words ({} not in vocabulary)",
        words.len(),
        missing
    );

    let lines = synonym_lines(&words, &vectors, config);
    let mut out = std::io::BufWriter::new(create_output(output_path)?);
    for line in &lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> WordVectors {
        WordVectors::from_entries([
            ("laptop".to_string(), vec![1.0, 0.0, 0.0]),
            ("notebook".to_string(), vec![0.9, 0.1, 0.0]),
            ("computer".to_string(), vec![0.8, 0.2, 0.0]),
            ("banana".to_string(), vec![0.0, 0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn neighbors_are_sorted_and_exclude_the_query() {
        let neighbors = table().nearest_neighbors("laptop", 10);
        let words: Vec<_> = neighbors.iter().map(|(_, w)| w.as_str()).collect();
        assert_eq!(words, vec!["notebook", "computer", "banana"]);
        assert!(neighbors[0].0 > neighbors[1].0);
        assert!(neighbors[2].0.abs() < 1e-6);
    }

    #[test]
    fn unknown_words_have_no_neighbors() {
        assert!(table().nearest_neighbors("tablet", 5).is_empty());
    }

    #[test]
    fn line_requires_more_than_one_synonym_above_threshold() {
        let vectors = table();
        let config = SynonymConfig::default();
        assert_eq!(
            synonym_line("laptop", &vectors, &config).as_deref(),
            Some("notebook,computer")
        );
        assert_eq!(synonym_line("banana", &vectors, &config), None);

        let strict = SynonymConfig {
            similarity_threshold: 0.99,
            ..SynonymConfig::default()
        };
        assert_eq!(synonym_line("laptop", &vectors, &strict), None);
    }

    #[test]
    fn reads_vec_format_with_header() {
        let vec = "3 2\nalpha 1 0\nbeta 0 1\ngamma 0.5 0.5\n";
        let table = WordVectors::read_vec(vec.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.contains("gamma"));
    }

    #[test]
    fn rejects_inconsistent_dimensions() {
        let vec = "alpha 1 0\nbeta 0 1 2\n";
        let err = WordVectors::read_vec(vec.as_bytes()).unwrap_err();
        assert!(matches!(err, LabelError::Vectors { line: 2, .. }));
    }

    #[test]
    fn read_words_skips_blank_lines() {
        let words = read_words("laptop\n\n  tv \n".as_bytes()).unwrap();
        assert_eq!(words, vec!["laptop", "tv"]);
    }
}
