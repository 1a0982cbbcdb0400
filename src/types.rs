/// Opaque category identifier from the product taxonomy.
/// Examples: `cat00000`, `abcat0101001`, `pcmcat209400050001`
pub type CategoryId = String;
/// Human-readable category name as it appears in the taxonomy or catalog.
/// Example: `All Flat-Panel TVs`
pub type CategoryName = String;
/// Raw or normalized query text.
/// Examples: `Beats By Dr. Dre- Monster Pro`, `beat by dr dre monster pro`
pub type QueryText = String;
/// A single token produced by the query normalizer.
/// Example: `headphon`
pub type Token = String;
/// Vocabulary word in a word-vector table.
/// Example: `laptop`
pub type Word = String;
/// A fully formatted label-file line.
/// Example: `__label__abcat0101001 sony tv`
pub type LabelLine = String;
