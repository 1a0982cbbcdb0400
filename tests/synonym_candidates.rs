use std::fs;

use tempfile::tempdir;

use taxolabels::apps::run_create_synonyms;
use taxolabels::config::SynonymConfig;
use taxolabels::synonyms::run_synonyms;

const VECTORS: &str = "5 3
laptop 1.0 0.0 0.0
notebook 0.95 0.05 0.0
ultrabook 0.9 0.1 0.0
headphones 0.0 1.0 0.0
banana 0.0 0.0 1.0
";

#[test]
fn writes_one_line_per_word_with_several_close_neighbors() {
    let dir = tempdir().unwrap();
    let vectors = dir.path().join("title_model.vec");
    let words = dir.path().join("top_words.txt");
    let output = dir.path().join("synonyms.csv");
    fs::write(&vectors, VECTORS).unwrap();
    fs::write(&words, "laptop\nheadphones\nunknown\nnotebook\n").unwrap();

    let written = run_synonyms(&vectors, &words, &output, &SynonymConfig::default()).unwrap();

    assert_eq!(written, 2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "notebook,ultrabook\nlaptop,ultrabook\n"
    );
}

#[test]
fn threshold_outside_unit_interval_is_rejected() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("synonyms.csv");
    let config = SynonymConfig {
        similarity_threshold: 1.5,
        ..SynonymConfig::default()
    };
    let err = run_synonyms(
        &dir.path().join("missing.vec"),
        &dir.path().join("missing.txt"),
        &output,
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, taxolabels::LabelError::Configuration(_)));
    assert!(!output.exists());
}

#[test]
fn command_line_accepts_float_threshold() {
    let dir = tempdir().unwrap();
    let vectors = dir.path().join("title_model.vec");
    let words = dir.path().join("top_words.txt");
    let output = dir.path().join("synonyms.csv");
    fs::write(&vectors, VECTORS).unwrap();
    fs::write(&words, "laptop\n").unwrap();

    let args = [
        "--vectors".to_string(),
        vectors.display().to_string(),
        "--words".to_string(),
        words.display().to_string(),
        "--output".to_string(),
        output.display().to_string(),
        "--similarity-thresh".to_string(),
        "0.999".to_string(),
    ];
    run_create_synonyms(args.into_iter()).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}
