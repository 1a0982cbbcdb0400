use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::catalog::run_catalog_labels;
use crate::config::{
    CatalogConfig, LabelMode, LabeledQueriesConfig, MalformedEntryPolicy, RollupConfig,
    StemmerKind, SynonymConfig, TaxonomyConfig,
};
use crate::constants::rollup::DEFAULT_MAX_ITERATIONS;
use crate::constants::synonyms::{DEFAULT_NEIGHBORS, DEFAULT_SIMILARITY_THRESHOLD};
use crate::constants::taxonomy::{MUSIC_AND_MOVIES_CATEGORY_ID, ROOT_CATEGORY_ID};
use crate::normalize::QueryNormalizer;
use crate::pipeline::run_labeled_queries;
use crate::synonyms::run_synonyms;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MalformedArg {
    Skip,
    Fail,
}

impl From<MalformedArg> for MalformedEntryPolicy {
    fn from(value: MalformedArg) -> Self {
        match value {
            MalformedArg::Skip => MalformedEntryPolicy::Skip,
            MalformedArg::Fail => MalformedEntryPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StemmerArg {
    English,
    #[value(name = "none")]
    Identity,
}

impl From<StemmerArg> for StemmerKind {
    fn from(value: StemmerArg) -> Self {
        match value {
            StemmerArg::English => StemmerKind::English,
            StemmerArg::Identity => StemmerKind::Identity,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LabelArg {
    Id,
    Name,
}

impl From<LabelArg> for LabelMode {
    fn from(value: LabelArg) -> Self {
        match value {
            LabelArg::Id => LabelMode::Id,
            LabelArg::Name => LabelMode::Name,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "create-labeled-queries",
    disable_help_subcommand = true,
    about = "Build a classifier label file from search queries",
    long_about = "Map search queries to taxonomy categories, normalize the query text, and roll categories with too few queries up to their parent until every label meets the minimum support.",
    after_help = "Queries whose category ends up at the taxonomy root are dropped from the output."
)]
struct LabeledQueriesCli {
    #[arg(
        long,
        value_name = "XML",
        help = "Category hierarchy file with a root-to-self path per category"
    )]
    categories: PathBuf,
    #[arg(
        long,
        value_name = "CSV",
        help = "Query dataset with `category` and `query` columns"
    )]
    queries: PathBuf,
    #[arg(long, value_name = "PATH", help = "Label file to write")]
    output: PathBuf,
    #[arg(
        long = "min-queries",
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Minimum number of queries per category label"
    )]
    min_queries: usize,
    #[arg(
        long = "max-iterations",
        default_value_t = DEFAULT_MAX_ITERATIONS,
        value_parser = parse_positive_usize,
        help = "Abort if the rollup needs more passes than this"
    )]
    max_iterations: usize,
    #[arg(
        long = "root-category",
        default_value = ROOT_CATEGORY_ID,
        help = "Id of the taxonomy root"
    )]
    root_category: String,
    #[arg(
        long = "on-malformed",
        value_enum,
        default_value = "skip",
        help = "Skip or fail on taxonomy entries with a malformed path"
    )]
    on_malformed: MalformedArg,
    #[arg(
        long,
        value_enum,
        default_value = "english",
        help = "Stemmer applied to each query token"
    )]
    stemmer: StemmerArg,
}

#[derive(Debug, Parser)]
#[command(
    name = "create-content-labels",
    disable_help_subcommand = true,
    about = "Build a classifier label file from product catalog names",
    long_about = "Label every product name in a directory of catalog XML files with its leaf category, skipping music and movies, optionally keeping only categories with enough products."
)]
struct ContentLabelsCli {
    #[arg(long, value_name = "DIR", help = "Directory containing catalog XML files")]
    input: PathBuf,
    #[arg(long, value_name = "PATH", help = "Label file to write")]
    output: PathBuf,
    #[arg(
        long,
        value_enum,
        default_value = "id",
        help = "Label with the leaf category id (needed downstream) or its name (debugging)"
    )]
    label: LabelArg,
    #[arg(
        long = "min-products",
        default_value_t = 0,
        help = "Minimum number of products per category; 0 keeps all"
    )]
    min_products: usize,
    #[arg(
        long = "root-category",
        default_value = ROOT_CATEGORY_ID,
        help = "Id every accepted category path must start with"
    )]
    root_category: String,
    #[arg(
        long = "exclude-category",
        value_name = "ID",
        default_value = MUSIC_AND_MOVIES_CATEGORY_ID,
        help = "Second-level category to skip, repeat as needed"
    )]
    exclude_categories: Vec<String>,
    #[arg(
        long = "normalize-names",
        help = "Run product names through the query normalizer"
    )]
    normalize_names: bool,
}

#[derive(Debug, Parser)]
#[command(
    name = "create-synonyms",
    disable_help_subcommand = true,
    about = "List synonym candidates from word-vector nearest neighbors",
    long_about = "For each word in the word list, write its nearest neighbors above the similarity threshold as one comma-separated line, when there is more than one."
)]
struct SynonymsCli {
    #[arg(long, value_name = "VEC", help = "Word vectors in fastText .vec text format")]
    vectors: PathBuf,
    #[arg(long, value_name = "PATH", help = "One word per line")]
    words: PathBuf,
    #[arg(long, value_name = "PATH", help = "Synonyms file to write")]
    output: PathBuf,
    #[arg(
        long = "similarity-thresh",
        default_value_t = DEFAULT_SIMILARITY_THRESHOLD,
        help = "Minimum cosine similarity for a neighbor to count"
    )]
    similarity_thresh: f32,
    #[arg(
        long,
        default_value_t = DEFAULT_NEIGHBORS,
        value_parser = parse_positive_usize,
        help = "Nearest neighbors inspected per word"
    )]
    neighbors: usize,
}

/// Entry point of `create-labeled-queries`; `args_iter` excludes the program name.
pub fn run_create_labeled_queries<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();
    let Some(cli) = parse_cli::<LabeledQueriesCli, _>(
        std::iter::once("create-labeled-queries".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = LabeledQueriesConfig::new(cli.categories, cli.queries, cli.output)
        .with_taxonomy(
            TaxonomyConfig::default()
                .with_root_id(cli.root_category)
                .with_malformed_policy(cli.on_malformed.into()),
        )
        .with_rollup(RollupConfig::new(cli.min_queries).with_max_iterations(cli.max_iterations))
        .with_stemmer(cli.stemmer.into());
    let normalizer = QueryNormalizer::for_kind(config.stemmer);

    let report = run_labeled_queries(&config, &normalizer)?;
    println!("=== labeled queries ===");
    println!(
        "taxonomy: {} entries, {} categories, {} skipped",
        report.taxonomy_entries, report.taxonomy_categories, report.skipped_entries
    );
    println!(
        "queries: {} loaded, {} outside the taxonomy",
        report.rows_loaded, report.rows_out_of_taxonomy
    );
    println!(
        "rollup: {} passes (min queries {})",
        report.rollup_iterations, config.rollup.min_queries
    );
    println!(
        "output: {} lines written to {}, {} dropped at root",
        report.lines_written,
        config.output_path.display(),
        report.lines_dropped
    );
    Ok(())
}

/// Entry point of `create-content-labels`; `args_iter` excludes the program name.
pub fn run_create_content_labels<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();
    let Some(cli) = parse_cli::<ContentLabelsCli, _>(
        std::iter::once("create-content-labels".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = CatalogConfig::default()
        .with_root_id(cli.root_category)
        .with_excluded_top_level(cli.exclude_categories)
        .with_label_mode(cli.label.into())
        .with_min_products(cli.min_products)
        .with_normalize_names(cli.normalize_names);

    let report = run_catalog_labels(&cli.input, &cli.output, &config)?;
    println!("=== content labels ===");
    println!(
        "catalog: {} files, {} products, {} labeled",
        report.files, report.products, report.labels_extracted
    );
    println!(
        "categories: {} kept, {} below {} products",
        report.categories_kept, report.categories_dropped, config.min_products
    );
    println!(
        "output: {} lines written to {}",
        report.labels_written,
        cli.output.display()
    );
    Ok(())
}

/// Entry point of `create-synonyms`; `args_iter` excludes the program name.
pub fn run_create_synonyms<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();
    let Some(cli) = parse_cli::<SynonymsCli, _>(
        std::iter::once("create-synonyms".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = SynonymConfig {
        similarity_threshold: cli.similarity_thresh,
        neighbors: cli.neighbors,
    };
    let written = run_synonyms(&cli.vectors, &cli.words, &cli.output, &config)?;
    println!(
        "synonyms: {} lines written to {}",
        written,
        cli.output.display()
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}
