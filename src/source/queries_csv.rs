use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::log::QUERIES;
use crate::constants::queries::{CATEGORY_COLUMN, QUERY_COLUMN};
use crate::data::QueryRecord;
use crate::errors::LabelError;
use crate::types::{CategoryId, QueryText};

/// Columns of interest in the query dataset; everything else is ignored.
#[derive(Debug, Deserialize)]
struct QueryRow {
    category: CategoryId,
    query: QueryText,
}

/// Read `(category, query)` rows from a CSV dataset with a header line.
///
/// Rows too short to reach both required columns are skipped with a warning;
/// they can never carry a label.
pub fn read_queries<R: Read>(input: R, origin: &str) -> Result<Vec<QueryRecord>, LabelError> {
    let csv_error = |source: csv::Error| LabelError::Csv {
        origin: origin.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut required = 0usize;
    for column in [CATEGORY_COLUMN, QUERY_COLUMN] {
        let Some(idx) = headers.iter().position(|header| header == column) else {
            return Err(LabelError::MissingColumn {
                origin: origin.to_string(),
                column: column.to_string(),
            });
        };
        required = required.max(idx + 1);
    }

    let mut records = Vec::new();
    let mut short_rows = 0usize;
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        if row.len() < required {
            short_rows += 1;
            continue;
        }
        let row: QueryRow = row.deserialize(Some(&headers)).map_err(csv_error)?;
        records.push(QueryRecord::new(row.category, row.query));
    }

    if short_rows > 0 {
        warn!(
            "{QUERIES} skipped {} rows of {} missing the category or query field",
            short_rows, origin
        );
    }
    debug!("{QUERIES} read {} rows from {}", records.len(), origin);
    Ok(records)
}

/// Read query rows from a file on disk.
pub fn read_queries_file(path: &Path) -> Result<Vec<QueryRecord>, LabelError> {
    let file = File::open(path)?;
    read_queries(file, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_category_and_query_ignoring_other_columns() {
        let csv = "user,sku,category,query,click_time\n\
                   u1,100,abcat0101001,\"Sony TV, 40 inch\",2011-09-01\n\
                   u2,200,pcmcat209400050001,ipad,2011-09-02\n";
        let records = read_queries(csv.as_bytes(), "inline").unwrap();
        assert_eq!(
            records,
            vec![
                QueryRecord::new("abcat0101001", "Sony TV, 40 inch"),
                QueryRecord::new("pcmcat209400050001", "ipad"),
            ]
        );
    }

    #[test]
    fn short_rows_are_skipped_instead_of_failing_the_load() {
        let csv = "user,sku,category,query,click_time\n\
                   u1,100,abcat0101001,tv,2011-09-01\n\
                   u2,200,abcat0101001\n\
                   u3,300,pcmcat209400050001,ipad\n";
        let records = read_queries(csv.as_bytes(), "inline").unwrap();
        assert_eq!(
            records,
            vec![
                QueryRecord::new("abcat0101001", "tv"),
                QueryRecord::new("pcmcat209400050001", "ipad"),
            ]
        );
    }

    #[test]
    fn missing_query_column_is_reported() {
        let csv = "category,text\nabc,hello\n";
        let err = read_queries(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, LabelError::MissingColumn { ref column, .. } if column == "query"));
    }
}
