use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    taxolabels::apps::run_create_labeled_queries(std::env::args().skip(1))
}
