use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    taxolabels::apps::run_create_content_labels(std::env::args().skip(1))
}
