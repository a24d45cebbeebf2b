//! Offline content compiler: converts each argument to a `.ast` container
//! next to its source.

use std::process::ExitCode;

use strata_content::{Content, ContentConfig};
use strata_core::{logging, profiling};

fn main() -> ExitCode {
    logging::init();
    #[cfg(feature = "profiling")]
    if let Ok(addr) = std::env::var("STRATA_PUFFIN_ADDR") {
        profiling::init_profiling(&addr);
    }

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: strata-process <file>...");
        return ExitCode::FAILURE;
    }

    let mut content = Content::headless(ContentConfig::default());
    let mut failed = 0;
    for path in &paths {
        profiling::new_frame();
        if content.process(path).is_err() {
            failed += 1;
        }
    }

    if failed > 0 {
        tracing::error!("{} of {} files failed to process", failed, paths.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
