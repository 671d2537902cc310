/* 📖 # Why is the CLI so small?

`hal` does one thing: read a manifest (default `hal.toml`, or the path given as
the only argument), build the HAL document it describes and print it to stdout.
There is no argument parsing beyond that single optional path.

Exit codes:
- 0: document rendered
- 1: manifest missing or invalid, or the document could not be built
*/

mod manifest;

use std::env;
use std::path::PathBuf;
use std::process;

use hal_base::tracing::init_tracing;
use tracing::debug;

use crate::manifest::load_manifest;

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Warning: {}", e);
    }

    let path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("hal.toml"));

    let manifest = match load_manifest(&path) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("Error: {}", e);
            debug!("{:?}", e);
            process::exit(1);
        }
    };

    match manifest.render() {
        Ok(json) => {
            println!("{}", json);
            debug!(content_type = %manifest.render.content_type, "document rendered");
        }
        Err(e) => {
            eprintln!("Error: Failed to render document from {}: {}", path.display(), e);
            debug!("{:?}", e);
            process::exit(1);
        }
    }
}
