//! Read a board image with recorded detections.
//!
//! ```bash
//! cargo run -p boardsight --example read_board -- board.png haki.json gear.json
//! ```

use std::env;

use boardsight::detect::load_rgb;
use boardsight::fusion::{DetectorRole, ModelRegistry, ReplayAdapter};
use boardsight::{BoardReader, BoardRequest, DetectorMode, ReaderParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    boardsight::core::init_with_level(log::LevelFilter::Info)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let [image, specialist, generalist] = args.as_slice() else {
        eprintln!("usage: read_board <image> <specialist.json> <generalist.json>");
        std::process::exit(2);
    };

    let mut registry = ModelRegistry::new();
    registry.register(
        "specialist",
        DetectorRole::Specialist,
        ReplayAdapter::load_json(specialist)?,
    )?;
    registry.register(
        "generalist",
        DetectorRole::Generalist,
        ReplayAdapter::load_json(generalist)?,
    )?;

    let reader = BoardReader::new(registry, ReaderParams::default())?;
    for mode in [DetectorMode::Ensemble, DetectorMode::Auto] {
        let report = reader.read(BoardRequest::new(load_rgb(image)?).with_mode(mode))?;
        println!("{mode:>9}: {}", report.notation);
        for warning in &report.warnings {
            println!("           warning: {warning}");
        }
    }
    Ok(())
}
