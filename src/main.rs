mod app;
mod kanji;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding composition.json, joyo.json, jinmeiyo.json and the
    /// optional searchlist.json.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Character to open with.
    #[arg(long, default_value = "休")]
    focus: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "kanji-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::KanjiAtlasApp::new(
                cc,
                args.data_dir.clone(),
                args.focus.clone(),
            )))
        }),
    )
}
