use batrat_core::{AnalysisConfig, DataSession};

pub fn run(session: &DataSession, config: &AnalysisConfig) {
    let mut app = crate::tui::app::App::new(session, config);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
