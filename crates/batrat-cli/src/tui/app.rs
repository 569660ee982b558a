//! TUI application state and event loop.
//!
//! Design: one dataset at a time. The left list holds the dataset's fields;
//! the right side shows the selected field's summary and distribution. `a`
//! switches the right side to the two inferential analyses, which are
//! computed once at startup since the session data never changes.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use batrat_core::{
    AnalysisConfig, AnalysisError, DataSession, FieldKind, FieldSpec, FieldSummary, Record,
    describe, histogram, value_counts,
};
use batrat_stats::{ContingencyAnalysis, RegressionFitResult};

use crate::commands::{Dataset, hist};

/// Most categorical labels shown as bars.
const MAX_BARS: usize = 12;

const OUTCOME: &str = "risk";
const ASSOCIATED_WITH: &str = "reward";
const PREDICTORS: [&str; 2] = ["seconds_after_rat_arrival", "hours_after_sunset"];

/// What the right-hand panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Field,
    Analysis,
}

pub struct App<'a> {
    session: &'a DataSession,
    config: &'a AnalysisConfig,
    dataset: Dataset,
    view: View,
    cursor: usize,
    running: bool,
    landing_summaries: Vec<FieldSummary>,
    arrival_summaries: Vec<FieldSummary>,
    association: Result<(ContingencyAnalysis, usize), AnalysisError>,
    model: Result<(RegressionFitResult, usize), AnalysisError>,
}

impl<'a> App<'a> {
    pub fn new(session: &'a DataSession, config: &'a AnalysisConfig) -> Self {
        Self {
            session,
            config,
            dataset: Dataset::Landings,
            view: View::Field,
            cursor: 0,
            running: true,
            landing_summaries: describe(session.landings()),
            arrival_summaries: describe(session.arrivals()),
            association: crate::commands::chisq::compute(
                session,
                config,
                OUTCOME,
                ASSOCIATED_WITH,
            ),
            model: crate::commands::logit::compute(session, config, OUTCOME, &PREDICTORS),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Up | KeyCode::Char('k') => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor < self.field_names().len().saturating_sub(1) {
                    self.cursor += 1;
                }
            }
            KeyCode::Tab | KeyCode::Char('d') => {
                self.dataset = match self.dataset {
                    Dataset::Landings => Dataset::Arrivals,
                    Dataset::Arrivals => Dataset::Landings,
                };
                self.cursor = 0;
            }
            KeyCode::Char('a') => {
                self.view = match self.view {
                    View::Field => View::Analysis,
                    View::Analysis => View::Field,
                };
            }
            _ => {}
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn row_count(&self) -> usize {
        match self.dataset {
            Dataset::Landings => self.session.landings().len(),
            Dataset::Arrivals => self.session.arrivals().len(),
        }
    }

    pub fn significance_level(&self) -> f64 {
        self.config.significance_level
    }

    pub fn summaries(&self) -> &[FieldSummary] {
        match self.dataset {
            Dataset::Landings => &self.landing_summaries,
            Dataset::Arrivals => &self.arrival_summaries,
        }
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.summaries().iter().map(|s| s.field).collect()
    }

    pub fn selected(&self) -> Option<&FieldSummary> {
        self.summaries().get(self.cursor)
    }

    /// Bars for the selected field: histogram bins for continuous fields,
    /// label counts for categorical ones, nothing for text.
    pub fn distribution(&self) -> Vec<(String, u64)> {
        let Some(name) = self.selected().map(|s| s.field) else {
            return Vec::new();
        };
        let bins = self.config.histogram_bins;
        match self.dataset {
            Dataset::Landings => distribution(self.session.landings(), name, bins),
            Dataset::Arrivals => distribution(self.session.arrivals(), name, bins),
        }
    }

    /// Kernel density estimate of the selected continuous field, one value
    /// per histogram bin in count units. Empty for other fields.
    pub fn density_curve(&self) -> Vec<f64> {
        let Some(name) = self.selected().map(|s| s.field) else {
            return Vec::new();
        };
        let bins = self.config.histogram_bins;
        let built = match self.dataset {
            Dataset::Landings => hist::build(self.session.landings(), name, bins),
            Dataset::Arrivals => hist::build(self.session.arrivals(), name, bins),
        };
        built.map(|(_, curve)| curve).unwrap_or_default()
    }

    pub fn association(&self) -> &Result<(ContingencyAnalysis, usize), AnalysisError> {
        &self.association
    }

    pub fn model(&self) -> &Result<(RegressionFitResult, usize), AnalysisError> {
        &self.model
    }
}

fn distribution<R: Record>(records: &[R], name: &str, bins: Option<usize>) -> Vec<(String, u64)> {
    let Ok(field) = R::Field::parse(name) else {
        return Vec::new();
    };
    match field.kind() {
        FieldKind::Continuous => histogram(records, field, bins)
            .map(|h| {
                h.bins
                    .iter()
                    .map(|b| (format!("{:.1}", b.lower), b.count as u64))
                    .collect()
            })
            .unwrap_or_default(),
        FieldKind::Categorical => value_counts(records, field)
            .into_iter()
            .take(MAX_BARS)
            .map(|(label, count)| (label, count as u64))
            .collect(),
        FieldKind::Text => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batrat_core::{ArrivalRecord, ObservationRecord};

    fn session() -> DataSession {
        let landings = (0..20)
            .map(|i| ObservationRecord {
                risk: Some(if i % 2 == 0 { "1" } else { "0" }.to_string()),
                reward: Some(if i % 3 == 0 { "1" } else { "0" }.to_string()),
                habit: Some(if i < 5 { "rat" } else { "fast" }.to_string()),
                seconds_after_rat_arrival: Some(i as f64 * 3.0),
                hours_after_sunset: Some((i % 4) as f64),
                ..Default::default()
            })
            .collect();
        let arrivals = (0..4)
            .map(|i| ArrivalRecord {
                rat_minutes: Some(i as f64),
                ..Default::default()
            })
            .collect();
        DataSession::from_records(landings, arrivals)
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let session = session();
        let config = AnalysisConfig::default();
        let mut app = App::new(&session, &config);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.cursor(), 0);
        for _ in 0..50 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.cursor(), app.field_names().len() - 1);
    }

    #[test]
    fn tab_switches_dataset_and_resets_cursor() {
        let session = session();
        let config = AnalysisConfig::default();
        let mut app = App::new(&session, &config);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.dataset(), Dataset::Arrivals);
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.field_names().len(), 7);
        assert_eq!(app.row_count(), 4);
    }

    #[test]
    fn analysis_view_toggles() {
        let session = session();
        let config = AnalysisConfig::default();
        let mut app = App::new(&session, &config);
        assert_eq!(app.view(), View::Field);
        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.view(), View::Analysis);
        assert!(app.association().is_ok());
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn distribution_follows_field_kind() {
        let session = session();
        let config = AnalysisConfig::default();
        let mut app = App::new(&session, &config);

        // start_time: text, nothing to plot.
        assert!(app.distribution().is_empty());

        // bat_landing_to_food is all missing.
        app.handle_key(KeyCode::Down);
        assert!(app.distribution().is_empty());

        // habit: categorical.
        app.handle_key(KeyCode::Down);
        let bars = app.distribution();
        assert_eq!(bars[0], ("fast".to_string(), 15));
        assert!(app.density_curve().is_empty());

        // seconds_after_rat_arrival: continuous, Sturges bins over 20 values.
        for _ in 0..3 {
            app.handle_key(KeyCode::Down);
        }
        let bars = app.distribution();
        assert_eq!(bars.len(), 6);
        assert_eq!(bars.iter().map(|(_, c)| c).sum::<u64>(), 20);
        let curve = app.density_curve();
        assert_eq!(curve.len(), bars.len());
        assert!(curve.iter().all(|c| *c > 0.0));
    }
}
