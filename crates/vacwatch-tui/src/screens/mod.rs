//! Screen implementations. Each screen is a top-level Component.

pub mod detail;
pub mod overview;
pub mod vacancies;
pub mod watch;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Overview, Box::new(overview::OverviewScreen::new())),
        (
            ScreenId::Vacancies,
            Box::new(vacancies::VacanciesScreen::new()),
        ),
        (ScreenId::Detail, Box::new(detail::DetailScreen::new())),
        (ScreenId::Watch, Box::new(watch::WatchScreen::new())),
    ]
}
