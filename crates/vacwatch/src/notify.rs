// Terminal notifier: alerts go to stderr, with a bell when attached to a
// terminal, so stdout stays clean for structured output.

use std::io::{self, IsTerminal, Write};

use vacwatch_core::{Badge, Notifier, VacancyAlert, format_timestamp};

use crate::output;

pub struct ConsoleNotifier {
    color: bool,
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, alert: &VacancyAlert) {
        if self.quiet {
            return;
        }
        let bell = if io::stderr().is_terminal() { "\x07" } else { "" };
        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{bell}{} {} {}",
            output::good(&format!("[{}]", alert.title), self.color),
            alert.message,
            output::dim(
                &format!("(total {}, {})", alert.count, format_timestamp(&alert.raised_at)),
                self.color
            ),
        );
    }

    fn set_badge(&self, badge: &Badge) {
        tracing::debug!(badge = badge.text(), "badge");
    }
}
