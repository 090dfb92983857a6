use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across the application. This allows
/// rollover logic to be tested without depending on the wall clock.
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;

    /// Calendar date records are keyed by.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
