use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    submissions: AtomicU64,
    sink_errors: AtomicU64,
    fetches: AtomicU64,
    empty_fetches: AtomicU64,
    acks: AtomicU64,
}

impl Metrics {
    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_fetch(&self) {
        self.empty_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ack(&self) {
        self.acks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let submissions = self.submissions.load(Ordering::Relaxed);
        let sink_errors = self.sink_errors.load(Ordering::Relaxed);
        let fetches = self.fetches.load(Ordering::Relaxed);
        let empty_fetches = self.empty_fetches.load(Ordering::Relaxed);
        let acks = self.acks.load(Ordering::Relaxed);

        format!(
            "# TYPE attendance_submissions_total counter\n\
attendance_submissions_total {}\n\
# TYPE attendance_sink_errors_total counter\n\
attendance_sink_errors_total {}\n\
# TYPE attendance_fetches_total counter\n\
attendance_fetches_total {}\n\
# TYPE attendance_empty_fetches_total counter\n\
attendance_empty_fetches_total {}\n\
# TYPE attendance_acks_total counter\n\
attendance_acks_total {}\n",
            submissions, sink_errors, fetches, empty_fetches, acks
        )
    }
}
