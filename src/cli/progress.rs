use scrivener::log_sink::LogSession;
use std::time::Instant;

/// Tallies a materialization run and prints a summary block at the end.
pub struct ProgressIndicator {
    total: usize,
    written: usize,
    failed: Vec<String>,
    start_time: Instant,
}

impl ProgressIndicator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            written: 0,
            failed: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn complete_item(&mut self, name: &str, success: bool) {
        if success {
            self.written += 1;
        } else {
            self.failed.push(name.to_string());
        }
        tracing::debug!(
            item = name,
            success,
            done = self.written + self.failed.len(),
            total = self.total,
            "artifact processed"
        );
    }

    pub fn finish(&self, session: &LogSession) {
        let elapsed = self.start_time.elapsed();
        session.report(format!("\n{}", "=".repeat(60)));
        session.report("Summary:");
        session.report(format!("  Artifacts: {}", self.total));
        session.report(format!("  Written:   {}", self.written));
        session.report(format!("  Failed:    {}", self.failed.len()));
        for name in &self.failed {
            session.report(format!("    - {}", name));
        }
        session.report(format!("  Duration:  {:.2}s", elapsed.as_secs_f64()));
        session.report("=".repeat(60));
    }
}
