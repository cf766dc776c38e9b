/// Running arithmetic mean over integer samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningAverage {
    total: i64,
    count: u32,
}

impl RunningAverage {
    pub fn add(&mut self, value: i64) {
        self.total += value;
        self.count += 1;
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns `total / count`, or 0.0 when nothing has been added.
    pub fn compute(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total as f64 / self.count as f64
    }
}
