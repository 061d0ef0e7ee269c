//! Continuous and band scales plus sorted-array lookups.
//!
//! `LinearScale::nice` and `LinearScale::ticks` follow the usual 1-2-5 tick
//! progression so axes land on round numbers.

/// Linear map from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Extend the domain outward to round tick boundaries.
    pub fn nice(mut self) -> Self {
        self.domain = nice_domain(self.domain, 10);
        self
    }

    /// Roughly `count` round values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (a, b) = self.domain;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        ticks(lo, hi, count)
    }
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        // negative increments encode 1/step to keep fractional ticks exact
        -10f64.powf(-power) / factor
    }
}

fn nice_domain((d0, d1): (f64, f64), count: usize) -> (f64, f64) {
    let reversed = d1 < d0;
    let (mut start, mut stop) = if reversed { (d1, d0) } else { (d0, d1) };
    let mut previous = None;
    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if previous == Some(step) {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }
    if reversed {
        (stop, start)
    } else {
        (start, stop)
    }
}

/// Round values in `[lo, hi]` spaced by a 1-2-5 step.
pub fn ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(lo.is_finite() && hi.is_finite()) {
        return Vec::new();
    }
    if lo == hi {
        return vec![lo];
    }
    let inc = tick_increment(lo, hi, count);
    if inc > 0.0 {
        let first = (lo / inc).ceil() as i64;
        let last = (hi / inc).floor() as i64;
        (first..=last).map(|i| i as f64 * inc).collect()
    } else if inc < 0.0 {
        let inv = -inc;
        let first = (lo * inv).ceil() as i64;
        let last = (hi * inv).floor() as i64;
        (first..=last).map(|i| i as f64 / inv).collect()
    } else {
        Vec::new()
    }
}

/// Evenly spaced bands for categorical axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// `padding` is applied both between bands and at the outer edges.
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = count as f64;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self {
            count,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    /// Leading edge of band `index`.
    pub fn position(&self, index: usize) -> Option<f64> {
        (index < self.count).then(|| self.start + self.step * index as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

/// First index whose value is `>= target` (values sorted ascending).
pub fn bisect_left(values: &[f64], target: f64) -> usize {
    values.partition_point(|v| *v < target)
}

/// Index of the value nearest `target`; ties resolve to the right.
pub fn bisect_center(values: &[f64], target: f64) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let i = values[..values.len() - 1].partition_point(|v| *v < target);
    if i > 0 && values[i - 1] - target > target - values[i] {
        Some(i - 1)
    } else {
        Some(i)
    }
}
