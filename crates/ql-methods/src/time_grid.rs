//! Time grids.
//!
//! A `TimeGrid` is a strictly increasing sequence of times starting at 0
//! that contains every mandatory time. Forward evolutions step through it.

use ql_core::{ensure, errors::Result, Real, Time};

/// A grid of time points.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Time>,
    dts: Vec<Time>,
    mandatory: Vec<Time>,
}

impl TimeGrid {
    /// Create a uniform time grid from 0 to `end` with `steps` intervals.
    pub fn uniform(end: Time, steps: usize) -> Result<Self> {
        ensure!(steps > 0, "time grid needs at least one step");
        ensure!(end > 0.0, "time grid end must be positive, got {end}");
        let dt = end / steps as Real;
        let times: Vec<Time> = (0..=steps).map(|i| i as Real * dt).collect();
        Ok(Self {
            dts: vec![dt; steps],
            times,
            mandatory: vec![end],
        })
    }

    /// Create a grid through `mandatory` times with at least `min_steps`
    /// intervals in total.
    ///
    /// The largest mandatory time is the grid end. Each interval between two
    /// consecutive mandatory times is divided into equal sub-steps no longer
    /// than `end / min_steps`.
    pub fn from_times(mandatory: &[Time], min_steps: usize) -> Result<Self> {
        ensure!(!mandatory.is_empty(), "at least one mandatory time is required");
        ensure!(
            mandatory.iter().all(|t| t.is_finite() && *t >= 0.0),
            "mandatory times must be finite and non-negative"
        );
        let mut stops: Vec<Time> = mandatory.to_vec();
        stops.sort_by(|a, b| a.total_cmp(b));
        stops.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        let end = stops[stops.len() - 1];
        ensure!(end > 0.0, "time grid end must be positive");
        let max_dt = end / min_steps.max(1) as Real;

        let mut times = vec![0.0];
        let mut last = 0.0;
        for &stop in &stops {
            if stop - last < 1e-12 {
                continue;
            }
            let n = ((stop - last) / max_dt - 1e-10).ceil().max(1.0) as usize;
            let h = (stop - last) / n as Real;
            times.extend((1..n).map(|i| last + i as Real * h));
            times.push(stop);
            last = stop;
        }

        let dts = times.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(Self {
            times,
            dts,
            mandatory: stops,
        })
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> usize {
        self.times.len()
    }

    /// Number of steps (= time points − 1).
    pub fn steps(&self) -> usize {
        self.dts.len()
    }

    /// Time at index `i`.
    pub fn time(&self, i: usize) -> Time {
        self.times[i]
    }

    /// Time step between index `i` and `i+1`.
    pub fn dt(&self, i: usize) -> Time {
        self.dts[i]
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The mandatory times, sorted and de-duplicated.
    pub fn mandatory_times(&self) -> &[Time] {
        &self.mandatory
    }

    /// Index of the grid point closest to `t`.
    pub fn closest_index(&self, t: Time) -> usize {
        let mut best = 0;
        for (i, &ti) in self.times.iter().enumerate() {
            if (ti - t).abs() < (self.times[best] - t).abs() {
                best = i;
            }
        }
        best
    }
}
