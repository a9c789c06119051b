//! Gyro bias capture. Holding an airframe perfectly still is hard, so
//! instead of trusting one averaging window this keeps sampling short
//! windows until one is quiet enough, and remembers the quietest seen in
//! case none ever is.

pub const SAMPLES_PER_WINDOW: i32 = 64;
pub const MIN_TRIES: u32 = 2;
pub const MAX_TRIES: u32 = 64;
/// A window is "settled" when the midpoint of its min/max range sits within
/// this many counts of its mean on every axis.
pub const SETTLED_VARIANCE: i32 = 2;

pub enum CaptureStep {
    Sampling,
    /// A 64-sample window just closed; `tries` windows completed so far.
    WindowDone { tries: u32 },
    /// Converged (or gave up): per-axis bias to publish to the estimator.
    Settled([i32; 3]),
}

pub struct BiasCapture {
    vmin: [i32; 3],
    vmax: [i32; 3],
    sum: [i32; 3],
    samples: i32,
    tries: u32,
    best: [i32; 3],
    best_var: Option<i32>,
}

impl BiasCapture {
    pub fn new() -> Self {
        BiasCapture {
            vmin: [0; 3],
            vmax: [0; 3],
            sum: [0; 3],
            samples: 0,
            tries: 0,
            best: [0; 3],
            best_var: None,
        }
    }

    pub fn best_variance(&self) -> Option<i32> {
        self.best_var
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Feeds one three-axis gyro sample, taken roughly every 2 ms.
    pub fn feed(&mut self, sample: [i32; 3]) -> CaptureStep {
        if self.samples == 0 {
            self.vmin = sample;
            self.vmax = sample;
            self.sum = [0; 3];
        }
        for axis in 0..3 {
            self.vmin[axis] = self.vmin[axis].min(sample[axis]);
            self.vmax[axis] = self.vmax[axis].max(sample[axis]);
            self.sum[axis] += sample[axis];
        }
        self.samples += 1;
        if self.samples < SAMPLES_PER_WINDOW {
            return CaptureStep::Sampling;
        }

        // Window complete: how far off-center does the average sit? A truly
        // still gyro lands the mean on the midpoint of its noise band.
        let mut avg = [0; 3];
        let mut max_var = 0;
        for axis in 0..3 {
            avg[axis] = self.sum[axis] / SAMPLES_PER_WINDOW;
            let var = (self.vmax[axis] + self.vmin[axis]) / 2 - avg[axis];
            max_var = max_var.max(var.abs());
        }

        if self.best_var.map_or(true, |best| max_var < best) {
            self.best = avg;
            self.best_var = Some(max_var);
        }

        self.samples = 0;
        self.tries += 1;

        let converged = self.tries >= MIN_TRIES
            && self.best_var.unwrap_or(i32::MAX) <= SETTLED_VARIANCE;
        if converged || self.tries >= MAX_TRIES {
            CaptureStep::Settled(self.best)
        } else {
            CaptureStep::WindowDone { tries: self.tries }
        }
    }
}

impl Default for BiasCapture {
    fn default() -> Self {
        Self::new()
    }
}
