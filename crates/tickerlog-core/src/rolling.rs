//! Windowed average over a daily close series.

use std::collections::VecDeque;

/// Incremental simple moving average.
///
/// `update` yields `None` until the window is full, so the head of a mapped
/// series is explicitly unknown rather than a partial average.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::new(),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        self.buf.push_back(value);
        self.sum += value;
        while self.buf.len() > self.window {
            if let Some(front) = self.buf.pop_front() {
                self.sum -= front;
            }
        }

        if self.buf.len() == self.window {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }
}

/// Rolling mean of `values` with the given window, same length as the input.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut state = RollingMean::new(window);
    values.iter().map(|value| state.update(*value)).collect()
}
