//! Simulated build progress.
//!
//! Progress is purely visual: it advances by `100 / steps / 10` per tick, so
//! each step takes ten ticks, and always ends at exactly 100.

/// Step labels shown while the agent is being built.
pub const DEFAULT_BUILD_STEPS: [&str; 5] = [
    "Finalizing architecture...",
    "Setting up integrations...",
    "Generating agent logic...",
    "Configuring workflows...",
    "Finalizing deployment...",
];

/// Number of ticks spent on each step.
pub const TICKS_PER_STEP: f64 = 10.0;

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Progress advanced to the given value.
    Advanced(f64),
    /// Progress reached 100 on this tick.
    Completed,
    /// Progress had already completed; nothing changed.
    Idle,
}

/// Progress value over a fixed number of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressModel {
    progress: f64,
    step_count: usize,
    completed: bool,
}

impl ProgressModel {
    /// Create a model at zero. A step count of zero is treated as one.
    pub fn new(step_count: usize) -> Self {
        Self {
            progress: 0.0,
            step_count: step_count.max(1),
            completed: false,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Amount added per tick.
    pub fn increment(&self) -> f64 {
        100.0 / self.step_count as f64 / TICKS_PER_STEP
    }

    /// Index of the step currently being shown.
    pub fn step_index(&self) -> usize {
        let index = (self.progress / 100.0 * self.step_count as f64).floor() as usize;
        index.min(self.step_count - 1)
    }

    /// Advance by one increment, clamping at 100.
    pub fn tick(&mut self) -> Tick {
        if self.completed {
            return Tick::Idle;
        }

        let next = self.progress + self.increment();
        if next >= 100.0 {
            self.progress = 100.0;
            self.completed = true;
            Tick::Completed
        } else {
            self.progress = next;
            Tick::Advanced(next)
        }
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.completed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(model: &mut ProgressModel) -> (usize, usize) {
        let mut ticks = 0;
        let mut completions = 0;
        for _ in 0..100_000 {
            match model.tick() {
                Tick::Advanced(_) => ticks += 1,
                Tick::Completed => {
                    ticks += 1;
                    completions += 1;
                }
                Tick::Idle => break,
            }
        }
        (ticks, completions)
    }

    #[test]
    fn test_completes_at_exactly_100_for_any_step_count() {
        for steps in [1, 2, 3, 5, 7, 11, 64] {
            let mut model = ProgressModel::new(steps);
            let (ticks, completions) = run_to_completion(&mut model);

            assert_eq!(model.progress(), 100.0, "steps = {}", steps);
            assert_eq!(completions, 1, "steps = {}", steps);
            assert!(ticks >= steps * 10 && ticks <= steps * 10 + 1);
        }
    }

    #[test]
    fn test_five_steps_take_fifty_ticks() {
        let mut model = ProgressModel::new(DEFAULT_BUILD_STEPS.len());
        assert_eq!(model.increment(), 2.0);
        let (ticks, _) = run_to_completion(&mut model);
        assert_eq!(ticks, 50);
    }

    #[test]
    fn test_step_index() {
        let mut model = ProgressModel::new(5);
        assert_eq!(model.step_index(), 0);
        for _ in 0..10 {
            model.tick();
        }
        assert_eq!(model.step_index(), 1);
        run_to_completion(&mut model);
        assert_eq!(model.step_index(), 4);
    }

    #[test]
    fn test_reset() {
        let mut model = ProgressModel::new(2);
        run_to_completion(&mut model);
        model.reset();
        assert_eq!(model.progress(), 0.0);
        assert!(!model.is_complete());
        assert!(matches!(model.tick(), Tick::Advanced(_)));
    }

    #[test]
    fn test_zero_steps() {
        let model = ProgressModel::new(0);
        assert_eq!(model.step_count(), 1);
        assert_eq!(model.increment(), 10.0);
    }
}
