/// Spreads `events` evenly over every `steps` calls to [`FrequencyRegulator::step`]
///
/// I.e. to render 30 frames per 60 ticks, create `FrequencyRegulator::new(30, 60)`
/// and call `step()` once per tick; it returns how many frames to draw on
/// that tick (here alternately 1 and 0).
pub struct FrequencyRegulator {
    events: usize,
    steps: usize,
    current_step: usize,
    events_generated: usize,
}

impl FrequencyRegulator {
    /// `steps` of zero is treated as one
    pub fn new(events: usize, steps: usize) -> Self {
        FrequencyRegulator {
            events,
            steps: steps.max(1),
            current_step: 0,
            events_generated: 0,
        }
    }

    /// Number of events due on this step
    pub fn step(&mut self) -> usize {
        // Events owed by the end of this step, rounded up
        let due = (self.events * (self.current_step + 1)).div_ceil(self.steps);
        let now = due - self.events_generated;
        self.events_generated = due;

        self.current_step += 1;
        if self.current_step == self.steps {
            self.current_step = 0;
            self.events_generated = 0;
        }
        now
    }
}
