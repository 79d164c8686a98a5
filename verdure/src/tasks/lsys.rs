use super::Shared;
use crate::canvas::{Canvas, Delay};
use crate::config::{LsysConfig, PacingConfig, VisualizerConfig};
use crate::entropy::Entropy;
use crate::lsystem::{Expander, LsysError, Plant, RuleSet, Turtle};
use crate::sched::{Step, Task};
use crate::sync::{EpochRole, Handoff, Rendezvous};
use crate::{GENERATION_CAPACITY, TURTLE_STACK_DEPTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LsysState {
    Start,
    Drawing,
    Waiting,
}

/// Draws one L-system plant per epoch, one segment per resume.
///
/// The pacing value is read once at the start of each epoch.  A plant whose
/// string cannot be generated or walked is abandoned (whatever was already
/// drawn stays on screen) and the epoch ends normally.
pub struct LsysTask<'a, C: Canvas + ?Sized, D: Delay, E: Entropy> {
    shared: Shared<'a, C>,
    config: LsysConfig,
    pacing: PacingConfig,
    delay: D,
    entropy: E,
    rendezvous: Rendezvous<'a>,
    expander: Expander<GENERATION_CAPACITY>,
    turtle: Turtle<TURTLE_STACK_DEPTH>,
    plant: Plant,
    cursor: usize,
    segment_ms: u32,
    state: LsysState,
    epochs: u32,
    epoch_limit: Option<u32>,
}

impl<'a, C: Canvas + ?Sized, D: Delay, E: Entropy> LsysTask<'a, C, D, E> {
    /// Constructor.  The first epoch draws [Plant::initial].
    pub fn new(
        shared: Shared<'a, C>,
        config: &VisualizerConfig,
        delay: D,
        entropy: E,
        role: EpochRole,
    ) -> Self {
        let plant = Plant::initial();
        Self {
            shared,
            config: config.lsys,
            pacing: config.pacing,
            delay,
            entropy,
            rendezvous: Rendezvous::new(shared.flags, role),
            expander: Expander::new(),
            turtle: Turtle::new(plant.geometry(&config.lsys)),
            plant,
            cursor: 0,
            segment_ms: 0,
            state: LsysState::Start,
            epochs: 0,
            epoch_limit: None,
        }
    }
    /// Finish after `epochs` complete epochs instead of running forever
    pub fn with_epoch_limit(mut self, epochs: u32) -> Self {
        self.epoch_limit = Some(epochs);
        self
    }
    /// Number of completed epochs
    pub fn epochs(&self) -> u32 {
        self.epochs
    }
    /// The plant being drawn (or about to be)
    pub fn plant(&self) -> &Plant {
        &self.plant
    }
    fn start_epoch(&mut self) -> Result<(), LsysError> {
        let hz = self.shared.frequency.read();
        self.segment_ms = self.pacing.segment_delay_ms(hz);
        let preset = self.plant.preset;
        let rules = RuleSet::from_rules(preset.rules())?;
        let len = self
            .expander
            .generate(preset.axiom(), &rules, preset.iterations())?
            .len();
        self.turtle.reset(self.plant.geometry(&self.config));
        self.cursor = 0;
        log::debug!(
            "L-system epoch {}: {} ({} symbols), {}ms per segment at {}Hz",
            self.epochs,
            preset.to_str(),
            len,
            self.segment_ms,
            hz
        );
        Ok(())
    }
    /// Walk symbols up to and including the next `F`.  Returns false once the
    /// string is exhausted.
    fn draw_next(&mut self) -> Result<bool, LsysError> {
        let symbols = self.expander.current();
        while let Some(symbol) = symbols.get(self.cursor) {
            self.cursor += 1;
            if let Some(s) = self.turtle.apply(*symbol)? {
                let color = self.plant.color;
                self.shared.canvas.draw_line(s.x0, s.y0, s.x1, s.y1, color);
                self.delay.delay_ms(self.segment_ms);
                return Ok(true);
            }
        }
        self.turtle.finish()?;
        Ok(false)
    }
    fn end_epoch(&mut self) {
        self.rendezvous.finish();
        self.state = LsysState::Waiting;
    }
    fn next_epoch(&mut self) {
        self.epochs += 1;
        self.plant = Plant::randomize(&self.config, &mut self.entropy);
        log::info!(
            "Next plant: {} (step {}, turns {}/{}, {})",
            self.plant.preset.to_str(),
            self.plant.step,
            self.plant.left_deg,
            self.plant.right_deg,
            self.plant.color.to_str()
        );
        self.state = LsysState::Start;
    }
}

impl<C: Canvas + ?Sized, D: Delay, E: Entropy> Task for LsysTask<'_, C, D, E> {
    fn name(&self) -> &'static str {
        "lsystem"
    }
    fn resume(&mut self) -> Step {
        match self.state {
            LsysState::Start => {
                if self.epoch_limit.is_some_and(|limit| self.epochs >= limit) {
                    return Step::Finished;
                }
                match self.start_epoch() {
                    Ok(()) => self.state = LsysState::Drawing,
                    Err(e) => {
                        log::warn!("Skipping {}: {}", self.plant.preset.to_str(), e);
                        self.end_epoch();
                    }
                }
            }
            LsysState::Drawing => match self.draw_next() {
                Ok(true) => {}
                Ok(false) => self.end_epoch(),
                Err(e) => {
                    log::warn!("Abandoning {}: {}", self.plant.preset.to_str(), e);
                    self.end_epoch();
                }
            },
            LsysState::Waiting => match self.rendezvous.poll() {
                Handoff::Pending => {}
                Handoff::ClearCanvas => {
                    self.delay.delay_ms(self.pacing.clear_pause_ms);
                    self.shared.canvas.clear();
                    self.rendezvous.cleared();
                    self.next_epoch();
                }
                Handoff::Released => self.next_epoch(),
            },
        }
        Step::Yielded
    }
}
