use super::Shared;
use crate::canvas::{Canvas, Delay};
use crate::config::{FernConfig, PacingConfig, VisualizerConfig};
use crate::entropy::Entropy;
use crate::fern::{FernError, FernGenerator, LayerPlan, TreePlan};
use crate::sched::{Step, Task};
use crate::sync::{EpochRole, Handoff, Rendezvous};
use crate::POINTS_PER_TREE;

enum FernState {
    Start,
    Plant(u8),
    Layers {
        index: u8,
        tree: TreePlan,
        layers: LayerPlan,
    },
    Waiting,
}

/// Draws a row of fern trees per epoch, one layer of leaves per resume
pub struct FernTask<'a, C: Canvas + ?Sized, D: Delay, E: Entropy, const N: usize = POINTS_PER_TREE> {
    shared: Shared<'a, C>,
    config: FernConfig,
    pacing: PacingConfig,
    delay: D,
    entropy: E,
    rendezvous: Rendezvous<'a>,
    generator: FernGenerator<N>,
    state: FernState,
    layer_ms: u32,
    epochs: u32,
    epoch_limit: Option<u32>,
}

impl<'a, C: Canvas + ?Sized, D: Delay, E: Entropy, const N: usize> FernTask<'a, C, D, E, N> {
    /// Constructor.  Fails if the map thresholds are invalid.
    pub fn new(
        shared: Shared<'a, C>,
        config: &VisualizerConfig,
        delay: D,
        entropy: E,
        role: EpochRole,
    ) -> Result<Self, FernError> {
        Ok(Self {
            shared,
            config: config.fern,
            pacing: config.pacing,
            delay,
            entropy,
            rendezvous: Rendezvous::new(shared.flags, role),
            generator: FernGenerator::new(&config.fern)?,
            state: FernState::Start,
            layer_ms: 0,
            epochs: 0,
            epoch_limit: None,
        })
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
    /// The pacing delay
    pub fn delay(&self) -> &D {
        &self.delay
    }
    fn next_epoch(&mut self) -> FernState {
        self.epochs += 1;
        FernState::Start
    }
    /// Do one step of work from `state`, returning the next state, or `None`
    /// once the epoch limit is reached
    fn advance(&mut self, state: FernState) -> Option<FernState> {
        Some(match state {
            FernState::Start => {
                if self.epoch_limit.is_some_and(|limit| self.epochs >= limit) {
                    return None;
                }
                let hz = self.shared.frequency.read();
                self.layer_ms = match self.config.fixed_layer_ms {
                    Some(ms) => ms,
                    None => self.pacing.layer_delay_ms(hz),
                };
                log::debug!(
                    "Fern epoch {}: {}ms per layer at {}Hz",
                    self.epochs,
                    self.layer_ms,
                    hz
                );
                FernState::Plant(0)
            }
            FernState::Plant(index) if index >= self.config.tree_count => {
                self.rendezvous.finish();
                FernState::Waiting
            }
            FernState::Plant(index) => {
                let x = self.config.tree_x(index);
                let tree = self.generator.plant_tree(&self.config, x, &mut self.entropy);
                FernState::Layers {
                    index,
                    tree,
                    layers: LayerPlan::new(&self.config, &tree),
                }
            }
            FernState::Layers {
                index,
                tree,
                mut layers,
            } => match layers.next() {
                Some(layer) => {
                    self.generator.draw_layer(
                        self.shared.canvas,
                        &mut self.delay,
                        &layer,
                        tree.x,
                        self.config.color,
                        self.pacing.pixel_us,
                    );
                    self.delay.delay_ms(self.layer_ms);
                    FernState::Layers {
                        index,
                        tree,
                        layers,
                    }
                }
                None => FernState::Plant(index + 1),
            },
            FernState::Waiting => match self.rendezvous.poll() {
                Handoff::Pending => FernState::Waiting,
                Handoff::ClearCanvas => {
                    self.delay.delay_ms(self.pacing.clear_pause_ms);
                    self.shared.canvas.clear();
                    self.rendezvous.cleared();
                    self.next_epoch()
                }
                Handoff::Released => self.next_epoch(),
            },
        })
    }
}

impl<C: Canvas + ?Sized, D: Delay, E: Entropy, const N: usize> Task for FernTask<'_, C, D, E, N> {
    fn name(&self) -> &'static str {
        "fern"
    }
    fn resume(&mut self) -> Step {
        let state = core::mem::replace(&mut self.state, FernState::Start);
        match self.advance(state) {
            Some(next) => {
                self.state = next;
                Step::Yielded
            }
            None => Step::Finished,
        }
    }
}
