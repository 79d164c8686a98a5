//! The three long-running tasks, and the state they share.
//!
//! The combined program runs the [LsysTask] on one context, and the
//! [FernTask] plus the [SpectralTask] on the other.  The L-system renderer
//! leads the end-of-epoch handshake, so it owns the pause and the canvas
//! clear.  The fern-only program runs the [FernTask] as
//! [EpochRole::Solo](crate::sync::EpochRole::Solo) next to the spectral task
//! and clears the canvas itself.

use crate::canvas::Canvas;
use crate::sync::{EpochFlags, PublishedFrequency};

mod fern;
mod lsys;
mod spectral;

pub use fern::FernTask;
pub use lsys::LsysTask;
pub use spectral::SpectralTask;

/// References to everything the tasks share across contexts
pub struct Shared<'a, C: Canvas + ?Sized> {
    /// The frame buffer
    pub canvas: &'a C,
    /// The dominant frequency
    pub frequency: &'a PublishedFrequency,
    /// The completion flags
    pub flags: &'a EpochFlags,
}

impl<'a, C: Canvas + ?Sized> Shared<'a, C> {
    /// Constructor
    pub const fn new(
        canvas: &'a C,
        frequency: &'a PublishedFrequency,
        flags: &'a EpochFlags,
    ) -> Self {
        Self {
            canvas,
            frequency,
            flags,
        }
    }
}

impl<C: Canvas + ?Sized> Clone for Shared<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Canvas + ?Sized> Copy for Shared<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::testing::{CountingDelay, RecordingCanvas};
    use crate::canvas::NoDelay;
    use crate::config::VisualizerConfig;
    use crate::sched::{Scheduler, Task};
    use crate::sync::EpochRole;
    use crate::transport::{SampleSource, TransportFault};
    use crate::NUM_SAMPLES;
    use oorandom::Rand32;
    use std::boxed::Box;

    /// Delivers `len` samples of a tone at bin 41 every other poll, after
    /// `faults` faulty blocks
    struct ToneBlocks {
        block: std::vec::Vec<u8>,
        faults: u32,
        len: usize,
        polled: bool,
        rearms: u32,
    }

    impl ToneBlocks {
        fn new(faults: u32) -> Self {
            let mut block = std::vec![128u8; NUM_SAMPLES + 16];
            for (i, smp) in block.iter_mut().take(NUM_SAMPLES).enumerate() {
                let phase = core::f64::consts::TAU * (41 * i) as f64 / NUM_SAMPLES as f64;
                *smp = (128.0 + 100.0 * phase.sin()).round() as u8;
            }
            Self {
                block,
                faults,
                len: NUM_SAMPLES,
                polled: false,
                rearms: 0,
            }
        }
    }

    impl SampleSource for ToneBlocks {
        fn poll_block(&mut self) -> Result<Option<&[u8]>, TransportFault> {
            if !self.polled {
                self.polled = true;
                return Ok(None);
            }
            if self.faults > 0 {
                return Err(TransportFault::Overrun);
            }
            Ok(Some(&self.block[..self.len]))
        }
        fn rearm(&mut self) {
            self.polled = false;
            self.faults = self.faults.saturating_sub(1);
            self.rearms += 1;
        }
    }

    #[test]
    fn spectral_task_skips_faulty_blocks() {
        let canvas = RecordingCanvas::new(640, 480);
        let frequency = PublishedFrequency::new();
        let flags = EpochFlags::new();
        let shared = Shared::new(&canvas, &frequency, &flags);
        let config = VisualizerConfig::new();
        let mut task = Box::new(SpectralTask::<_, _, NUM_SAMPLES>::new(
            ToneBlocks::new(2),
            shared,
            &config.spectral,
        ));
        for _ in 0..4 {
            task.resume();
        }
        assert_eq!(task.skipped(), 2);
        assert_eq!(task.analyzed(), 0);
        assert_eq!(frequency.read(), 0.0);
        for _ in 0..2 {
            task.resume();
        }
        assert_eq!(task.analyzed(), 1);
        assert_eq!(task.source().rearms, 3);
        assert_eq!(task.last_peak().map(|p| p.bin), Some(41));
        assert_eq!(frequency.read(), 400.390625);
        // the overlay box was cleared
        assert!(*canvas.writes.borrow() >= 176 * 30);
    }
    #[test]
    fn spectral_task_rejects_wrong_sized_blocks() {
        for len in [100, NUM_SAMPLES - 1, NUM_SAMPLES + 1, NUM_SAMPLES + 16] {
            let canvas = RecordingCanvas::new(64, 64);
            let frequency = PublishedFrequency::new();
            let flags = EpochFlags::new();
            let mut source = ToneBlocks::new(0);
            source.len = len;
            let config = VisualizerConfig::new();
            let shared = Shared::new(&canvas, &frequency, &flags);
            let mut task = Box::new(SpectralTask::<_, _, NUM_SAMPLES>::new(
                source,
                shared,
                &config.spectral,
            ));
            for _ in 0..6 {
                task.resume();
            }
            assert_eq!(task.skipped(), 3);
            assert_eq!(task.analyzed(), 0);
            assert_eq!(task.source().rearms, 3);
            assert_eq!(frequency.read(), 0.0);
        }
    }
    #[test]
    fn combined_program_runs_whole_epochs() {
        let canvas = RecordingCanvas::new(640, 480);
        let frequency = PublishedFrequency::new();
        let flags = EpochFlags::new();
        let shared = Shared::new(&canvas, &frequency, &flags);
        let config = VisualizerConfig::new();
        let mut lsys = Box::new(
            LsysTask::new(shared, &config, CountingDelay::default(), Rand32::new(1), EpochRole::Leader)
                .with_epoch_limit(2),
        );
        let mut fern = Box::new(
            FernTask::<_, _, _, 64>::new(shared, &config, NoDelay, Rand32::new(2), EpochRole::Follower)
                .unwrap()
                .with_epoch_limit(2),
        );
        let mut spectral = Box::new(SpectralTask::<_, _, NUM_SAMPLES>::new(
            ToneBlocks::new(0),
            shared,
            &config.spectral,
        ));
        {
            let mut sched = Scheduler::<'_, 3>::new();
            sched.add(lsys.as_mut()).unwrap();
            sched.add(fern.as_mut()).unwrap();
            sched.add_background(spectral.as_mut()).unwrap();
            let rounds = sched.run_rounds(1_000_000);
            assert!(rounds < 1_000_000);
        }
        assert_eq!(lsys.epochs(), 2);
        assert_eq!(fern.epochs(), 2);
        assert_eq!(*canvas.clears.borrow(), 2);
        assert!(!canvas.lines.borrow().is_empty());
        assert!(spectral.analyzed() > 0);
        assert_eq!(frequency.read(), 400.390625);
        assert!(!flags.lsys_done() && !flags.fern_done());
    }
    #[test]
    fn fern_only_program_clears_its_own_canvas() {
        let canvas = RecordingCanvas::new(640, 480);
        let frequency = PublishedFrequency::new();
        let flags = EpochFlags::new();
        let shared = Shared::new(&canvas, &frequency, &flags);
        let config = VisualizerConfig::fern_only();
        let mut fern = Box::new(
            FernTask::<_, _, _, 64>::new(shared, &config, NoDelay, Rand32::new(7), EpochRole::Solo)
                .unwrap()
                .with_epoch_limit(2),
        );
        {
            let mut sched = Scheduler::<'_, 1>::new();
            sched.add(fern.as_mut()).unwrap();
            sched.run_rounds(100_000);
        }
        assert_eq!(fern.epochs(), 2);
        assert_eq!(*canvas.clears.borrow(), 2);
        // two epochs of three trees, twenty layers, and two leaves of 64 points
        assert_eq!(*canvas.writes.borrow(), 2 * 3 * 20 * 2 * 64);
        assert!(!flags.lsys_done() && !flags.fern_done());
    }
    #[test]
    fn fern_only_program_paces_layers_steadily() {
        let canvas = RecordingCanvas::new(640, 480);
        let frequency = PublishedFrequency::new();
        // the table would ask for 200ms per layer at 50Hz
        frequency.publish(50.0);
        let flags = EpochFlags::new();
        let shared = Shared::new(&canvas, &frequency, &flags);
        for (config, layer_ms) in [
            (VisualizerConfig::fern_only(), 80),
            (VisualizerConfig::new(), 200),
        ] {
            let mut fern = Box::new(
                FernTask::<_, _, _, 64>::new(
                    shared,
                    &config,
                    CountingDelay::default(),
                    Rand32::new(11),
                    EpochRole::Solo,
                )
                .unwrap()
                .with_epoch_limit(1),
            );
            {
                let mut sched = Scheduler::<'_, 1>::new();
                sched.add(fern.as_mut()).unwrap();
                sched.run_rounds(100_000);
            }
            let trees = config.fern.tree_count as u64;
            let layers = config.fern.max_layers as u64;
            let pause = config.pacing.clear_pause_ms as u64;
            assert_eq!(fern.delay().ms, trees * layers * layer_ms + pause);
            assert_eq!(fern.delay().us, trees * layers * 64 * 10);
        }
    }
}
