//! State shared between the two execution contexts.
//!
//! Only two things cross contexts: the most recent dominant frequency, and a
//! pair of completion flags that keep the renderers in step from one epoch
//! to the next.  Each flag has exactly one writer.  Stores use `Release` and
//! loads use `Acquire`, so everything a renderer drew before raising its
//! flag is visible to the context that observes it.
//!
//! One epoch of the [Rendezvous] handshake, with the L-system renderer
//! leading (it owns the clear) and the fern renderer following:
//!
//! ```text
//! leader:   draw ... wait fern=1, set lsys=1, wait fern=0, clear, set lsys=0
//! follower: draw ... set fern=1, wait lsys=1, set fern=0, wait lsys=0
//! ```
//!
//! The follower cannot start drawing the next epoch until `lsys` drops,
//! which only happens after the clear, and the leader cannot clear until it
//! has seen `fern` raised, which only happens after the follower's last
//! draw.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// The dominant frequency, published by the spectral task and read by both
/// renderers
pub struct PublishedFrequency {
    bits: AtomicU32,
}

impl PublishedFrequency {
    /// Starts out at 0Hz
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }
    /// Replace the published value
    pub fn publish(&self, hz: f32) {
        self.bits.store(hz.to_bits(), Ordering::Release);
    }
    /// The most recently published value
    pub fn read(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for PublishedFrequency {
    fn default() -> Self {
        Self::new()
    }
}

/// The two completion flags
pub struct EpochFlags {
    lsys_done: AtomicBool,
    fern_done: AtomicBool,
}

impl EpochFlags {
    /// Both renderers start out drawing
    pub const fn new() -> Self {
        Self {
            lsys_done: AtomicBool::new(false),
            fern_done: AtomicBool::new(false),
        }
    }
    /// The L-system renderer's flag
    pub fn lsys_done(&self) -> bool {
        self.lsys_done.load(Ordering::Acquire)
    }
    /// The fern renderer's flag
    pub fn fern_done(&self) -> bool {
        self.fern_done.load(Ordering::Acquire)
    }
}

impl Default for EpochFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// How a renderer takes part in the end-of-epoch handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpochRole {
    /// Waits for the partner, then clears the canvas.  Writes `lsys_done`.
    Leader,
    /// Waits for the leader to clear.  Writes `fern_done`.
    Follower,
    /// No partner: clears the canvas itself as soon as it finishes
    Solo,
}

/// What a renderer should do next at the end of an epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// Keep waiting on the partner; yield and poll again
    Pending,
    /// Everyone is done drawing.  Pause, clear the canvas, then call
    /// [Rendezvous::cleared].
    ClearCanvas,
    /// The canvas has been cleared by the partner; start the next epoch
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Drawing,
    AwaitPartnerDone,
    AwaitPartnerReset,
    Clearing,
}

/// One renderer's side of the handshake
pub struct Rendezvous<'a> {
    flags: &'a EpochFlags,
    role: EpochRole,
    phase: Phase,
}

impl<'a> Rendezvous<'a> {
    /// Constructor
    pub const fn new(flags: &'a EpochFlags, role: EpochRole) -> Self {
        Self {
            flags,
            role,
            phase: Phase::Drawing,
        }
    }
    /// This side's role
    pub const fn role(&self) -> EpochRole {
        self.role
    }
    /// True between [Rendezvous::finish] and the start of the next epoch
    pub fn is_waiting(&self) -> bool {
        self.phase != Phase::Drawing
    }
    /// Call once all of this epoch's drawing is done
    pub fn finish(&mut self) {
        self.phase = match self.role {
            EpochRole::Leader => Phase::AwaitPartnerDone,
            EpochRole::Follower => {
                self.flags.fern_done.store(true, Ordering::Release);
                Phase::AwaitPartnerDone
            }
            EpochRole::Solo => Phase::Clearing,
        };
    }
    /// Advance the handshake as far as it can go without blocking
    pub fn poll(&mut self) -> Handoff {
        let flags = self.flags;
        match (self.role, self.phase) {
            (_, Phase::Drawing) => Handoff::Released,
            (_, Phase::Clearing) => Handoff::ClearCanvas,
            (EpochRole::Leader, Phase::AwaitPartnerDone) => {
                if flags.fern_done() {
                    flags.lsys_done.store(true, Ordering::Release);
                    self.phase = Phase::AwaitPartnerReset;
                    self.poll()
                } else {
                    Handoff::Pending
                }
            }
            (EpochRole::Leader, Phase::AwaitPartnerReset) => {
                if flags.fern_done() {
                    Handoff::Pending
                } else {
                    self.phase = Phase::Clearing;
                    Handoff::ClearCanvas
                }
            }
            (EpochRole::Follower, Phase::AwaitPartnerDone) => {
                if flags.lsys_done() {
                    flags.fern_done.store(false, Ordering::Release);
                    self.phase = Phase::AwaitPartnerReset;
                    self.poll()
                } else {
                    Handoff::Pending
                }
            }
            (EpochRole::Follower, Phase::AwaitPartnerReset) => {
                if flags.lsys_done() {
                    Handoff::Pending
                } else {
                    self.phase = Phase::Drawing;
                    Handoff::Released
                }
            }
            (EpochRole::Solo, _) => Handoff::ClearCanvas,
        }
    }
    /// Call after clearing the canvas in response to
    /// [Handoff::ClearCanvas].  Releases the partner, if any.
    pub fn cleared(&mut self) {
        if self.role == EpochRole::Leader {
            self.flags.lsys_done.store(false, Ordering::Release);
        }
        self.phase = Phase::Drawing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oorandom::Rand32;
    use std::vec::Vec;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Event {
        Draw(EpochRole, u32),
        Finish(EpochRole, u32),
        Clear(u32),
    }

    /// A renderer reduced to its handshake: a random number of draws per
    /// epoch, then the rendezvous
    struct Actor<'a> {
        rendezvous: Rendezvous<'a>,
        epoch: u32,
        draws_left: u32,
    }

    impl Actor<'_> {
        fn step(&mut self, rng: &mut Rand32, log: &mut Vec<Event>) {
            let role = self.rendezvous.role();
            if !self.rendezvous.is_waiting() {
                if self.draws_left > 0 {
                    self.draws_left -= 1;
                    log.push(Event::Draw(role, self.epoch));
                } else {
                    self.rendezvous.finish();
                    log.push(Event::Finish(role, self.epoch));
                }
                return;
            }
            match self.rendezvous.poll() {
                Handoff::Pending => {}
                Handoff::ClearCanvas => {
                    log.push(Event::Clear(self.epoch));
                    self.rendezvous.cleared();
                    self.next_epoch(rng);
                }
                Handoff::Released => self.next_epoch(rng),
            }
        }
        fn next_epoch(&mut self, rng: &mut Rand32) {
            self.epoch += 1;
            self.draws_left = rng.rand_range(0..6);
        }
    }

    fn check_log(log: &[Event], roles: &[EpochRole]) -> u32 {
        let mut finished: Vec<(EpochRole, u32)> = Vec::new();
        let mut clears = 0;
        for event in log {
            match *event {
                Event::Draw(role, epoch) => {
                    // nothing from a later epoch is drawn before the clear
                    assert_eq!(epoch, clears, "{:?} drew before the clear", role);
                    assert!(!finished.contains(&(role, epoch)));
                }
                Event::Finish(role, epoch) => finished.push((role, epoch)),
                Event::Clear(epoch) => {
                    assert_eq!(epoch, clears);
                    for role in roles {
                        assert!(
                            finished.contains(&(*role, epoch)),
                            "cleared before {:?} finished epoch {}",
                            role,
                            epoch
                        );
                    }
                    clears += 1;
                }
            }
        }
        clears
    }

    #[test]
    fn random_interleavings_never_clear_early() {
        for seed in 0..200u64 {
            let flags = EpochFlags::new();
            let mut rng = Rand32::new(seed);
            let mut actors = [
                Actor {
                    rendezvous: Rendezvous::new(&flags, EpochRole::Leader),
                    epoch: 0,
                    draws_left: rng.rand_range(0..6),
                },
                Actor {
                    rendezvous: Rendezvous::new(&flags, EpochRole::Follower),
                    epoch: 0,
                    draws_left: rng.rand_range(0..6),
                },
            ];
            let mut log = Vec::new();
            for _ in 0..2000 {
                let which = rng.rand_range(0..2) as usize;
                actors[which].step(&mut rng, &mut log);
            }
            let clears = check_log(&log, &[EpochRole::Leader, EpochRole::Follower]);
            assert!(clears > 10, "seed {} only made {} epochs", seed, clears);
        }
    }
    #[test]
    fn follower_waits_for_the_clear() {
        let flags = EpochFlags::new();
        let mut leader = Rendezvous::new(&flags, EpochRole::Leader);
        let mut follower = Rendezvous::new(&flags, EpochRole::Follower);
        follower.finish();
        assert!(flags.fern_done());
        assert_eq!(follower.poll(), Handoff::Pending);
        leader.finish();
        // follower lowers its flag as soon as it sees the leader's
        assert_eq!(leader.poll(), Handoff::Pending);
        assert_eq!(follower.poll(), Handoff::Pending);
        assert!(!flags.fern_done());
        assert_eq!(leader.poll(), Handoff::ClearCanvas);
        assert_eq!(leader.poll(), Handoff::ClearCanvas);
        assert_eq!(follower.poll(), Handoff::Pending);
        leader.cleared();
        assert_eq!(follower.poll(), Handoff::Released);
        assert!(!flags.lsys_done());
        assert!(!leader.is_waiting());
        assert!(!follower.is_waiting());
    }
    #[test]
    fn solo_clears_immediately() {
        let flags = EpochFlags::new();
        let mut solo = Rendezvous::new(&flags, EpochRole::Solo);
        assert_eq!(solo.poll(), Handoff::Released);
        solo.finish();
        assert_eq!(solo.poll(), Handoff::ClearCanvas);
        solo.cleared();
        assert!(!solo.is_waiting());
        assert!(!flags.lsys_done() && !flags.fern_done());
    }
    #[test]
    fn threads_stay_in_step() {
        use core::sync::atomic::AtomicU32;
        const EPOCHS: u32 = 50;
        let flags = EpochFlags::new();
        let clears = AtomicU32::new(0);
        let run = |role: EpochRole| {
            let mut rendezvous = Rendezvous::new(&flags, role);
            for epoch in 0..EPOCHS {
                // the canvas must have been cleared once per finished epoch
                assert_eq!(clears.load(Ordering::Acquire), epoch);
                rendezvous.finish();
                loop {
                    match rendezvous.poll() {
                        Handoff::Pending => std::thread::yield_now(),
                        Handoff::ClearCanvas => {
                            clears.fetch_add(1, Ordering::AcqRel);
                            rendezvous.cleared();
                            break;
                        }
                        Handoff::Released => break,
                    }
                }
            }
        };
        std::thread::scope(|s| {
            s.spawn(|| run(EpochRole::Leader));
            s.spawn(|| run(EpochRole::Follower));
        });
        assert_eq!(clears.load(Ordering::Acquire), EPOCHS);
    }
    #[test]
    fn frequency_round_trips_through_bits() {
        let published = PublishedFrequency::new();
        assert_eq!(published.read(), 0.0);
        published.publish(400.390625);
        assert_eq!(published.read(), 400.390625);
    }
}
