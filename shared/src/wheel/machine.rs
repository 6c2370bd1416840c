use rand::Rng;

use crate::participant::{Participant, Winner};
use super::draw::{self, segment_at_pointer, DrawOutcome};
use super::segments::WheelLayout;
use super::{WheelError, SETTLE_DELAY_MS, SPIN_DURATION_MS};

/// Draw phase of one wheel instance. At most one spin is ever in flight;
/// everything that could disturb it is refused while not `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Spinning,
    Settled,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Spinning => "spinning",
            Self::Settled => "settled",
        }
    }
}

/// Returned synchronously when a spin is accepted, before any animation
/// frame runs. Callers use the acceptance itself as their "draw started"
/// hook to disable concurrent triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub winner_index: usize,
    pub final_rotation: f64,
    pub duration_ms: f64,
}

/// What one display-refresh tick produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Nothing in flight.
    Idle,
    /// Animation advanced; the current rotation in degrees.
    Frame(f64),
    /// The wheel has stopped; the winner announcement is still pending.
    Settling,
    /// The winner, delivered exactly once per accepted spin.
    Winner(Winner),
}

#[derive(Debug, Clone)]
struct ActiveSpin {
    start_rotation: f64,
    outcome: DrawOutcome,
    started_at: f64,
    settle_deadline: Option<f64>,
}

/// The wheel's finite-state machine: exclusive owner of the rotation
/// angle, the segment sequence and the draw phase.
///
/// Time is caller-supplied milliseconds from any monotonic source, so the
/// same machine runs against a real frame driver in the backend and a
/// fixed-step simulated clock in tests. The machine never blocks; each
/// `tick` recomputes progress against the fixed spin duration.
#[derive(Debug)]
pub struct WheelMachine {
    layout: WheelLayout,
    phase: Phase,
    active: Option<ActiveSpin>,
}

impl WheelMachine {
    pub fn new(layout: WheelLayout) -> Self {
        Self { layout, phase: Phase::Idle, active: None }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rotation(&self) -> f64 {
        self.layout.rotation
    }

    pub fn segments(&self) -> &[Participant] {
        &self.layout.segments
    }

    /// Swaps in a freshly built layout. Refused while a spin is in flight
    /// so the wheel never visually snaps mid-animation; callers treat the
    /// refusal as a no-op, not a failure.
    pub fn rebuild(&mut self, layout: WheelLayout) -> Result<(), WheelError> {
        if self.phase != Phase::Idle {
            return Err(WheelError::SpinInProgress);
        }
        self.layout = layout;
        Ok(())
    }

    /// Accepts a spin from `Idle`: draws the winner, fixes the target
    /// rotation and captures the start timestamp. Rejected while another
    /// spin is in flight (no-op, never queued).
    pub fn spin<R: Rng + ?Sized>(
        &mut self,
        now_ms: f64,
        rng: &mut R,
    ) -> Result<SpinPlan, WheelError> {
        if self.phase != Phase::Idle {
            return Err(WheelError::SpinInProgress);
        }
        let outcome = draw::draw(&self.layout, rng)?;
        Ok(self.begin(outcome, now_ms))
    }

    fn begin(&mut self, outcome: DrawOutcome, now_ms: f64) -> SpinPlan {
        self.active = Some(ActiveSpin {
            start_rotation: self.layout.rotation,
            outcome,
            started_at: now_ms,
            settle_deadline: None,
        });
        self.phase = Phase::Spinning;
        SpinPlan {
            winner_index: outcome.winner_index,
            final_rotation: outcome.final_rotation,
            duration_ms: SPIN_DURATION_MS,
        }
    }

    /// Advances the animation by one display-refresh tick.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        match self.phase {
            Phase::Idle => Tick::Idle,
            Phase::Spinning => self.advance(now_ms),
            Phase::Settled => self.try_settle(now_ms),
        }
    }

    fn advance(&mut self, now_ms: f64) -> Tick {
        let Some(active) = self.active.as_mut() else {
            log::error!("wheel is spinning with no active draw; resetting to idle");
            self.phase = Phase::Idle;
            return Tick::Idle;
        };

        let progress = ((now_ms - active.started_at) / SPIN_DURATION_MS).min(1.0);
        if progress < 1.0 {
            self.layout.rotation = active.start_rotation
                + (active.outcome.final_rotation - active.start_rotation) * ease(progress);
            Tick::Frame(self.layout.rotation)
        } else {
            // Write the exact target so float drift from the last
            // interpolation step cannot move the landing segment.
            self.layout.rotation = active.outcome.final_rotation;
            active.settle_deadline = Some(now_ms + SETTLE_DELAY_MS);
            self.phase = Phase::Settled;
            Tick::Settling
        }
    }

    fn try_settle(&mut self, now_ms: f64) -> Tick {
        let deadline = self
            .active
            .as_ref()
            .and_then(|active| active.settle_deadline);
        let Some(deadline) = deadline else {
            log::error!("wheel settled with no deadline; resetting to idle");
            self.phase = Phase::Idle;
            self.active = None;
            return Tick::Idle;
        };
        if now_ms < deadline {
            return Tick::Settling;
        }

        self.phase = Phase::Idle;
        let Some(active) = self.active.take() else {
            return Tick::Idle;
        };

        let index = active.outcome.winner_index;
        let Some(winner) = self.layout.segments.get(index) else {
            log::error!(
                "winner index {} out of range for {} segments; no winner announced",
                index,
                self.layout.segment_count()
            );
            return Tick::Idle;
        };

        // The settled angle must point at the segment that was drawn. A
        // mismatch means the geometry and the draw disagree; announcing
        // either value would be wrong, so the draw is abandoned.
        let landed = segment_at_pointer(self.layout.segment_count(), self.layout.rotation);
        if landed != index {
            log::error!(
                "settled on segment {} but the draw selected {}; no winner announced",
                landed,
                index
            );
            return Tick::Idle;
        }

        Tick::Winner(Winner::from(winner))
    }
}

/// Two-phase easing: a constant-speed ramp for the first 70% of the spin,
/// then a cubic ease-out over the last 30% for the dramatic deceleration.
pub fn ease(progress: f64) -> f64 {
    if progress < 0.7 {
        progress / 0.7
    } else {
        let slow = (progress - 0.7) / 0.3;
        0.7 + 0.3 * (1.0 - (1.0 - slow).powi(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::draw::final_rotation_for;
    use crate::wheel::segments::build;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME_MS: f64 = 16.0;

    fn machine(seed: u64) -> WheelMachine {
        let mut rng = StdRng::seed_from_u64(seed);
        let roster = vec![
            Participant::new(1, "A", 1),
            Participant::new(2, "B", 3),
        ];
        WheelMachine::new(build(&roster, &mut rng).unwrap())
    }

    /// Drives the machine with a fixed-step clock until it returns to
    /// idle, counting winner announcements.
    fn run_to_idle(machine: &mut WheelMachine, start_ms: f64) -> (Vec<Winner>, f64) {
        let mut winners = Vec::new();
        let mut now = start_ms;
        for _ in 0..10_000 {
            now += FRAME_MS;
            match machine.tick(now) {
                Tick::Winner(w) => winners.push(w),
                Tick::Idle => break,
                Tick::Frame(_) | Tick::Settling => {}
            }
            if machine.phase() == Phase::Idle {
                break;
            }
        }
        (winners, now)
    }

    #[test]
    fn test_easing_curve_shape() {
        assert_eq!(ease(0.0), 0.0);
        assert!((ease(0.35) - 0.5).abs() < 1e-12);
        assert!((ease(0.85) - 0.9625).abs() < 1e-12);
        assert_eq!(ease(1.0), 1.0);
    }

    #[test]
    fn test_spin_settles_once_with_exact_final_rotation() {
        let mut machine = machine(5);
        let mut rng = StdRng::seed_from_u64(17);
        let plan = machine.spin(0.0, &mut rng).unwrap();
        assert_eq!(machine.phase(), Phase::Spinning);

        let (winners, _) = run_to_idle(&mut machine, 0.0);
        assert_eq!(winners.len(), 1);
        assert_eq!(machine.phase(), Phase::Idle);
        // Exact, not approximate: the last write is the target itself.
        assert_eq!(machine.rotation(), plan.final_rotation);
        assert_eq!(winners[0], Winner::from(&machine.segments()[plan.winner_index]));
    }

    #[test]
    fn test_winner_waits_for_settle_delay() {
        let mut machine = machine(6);
        let mut rng = StdRng::seed_from_u64(18);
        machine.spin(0.0, &mut rng).unwrap();

        assert_eq!(machine.tick(SPIN_DURATION_MS), Tick::Settling);
        assert_eq!(machine.phase(), Phase::Settled);
        // Still inside the hold: no announcement yet.
        assert_eq!(machine.tick(SPIN_DURATION_MS + SETTLE_DELAY_MS / 2.0), Tick::Settling);
        match machine.tick(SPIN_DURATION_MS + SETTLE_DELAY_MS) {
            Tick::Winner(_) => {}
            other => panic!("expected winner, got {:?}", other),
        }
        assert_eq!(machine.phase(), Phase::Idle);
        // The announcement was one-shot.
        assert_eq!(machine.tick(SPIN_DURATION_MS + SETTLE_DELAY_MS + FRAME_MS), Tick::Idle);
    }

    #[test]
    fn test_concurrent_spin_is_refused() {
        let mut machine = machine(7);
        let mut rng = StdRng::seed_from_u64(19);
        machine.spin(0.0, &mut rng).unwrap();
        assert_eq!(machine.spin(100.0, &mut rng), Err(WheelError::SpinInProgress));
        // Refusal during the settle hold as well.
        machine.tick(SPIN_DURATION_MS);
        assert_eq!(machine.spin(SPIN_DURATION_MS + 1.0, &mut rng), Err(WheelError::SpinInProgress));
    }

    #[test]
    fn test_rebuild_refused_mid_spin() {
        let mut machine = machine(8);
        let mut rng = StdRng::seed_from_u64(20);
        let plan = machine.spin(0.0, &mut rng).unwrap();
        let before: Vec<Participant> = machine.segments().to_vec();

        let fresh = build(&[Participant::new(9, "C", 2)], &mut rng).unwrap();
        assert_eq!(machine.rebuild(fresh), Err(WheelError::SpinInProgress));
        assert_eq!(machine.segments(), &before[..]);

        // The spin still lands on its original target.
        let (winners, _) = run_to_idle(&mut machine, 0.0);
        assert_eq!(winners.len(), 1);
        assert_eq!(machine.rotation(), plan.final_rotation);
    }

    #[test]
    fn test_rebuild_accepted_when_idle() {
        let mut machine = machine(9);
        let mut rng = StdRng::seed_from_u64(21);
        let fresh = build(&[Participant::new(9, "C", 2)], &mut rng).unwrap();
        machine.rebuild(fresh.clone()).unwrap();
        assert_eq!(machine.segments(), &fresh.segments[..]);
    }

    #[test]
    fn test_forced_winner_ticket_reports_that_participant() {
        // Ticket 0 belongs to A (one ticket, listed first). Forcing it
        // must announce A no matter how the shuffle arranged the rim.
        for seed in [1u64, 2, 3, 40, 41] {
            let mut machine = machine(seed);
            let winner_index = machine.layout.ticket_position[0];
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let final_rotation = final_rotation_for(
                machine.segments().len(),
                winner_index,
                machine.rotation(),
                &mut rng,
            );
            machine.begin(
                DrawOutcome { winner_ticket: 0, winner_index, final_rotation },
                0.0,
            );

            let (winners, _) = run_to_idle(&mut machine, 0.0);
            assert_eq!(winners.len(), 1);
            assert_eq!(winners[0].name, "A");
            assert_eq!(winners[0].id, 1);
        }
    }

    #[test]
    fn test_out_of_range_winner_is_fatal_for_the_draw() {
        let mut machine = machine(10);
        machine.begin(
            DrawOutcome { winner_ticket: 99, winner_index: 99, final_rotation: 1234.5 },
            0.0,
        );
        let (winners, _) = run_to_idle(&mut machine, 0.0);
        assert!(winners.is_empty());
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn test_rotation_never_decreases_across_draws() {
        let mut machine = machine(11);
        let mut rng = StdRng::seed_from_u64(30);
        let mut now = 0.0;
        let mut last_settled = machine.rotation();
        for _ in 0..3 {
            machine.spin(now, &mut rng).unwrap();
            let (_, end) = run_to_idle(&mut machine, now);
            assert!(machine.rotation() > last_settled);
            last_settled = machine.rotation();
            now = end + FRAME_MS;
        }
    }
}
