use rand::Rng;

use super::segments::WheelLayout;
use super::{WheelError, MAX_SPINS, MIN_SPINS, POINTER_OFFSET_DEG};

/// The outcome of one draw, fixed before the animation starts. The ticket
/// is sampled uniformly over ticket space; the visual slot and the final
/// rotation are both derived from it, so the segment the wheel lands on is
/// always the participant announced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOutcome {
    pub winner_ticket: usize,
    pub winner_index: usize,
    pub final_rotation: f64,
}

/// Angular width of each of `n` equal segments, in degrees.
pub fn segment_angle(segment_count: usize) -> f64 {
    360.0 / segment_count as f64
}

/// Pre-rotation center of segment `i`: segments are laid out clockwise
/// starting at the pointer position (wheel top, -90 degrees).
pub fn segment_center(segment_count: usize, index: usize) -> f64 {
    POINTER_OFFSET_DEG + (index as f64 + 0.5) * segment_angle(segment_count)
}

/// The rotation, mod 360, that puts segment `index`'s center exactly under
/// the pointer.
pub fn landing_angle(segment_count: usize, index: usize) -> f64 {
    (360.0 - segment_center(segment_count, index).rem_euclid(360.0)).rem_euclid(360.0)
}

/// Which segment's center sits under the pointer at rotation `rotation`.
/// Used as a consistency check against the pre-drawn winner at settle.
pub fn segment_at_pointer(segment_count: usize, rotation: f64) -> usize {
    let step = segment_angle(segment_count);
    let offset = (-POINTER_OFFSET_DEG - rotation.rem_euclid(360.0)).rem_euclid(360.0);
    let index = (offset / step - 0.5).round();
    index.rem_euclid(segment_count as f64) as usize
}

/// Uniformly draws the winning ticket and computes the exact rotation the
/// animation must finish at. One ticket, one unit of probability: the
/// shuffle only decides where on the rim that ticket is displayed.
pub fn draw<R: Rng + ?Sized>(
    layout: &WheelLayout,
    rng: &mut R,
) -> Result<DrawOutcome, WheelError> {
    let total = layout.segment_count();
    if total == 0 {
        return Err(WheelError::NoSegments);
    }
    let winner_ticket = rng.gen_range(0..total);
    let winner_index = layout.ticket_position[winner_ticket];
    let final_rotation = final_rotation_for(total, winner_index, layout.rotation, rng);
    Ok(DrawOutcome { winner_ticket, winner_index, final_rotation })
}

/// Builds the target rotation on top of the unnormalized running total so
/// the wheel never turns backward across repeated draws, while guaranteeing
/// `final mod 360 == landing_angle(n, winner_index)`.
pub fn final_rotation_for<R: Rng + ?Sized>(
    segment_count: usize,
    winner_index: usize,
    current_rotation: f64,
    rng: &mut R,
) -> f64 {
    let spins = rng.gen_range(MIN_SPINS..=MAX_SPINS);
    let increment = (landing_angle(segment_count, winner_index)
        - current_rotation.rem_euclid(360.0))
    .rem_euclid(360.0);
    current_rotation + f64::from(spins) * 360.0 + increment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Participant;
    use crate::wheel::segments::build;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_segment_geometry() {
        // Four segments of 90 degrees each, clockwise from the top.
        assert!((segment_angle(4) - 90.0).abs() < EPS);
        assert!((segment_center(4, 0) - (-45.0)).abs() < EPS);
        assert!((segment_center(4, 2) - 135.0).abs() < EPS);
    }

    #[test]
    fn test_final_rotation_lands_winner_under_pointer() {
        // Spec scenario: n = 4, winner slot 2. Center of segment 2 is 135
        // degrees, so the settled rotation mod 360 must be 225.
        let mut rng = StdRng::seed_from_u64(3);
        for current in [0.0, 17.3, 359.9, 4321.5] {
            let total = final_rotation_for(4, 2, current, &mut rng);
            assert!((total.rem_euclid(360.0) - 225.0).abs() < 1e-6);
            assert!(total >= current + 360.0 * f64::from(MIN_SPINS));
        }
    }

    #[test]
    fn test_settled_angle_reconstructs_the_drawn_slot() {
        let mut rng = StdRng::seed_from_u64(99);
        let rosters: Vec<Vec<Participant>> = vec![
            vec![Participant::new(1, "solo", 1)],
            vec![Participant::new(1, "A", 2), Participant::new(2, "B", 5)],
            vec![
                Participant::new(1, "A", 3),
                Participant::new(2, "B", 4),
                Participant::new(3, "C", 6),
            ],
        ];
        for roster in rosters {
            let layout = build(&roster, &mut rng).unwrap();
            for _ in 0..50 {
                let outcome = draw(&layout, &mut rng).unwrap();
                assert_eq!(
                    segment_at_pointer(layout.segment_count(), outcome.final_rotation),
                    outcome.winner_index
                );
            }
        }
    }

    #[test]
    fn test_draw_refuses_zero_segments() {
        let mut rng = StdRng::seed_from_u64(5);
        let empty = WheelLayout { segments: vec![], ticket_position: vec![], rotation: 0.0 };
        assert_eq!(draw(&empty, &mut rng), Err(WheelError::NoSegments));
    }

    #[test]
    fn test_draw_is_ticket_weighted_over_many_trials() {
        // One ticket for A, three for B: B should win about 75% of draws
        // no matter how the segments happen to be arranged.
        let roster = vec![Participant::new(1, "A", 1), Participant::new(2, "B", 3)];
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 20_000;
        let mut b_wins = 0u32;
        let layout = build(&roster, &mut rng).unwrap();
        for _ in 0..trials {
            let outcome = draw(&layout, &mut rng).unwrap();
            if layout.segments[outcome.winner_index].name == "B" {
                b_wins += 1;
            }
        }
        let rate = f64::from(b_wins) / f64::from(trials);
        assert!((rate - 0.75).abs() < 0.02, "B win rate {} too far from 0.75", rate);
    }

    #[test]
    fn test_ticket_and_slot_agree_on_the_winner() {
        // The logical winner (ticket) and the visual landing (slot) must
        // always name the same participant.
        let roster = vec![Participant::new(1, "A", 2), Participant::new(2, "B", 3)];
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..20 {
            let layout = build(&roster, &mut rng).unwrap();
            for _ in 0..100 {
                let outcome = draw(&layout, &mut rng).unwrap();
                let by_ticket = if outcome.winner_ticket < 2 { "A" } else { "B" };
                assert_eq!(layout.segments[outcome.winner_index].name, by_ticket);
            }
        }
    }
}
