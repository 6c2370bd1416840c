use rand::Rng;

use crate::participant::Participant;
use super::WheelError;

/// The expanded, shuffled segment sequence for one draw, plus the starting
/// rotation it is displayed at. Rebuilt whenever the participant list
/// changes or on an explicit re-randomize request.
///
/// Tickets are numbered in expansion order (participants in input order,
/// `tickets` consecutive copies each); `ticket_position` maps a ticket
/// number to the visual slot the shuffle put it in. The draw samples over
/// ticket numbers, so shuffle order can never influence who wins.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelLayout {
    pub segments: Vec<Participant>,
    pub ticket_position: Vec<usize>,
    pub rotation: f64,
}

impl WheelLayout {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Expands each participant into `tickets` segments, shuffles the full
/// sequence and picks a fresh starting rotation in `[0, 360)`.
pub fn build<R: Rng + ?Sized>(
    participants: &[Participant],
    rng: &mut R,
) -> Result<WheelLayout, WheelError> {
    let expanded: Vec<Participant> = participants
        .iter()
        .flat_map(|p| std::iter::repeat(p.clone()).take(p.tickets as usize))
        .collect();

    if expanded.is_empty() {
        return Err(WheelError::NoSegments);
    }

    // Shuffle ticket numbers rather than the copies themselves, so the
    // layout remembers where every ticket ended up.
    let mut order: Vec<usize> = (0..expanded.len()).collect();
    shuffle(&mut order, rng);

    let mut ticket_position = vec![0usize; expanded.len()];
    for (slot, &ticket) in order.iter().enumerate() {
        ticket_position[ticket] = slot;
    }
    let segments = order.iter().map(|&ticket| expanded[ticket].clone()).collect();
    let rotation = rng.gen::<f64>() * 360.0;

    Ok(WheelLayout { segments, ticket_position, rotation })
}

/// Fisher-Yates over the full sequence: every permutation equally likely.
fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
