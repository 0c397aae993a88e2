//! Pure queue-navigation rules shared by manual skips and end-of-track handling

use rand::Rng;

use super::types::RepeatMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What the player should do when the current track finishes on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndOfTrack {
    /// Seek back to zero and keep playing the same queue position.
    RestartCurrent,
    /// Move to the next queue position and keep playing.
    Advance,
    /// Stop playing; the queue position stays where it is.
    Finish,
}

/// Pick the next queue index for a manual skip. Returns `None` when the
/// queue is empty. With shuffle on, every position is equally likely and
/// the current index may repeat.
pub fn next_index<R: Rng>(
    len: usize,
    current: usize,
    shuffle: bool,
    direction: Direction,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if shuffle {
        return Some(rng.gen_range(0..len));
    }
    Some(match direction {
        Direction::Forward => (current + 1) % len,
        Direction::Backward => {
            if current == 0 {
                len - 1
            } else {
                current - 1
            }
        }
    })
}

/// Decide how a naturally finished track resolves. Only the last queue
/// position with repeat off actually stops playback.
pub fn on_track_end(repeat: RepeatMode, current: usize, len: usize) -> EndOfTrack {
    match repeat {
        RepeatMode::Track => EndOfTrack::RestartCurrent,
        RepeatMode::Queue => EndOfTrack::Advance,
        RepeatMode::Off => {
            if len > 0 && current < len - 1 {
                EndOfTrack::Advance
            } else {
                EndOfTrack::Finish
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn forward_wraps_to_front() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            next_index(3, 2, false, Direction::Forward, &mut rng),
            Some(0)
        );
        assert_eq!(
            next_index(3, 0, false, Direction::Forward, &mut rng),
            Some(1)
        );
    }

    #[test]
    fn backward_wraps_to_back() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            next_index(3, 0, false, Direction::Backward, &mut rng),
            Some(2)
        );
        assert_eq!(
            next_index(3, 2, false, Direction::Backward, &mut rng),
            Some(1)
        );
    }

    #[test]
    fn forward_then_backward_round_trips() {
        let mut rng = StdRng::seed_from_u64(0);
        for len in 1..6 {
            for start in 0..len {
                let fwd = next_index(len, start, false, Direction::Forward, &mut rng).unwrap();
                let back = next_index(len, fwd, false, Direction::Backward, &mut rng).unwrap();
                assert_eq!(back, start, "len={} start={}", len, start);
            }
        }
    }

    #[test]
    fn advancing_len_times_returns_to_start() {
        let mut rng = StdRng::seed_from_u64(0);
        for len in 1..6 {
            let mut index = 0;
            for _ in 0..len {
                index = next_index(len, index, false, Direction::Forward, &mut rng).unwrap();
            }
            assert_eq!(index, 0, "len={}", len);
        }
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(next_index(0, 0, false, Direction::Forward, &mut rng), None);
        assert_eq!(next_index(0, 0, true, Direction::Backward, &mut rng), None);
    }

    #[test]
    fn shuffle_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let picked = next_index(5, 2, true, Direction::Forward, &mut rng).unwrap();
            assert!(picked < 5);
        }
    }

    #[test]
    fn shuffle_can_repeat_current() {
        // Uniform selection includes the current position; with enough draws
        // from a single-element queue it must come back.
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(next_index(1, 0, true, Direction::Forward, &mut rng), Some(0));
    }

    #[test]
    fn track_repeat_restarts() {
        assert_eq!(
            on_track_end(RepeatMode::Track, 0, 3),
            EndOfTrack::RestartCurrent
        );
        assert_eq!(
            on_track_end(RepeatMode::Track, 2, 3),
            EndOfTrack::RestartCurrent
        );
    }

    #[test]
    fn queue_repeat_always_advances() {
        assert_eq!(on_track_end(RepeatMode::Queue, 2, 3), EndOfTrack::Advance);
    }

    #[test]
    fn repeat_off_stops_only_at_the_end() {
        assert_eq!(on_track_end(RepeatMode::Off, 0, 3), EndOfTrack::Advance);
        assert_eq!(on_track_end(RepeatMode::Off, 1, 3), EndOfTrack::Advance);
        assert_eq!(on_track_end(RepeatMode::Off, 2, 3), EndOfTrack::Finish);
        assert_eq!(on_track_end(RepeatMode::Off, 0, 0), EndOfTrack::Finish);
    }
}
