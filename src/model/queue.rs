//! Client-side play queue

use rand::Rng;

use super::track::Track;

/// Where the queue cursor should move next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Play the entry at this index
    Play(usize),
    /// Ran off the end with repeat disabled
    End,
}

/// Ordered tracks plus a cursor. The cursor is in bounds whenever the queue is non-empty.
#[derive(Clone, Debug, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    index: usize,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t.same_media(track))
    }

    /// Append unless a track with the same id is already queued. Returns its position.
    pub fn append(&mut self, track: Track) -> usize {
        if let Some(pos) = self.position_of(&track) {
            return pos;
        }
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Move the cursor; out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn next_step(&self, repeat: bool) -> Option<Step> {
        if self.tracks.is_empty() {
            return None;
        }
        let next = self.index + 1;
        Some(if next < self.tracks.len() {
            Step::Play(next)
        } else if repeat {
            Step::Play(0)
        } else {
            Step::End
        })
    }

    pub fn previous_step(&self, repeat: bool) -> Option<Step> {
        if self.tracks.is_empty() {
            return None;
        }
        Some(if self.index > 0 {
            Step::Play(self.index - 1)
        } else if repeat {
            Step::Play(self.tracks.len() - 1)
        } else {
            Step::End
        })
    }

    /// Uniform pick over the whole queue; may land on the current entry.
    pub fn shuffle_step<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Step> {
        if self.tracks.is_empty() {
            return None;
        }
        Some(Step::Play(rng.gen_range(0..self.tracks.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn track(id: u64) -> Track {
        Track {
            id,
            kind: MediaKind::Song,
            title: format!("Track {id}"),
            subtitle: "Artist".to_string(),
            audio_url: format!("http://localhost/media/{id}.mp3"),
            cover_url: String::new(),
            duration: Some(180.0),
            lyrics: None,
        }
    }

    fn queue_of(n: u64) -> Queue {
        let mut queue = Queue::new();
        for id in 1..=n {
            queue.append(track(id));
        }
        queue
    }

    #[test]
    fn append_deduplicates_by_id_and_kind() {
        let mut queue = queue_of(3);
        assert_eq!(queue.append(track(2)), 1);
        assert_eq!(queue.len(), 3);

        let mut episode = track(2);
        episode.kind = MediaKind::Episode;
        assert_eq!(queue.append(episode), 3);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn select_ignores_out_of_range() {
        let mut queue = queue_of(3);
        assert!(queue.select(2));
        assert!(!queue.select(99));
        assert_eq!(queue.index(), 2);
    }

    #[test]
    fn walking_forward_without_repeat_stops_at_the_end() {
        let mut queue = queue_of(3);
        let mut visited = vec![queue.index()];
        while let Some(Step::Play(i)) = queue.next_step(false) {
            assert!(queue.select(i));
            visited.push(i);
        }
        assert_eq!(visited, vec![0, 1, 2]);
        assert_eq!(queue.next_step(false), Some(Step::End));
        assert_eq!(queue.previous_step(false), Some(Step::Play(1)));
    }

    #[test]
    fn walking_backward_without_repeat_stops_at_the_start() {
        let queue = queue_of(3);
        assert_eq!(queue.previous_step(false), Some(Step::End));
    }

    #[test]
    fn repeat_wraps_in_both_directions() {
        let mut queue = queue_of(3);
        assert_eq!(queue.previous_step(true), Some(Step::Play(2)));
        queue.select(2);
        assert_eq!(queue.next_step(true), Some(Step::Play(0)));
    }

    #[test]
    fn shuffle_stays_in_bounds() {
        let queue = queue_of(5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            match queue.shuffle_step(&mut rng) {
                Some(Step::Play(i)) => assert!(i < 5),
                other => panic!("unexpected step {other:?}"),
            }
        }
    }

    #[test]
    fn empty_queue_has_no_steps() {
        let queue = Queue::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(queue.next_step(true), None);
        assert_eq!(queue.previous_step(true), None);
        assert_eq!(queue.shuffle_step(&mut rng), None);
        assert!(queue.current().is_none());
    }
}
