//! Paced reveal of the in-flight answer.
//!
//! The remote side sends the full answer so far in bursts. Instead of
//! snapping to each burst, a [`Reveal`] shows a growing prefix of the
//! latest text, one character per tick. Whoever renders decides when to
//! tick; the session ticks every [`DEFAULT_REVEAL_DELAY`] unless
//! configured otherwise.

use std::time::Duration;

/// The default delay between two revealed characters.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(15);

/// Reveal progress of one message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reveal {
    displayed: String,
}

impl Reveal {
    /// Returns the text revealed so far.
    #[inline]
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Returns whether everything in `target` has been revealed.
    #[inline]
    pub fn is_caught_up(&self, target: &str) -> bool {
        self.displayed == target
    }

    /// Re-evaluates against a new target without revealing anything.
    ///
    /// If the revealed text is no longer a prefix of `target` (the
    /// content shrank or was revised), the reveal restarts from scratch.
    /// Returns whether it restarted.
    pub fn sync(&mut self, target: &str) -> bool {
        if target.starts_with(&self.displayed) {
            return false;
        }
        trace!(
            "target diverged at {} bytes, restarting reveal",
            self.displayed.len()
        );
        self.displayed.clear();
        true
    }

    /// Advances by one tick and returns the revealed text.
    ///
    /// A tick either restarts a diverged reveal or reveals exactly one
    /// more character of `target`.
    pub fn advance(&mut self, target: &str) -> &str {
        if !self.sync(target) {
            if let Some(next) = target[self.displayed.len()..].chars().next() {
                self.displayed.push(next);
            }
        }
        &self.displayed
    }

    /// Forgets all progress.
    #[inline]
    pub fn reset(&mut self) {
        self.displayed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(reveal: &mut Reveal, target: &str) -> Vec<String> {
        let mut steps = vec![];
        while !reveal.is_caught_up(target) {
            steps.push(reveal.advance(target).to_owned());
        }
        steps
    }

    #[test]
    fn test_one_char_per_tick() {
        let mut reveal = Reveal::default();
        let steps = drain(&mut reveal, "향수 ok");
        assert_eq!(steps, vec!["향", "향수", "향수 ", "향수 o", "향수 ok"]);

        // Idles once caught up.
        assert_eq!(reveal.advance("향수 ok"), "향수 ok");
    }

    #[test]
    fn test_bursty_targets() {
        let targets =
            ["시트러스", "시트러스 향수를", "시트러스 향수를 추천합니다."];
        let mut reveal = Reveal::default();
        let mut revealed = vec![];

        // Only a couple of ticks happen between bursts.
        for target in targets {
            reveal.sync(target);
            for _ in 0..2 {
                revealed.push(reveal.advance(target).to_owned());
            }
        }
        let last = targets[targets.len() - 1];
        revealed.extend(drain(&mut reveal, last));

        // Every step is a prefix one character longer than the last, so
        // nothing is skipped or reordered.
        for pair in revealed.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
            assert_eq!(pair[1].chars().count(), pair[0].chars().count() + 1);
        }
        assert_eq!(revealed.last().unwrap(), last);
        assert_eq!(revealed.len(), last.chars().count());
    }

    #[test]
    fn test_shrink_restarts() {
        let mut reveal = Reveal::default();
        drain(&mut reveal, "a long answer");

        assert!(reveal.sync("a long"));
        assert_eq!(reveal.displayed(), "");
        assert_eq!(reveal.advance("a long"), "a");
    }

    #[test]
    fn test_revision_restarts() {
        let mut reveal = Reveal::default();
        drain(&mut reveal, "abc");

        // Longer, but no longer starting with what is displayed.
        assert_eq!(reveal.advance("xbcd"), "");
        assert_eq!(reveal.advance("xbcd"), "x");
    }

    #[test]
    fn test_reset() {
        let mut reveal = Reveal::default();
        reveal.advance("abc");
        reveal.reset();
        assert_eq!(reveal, Reveal::default());
    }
}
