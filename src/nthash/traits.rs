use std::iter::FusedIterator;

/// A roller that walks a resident sequence one window at a time.
pub trait RollingHash {
    /// Move to the next valid window. The first call positions the roller
    /// on the first valid window. Returns `false` once the sequence is
    /// exhausted.
    fn roll(&mut self) -> bool;

    /// Move to the previous valid window.
    fn roll_back(&mut self) -> bool;

    /// Hash values of the current window.
    fn hashes(&self) -> &[u64];

    /// Start of the current window.
    fn pos(&self) -> usize;

    fn k(&self) -> usize;

    /// Length of [`RollingHash::hashes`].
    fn num_hashes(&self) -> usize;
}

/// A roller fed one symbol at a time, without a backing sequence.
pub trait BlindRollingHash {
    fn roll(&mut self, char_in: u8);
    fn roll_back(&mut self, char_in: u8);
    fn hashes(&self) -> &[u64];
    fn pos(&self) -> isize;
    fn k(&self) -> usize;
}

/// Lazy `(position, hashes)` sequence over any [`RollingHash`].
///
/// Consumes the roller; restart by constructing a new one.
pub struct HashIter<R> {
    roller: R,
    done: bool,
}

impl<R: RollingHash> HashIter<R> {
    pub fn new(roller: R) -> Self {
        Self {
            roller,
            done: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.roller
    }
}

impl<R: RollingHash> Iterator for HashIter<R> {
    type Item = (usize, Vec<u64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.roller.roll() {
            Some((self.roller.pos(), self.roller.hashes().to_vec()))
        } else {
            self.done = true;
            None
        }
    }
}

impl<R: RollingHash> FusedIterator for HashIter<R> {}
