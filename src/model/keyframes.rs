//! Ordered keyframe sequences.

/// One `(frame, value)` entry in a track.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<V> {
    pub frame: i64,
    pub value: V,
}

/// What an insert did to the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new keyframe was added at this index.
    Inserted(usize),
    /// The keyframe at this index already had the frame; its value was replaced.
    Replaced(usize),
}

impl InsertOutcome {
    /// Index of the affected keyframe.
    pub fn index(&self) -> usize {
        match self {
            InsertOutcome::Inserted(i) | InsertOutcome::Replaced(i) => *i,
        }
    }

    /// Whether the sequence grew.
    pub fn is_insert(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// Keyframes kept strictly ascending by frame, one keyframe per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes<V> {
    keys: Vec<Keyframe<V>>,
}

impl<V> Default for Keyframes<V> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<V> Keyframes<V> {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert a value at `frame`, replacing the value already there if any.
    ///
    /// Frames are not clamped; negative and very large frames are kept as is.
    pub fn insert(&mut self, frame: i64, value: V) -> InsertOutcome {
        match self.keys.iter().position(|k| k.frame >= frame) {
            Some(i) if self.keys[i].frame == frame => {
                self.keys[i].value = value;
                InsertOutcome::Replaced(i)
            }
            Some(i) => {
                self.keys.insert(i, Keyframe { frame, value });
                InsertOutcome::Inserted(i)
            }
            None => {
                self.keys.push(Keyframe { frame, value });
                InsertOutcome::Inserted(self.keys.len() - 1)
            }
        }
    }

    /// Remove the keyframe at `frame`, returning its value.
    pub fn remove(&mut self, frame: i64) -> Option<V> {
        let index = self.index_of(frame)?;
        Some(self.keys.remove(index).value)
    }

    /// Value stored exactly at `frame`.
    pub fn get(&self, frame: i64) -> Option<&V> {
        self.index_of(frame).map(|i| &self.keys[i].value)
    }

    fn index_of(&self, frame: i64) -> Option<usize> {
        self.keys.binary_search_by_key(&frame, |k| k.frame).ok()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe<V>> {
        self.keys.iter()
    }

    /// Frame numbers in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.keys.iter().map(|k| k.frame)
    }

    /// First and last frame, if any keys exist.
    pub fn span(&self) -> Option<(i64, i64)> {
        Some((self.keys.first()?.frame, self.keys.last()?.frame))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn as_slice(&self) -> &[Keyframe<V>] {
        &self.keys
    }
}

impl<V> FromIterator<(i64, V)> for Keyframes<V> {
    /// Build through [`Keyframes::insert`], so duplicate frames keep the last value.
    fn from_iter<I: IntoIterator<Item = (i64, V)>>(iter: I) -> Self {
        let mut keys = Self::new();
        for (frame, value) in iter {
            keys.insert(frame, value);
        }
        keys
    }
}

impl<'a, V> IntoIterator for &'a Keyframes<V> {
    type Item = &'a Keyframe<V>;
    type IntoIter = std::slice::Iter<'a, Keyframe<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames<V>(keys: &Keyframes<V>) -> Vec<i64> {
        keys.frames().collect()
    }

    fn assert_strictly_ascending<V>(keys: &Keyframes<V>) {
        let f = frames(keys);
        assert!(f.windows(2).all(|w| w[0] < w[1]), "not ascending: {:?}", f);
    }

    #[test]
    fn test_insert_into_empty_appends() {
        let mut keys = Keyframes::new();
        assert_eq!(keys.insert(5, "a"), InsertOutcome::Inserted(0));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_insert_before_first_greater() {
        let mut keys = Keyframes::new();
        keys.insert(0, 'a');
        keys.insert(10, 'c');
        assert_eq!(keys.insert(5, 'b'), InsertOutcome::Inserted(1));
        assert_eq!(frames(&keys), vec![0, 5, 10]);
    }

    #[test]
    fn test_insert_new_maximum_appends() {
        let mut keys = Keyframes::new();
        keys.insert(0, 'a');
        keys.insert(10, 'b');
        assert_eq!(keys.insert(11, 'c'), InsertOutcome::Inserted(2));
    }

    #[test]
    fn test_insert_existing_frame_replaces_only_that_value() {
        let mut keys = Keyframes::new();
        keys.insert(0, "a");
        keys.insert(4, "b");
        keys.insert(8, "c");

        assert_eq!(keys.insert(4, "B"), InsertOutcome::Replaced(1));
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.get(0), Some(&"a"));
        assert_eq!(keys.get(4), Some(&"B"));
        assert_eq!(keys.get(8), Some(&"c"));
    }

    #[test]
    fn test_negative_and_large_frames_not_clamped() {
        let mut keys = Keyframes::new();
        keys.insert(i64::MAX, 1);
        keys.insert(-30, 2);
        keys.insert(0, 3);
        assert_eq!(frames(&keys), vec![-30, 0, i64::MAX]);
    }

    #[test]
    fn test_many_inserts_stay_sorted_and_unique() {
        let mut keys = Keyframes::new();
        // Deterministic scramble with repeats.
        let mut seed: i64 = 17;
        for i in 0..400 {
            seed = (seed * 31 + 7) % 97;
            let frame = seed - 48;
            let before = keys.len();
            let had = keys.get(frame).is_some();
            let outcome = keys.insert(frame, i);
            if had {
                assert!(!outcome.is_insert());
                assert_eq!(keys.len(), before);
            } else {
                assert!(outcome.is_insert());
                assert_eq!(keys.len(), before + 1);
            }
            assert_eq!(keys.get(frame), Some(&i));
            assert_strictly_ascending(&keys);
        }
    }

    #[test]
    fn test_remove() {
        let mut keys: Keyframes<char> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
        assert_eq!(keys.remove(2), Some('b'));
        assert_eq!(keys.remove(2), None);
        assert_eq!(frames(&keys), vec![1, 3]);
    }

    #[test]
    fn test_from_iter_normalises_unsorted_duplicates() {
        let keys: Keyframes<&str> = [(9, "x"), (1, "y"), (9, "z")].into_iter().collect();
        assert_eq!(frames(&keys), vec![1, 9]);
        assert_eq!(keys.get(9), Some(&"z"));
    }

    #[test]
    fn test_span() {
        let mut keys = Keyframes::new();
        assert_eq!(keys.span(), None);
        keys.insert(3, ());
        keys.insert(-1, ());
        assert_eq!(keys.span(), Some((-1, 3)));
    }
}
