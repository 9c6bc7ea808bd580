//! Small `Vec` helpers the arena leans on every tick.

pub(crate) trait VecExt<T> {
    /// Removes every element matching `pred` and returns them. Both the
    /// kept and the removed elements keep their relative order.
    fn extract(&mut self, pred: impl FnMut(&T) -> bool) -> Vec<T>;

    /// Removes elements two at a time from the front. An odd last element
    /// stays behind.
    fn drain_pairs(&mut self) -> Vec<(T, T)>;
}

impl<T> VecExt<T> for Vec<T> {
    fn extract(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let (taken, kept): (Vec<T>, Vec<T>) =
            std::mem::take(self).into_iter().partition(|item| pred(item));
        *self = kept;
        taken
    }

    fn drain_pairs(&mut self) -> Vec<(T, T)> {
        let leftover = if self.len() % 2 == 1 { self.pop() } else { None };
        let mut pairs = Vec::with_capacity(self.len() / 2);
        let mut items = std::mem::take(self).into_iter();
        while let (Some(a), Some(b)) = (items.next(), items.next()) {
            pairs.push((a, b));
        }
        self.extend(leftover);
        pairs
    }
}
