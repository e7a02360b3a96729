/// A range in the document, in char offsets. `head` is where the cursor sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Move the head, dragging the anchor along unless extending
    pub fn move_to(&mut self, pos: usize, extend: bool) {
        self.head = pos;
        if !extend {
            self.anchor = pos;
        }
    }

    /// Map both ends through the removal of `from..to`
    pub fn map_removal(&mut self, from: usize, to: usize) {
        let map = |pos: usize| {
            if pos <= from {
                pos
            } else if pos <= to {
                from
            } else {
                pos - (to - from)
            }
        };
        self.anchor = map(self.anchor);
        self.head = map(self.head);
    }
}
