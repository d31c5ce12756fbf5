use std::fmt;

/// Number of points kept by every rolling history.
pub const MAX_HISTORY: usize = 30;

/// Fixed-capacity FIFO of samples. Once full, each append overwrites the
/// oldest value.
#[derive(Clone, PartialEq)]
pub struct RollingSeries {
    buffer: Vec<f64>,
    write_pos: usize,
    capacity: usize,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl RollingSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity),
            write_pos: 0,
            capacity,
        }
    }

    pub fn append(&mut self, value: f64) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(value);
        } else {
            self.buffer[self.write_pos] = value;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        let head = if self.buffer.len() < self.capacity {
            0
        } else {
            self.write_pos
        };

        self.buffer[head..].iter().chain(&self.buffer[..head])
    }

    /// Copies the samples out, oldest first.
    pub fn values(&self) -> Vec<f64> {
        self.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for RollingSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
