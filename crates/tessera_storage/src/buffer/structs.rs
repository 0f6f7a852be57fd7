//! Struct columns over a shared 32-bit word array.

use std::sync::Arc;

use tessera_foundation::Value;

use super::Buffer;
use super::layout::StructLayout;

/// Rows of fixed-layout structs stored as consecutive words.
#[derive(Clone, Debug, PartialEq)]
pub struct StructBuffer {
    layout: Arc<StructLayout>,
    stride: usize,
    words: Vec<u32>,
    fill: Value,
}

impl StructBuffer {
    /// Creates a buffer of `capacity` rows, each initialized to `fill`.
    #[must_use]
    pub fn new(layout: StructLayout, capacity: usize, fill: Value) -> Self {
        let layout = Arc::new(layout);
        let stride = layout.words();
        let mut buffer = Self {
            layout,
            stride,
            words: Vec::new(),
            fill,
        };
        buffer.set_capacity(capacity);
        buffer
    }

    /// Returns the row layout.
    #[must_use]
    pub fn layout(&self) -> &StructLayout {
        &self.layout
    }

    /// Returns the raw words, `stride` words per row.
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

impl Buffer for StructBuffer {
    fn get(&self, index: usize) -> Value {
        self.layout.read(&self.words, index * self.stride)
    }

    fn set(&mut self, index: usize, value: &Value) {
        self.layout.write(&mut self.words, index * self.stride, value);
    }

    fn capacity(&self) -> usize {
        self.words.len() / self.stride
    }

    fn set_capacity(&mut self, capacity: usize) {
        let old = self.capacity();
        self.words.resize(capacity * self.stride, 0);
        self.words.shrink_to_fit();
        for row in old..capacity {
            self.layout.write(&mut self.words, row * self.stride, &self.fill);
        }
    }

    fn copy_within(&mut self, dst: usize, start: usize, end: usize) {
        self.words
            .copy_within(start * self.stride..end * self.stride, dst * self.stride);
    }
}
