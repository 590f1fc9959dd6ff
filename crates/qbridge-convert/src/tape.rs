//! Recording targets for emitted operations.

use crate::operation::Operation;

/// Anything that accepts target operations in order.
pub trait Tape {
    fn queue(&mut self, op: Operation);
}

impl Tape for Vec<Operation> {
    fn queue(&mut self, op: Operation) {
        self.push(op);
    }
}

/// An in-memory tape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    ops: Vec<Operation>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.ops
    }
}

impl Tape for Recorder {
    fn queue(&mut self, op: Operation) {
        self.ops.push(op);
    }
}

impl std::ops::Index<usize> for Recorder {
    type Output = Operation;

    fn index(&self, index: usize) -> &Operation {
        &self.ops[index]
    }
}
