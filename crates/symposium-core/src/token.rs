//! The fork token
//!
//! A fork is a single opaque byte. It is neither `Clone` nor `Copy`, so the
//! only way to move one between philosophers is to send it through a link:
//! the compiler enforces that forks are never duplicated after the ring is
//! built.

/// Byte carried by every fork; its value has no meaning
pub const FORK_BYTE: u8 = 0xF0;

/// Possession of one shared resource
#[derive(Debug, PartialEq, Eq)]
pub struct Fork(u8);

impl Fork {
    /// Forks are only minted while laying the table
    pub(crate) fn new() -> Self {
        Self(FORK_BYTE)
    }

    pub fn as_byte(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_is_one_opaque_byte() {
        let fork = Fork::new();
        assert_eq!(fork.as_byte(), FORK_BYTE);
        assert_eq!(std::mem::size_of::<Fork>(), 1);
    }
}
