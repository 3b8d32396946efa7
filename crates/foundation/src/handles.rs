/// Index handle into a vec-backed store. Stores that never free slots need
/// no generation check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    pub fn new(index: u32) -> Self {
        Handle(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn handles_order_by_index() {
        let a = Handle::new(1);
        let b = Handle::new(7);
        assert!(a < b);
        assert_eq!(b.index(), 7);
        assert_eq!(a, Handle::new(1));
    }
}
