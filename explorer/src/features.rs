use bitflags::bitflags;

bitflags! {
    /// Optional behaviour of an exploration.
    ///
    /// Terminal values (null and primitives) have nothing to expand, so by
    /// default the visitor never hears about them. With the matching flag set
    /// they are reported, and whatever the visitor answers for them is
    /// ignored.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u8 {
        /// Null references are visited.
        const VISIT_NULL = 1 << 0;
        /// Primitive values are visited.
        const VISIT_PRIMITIVES = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert_eq!(Features::default(), Features::empty());
        assert!(!Features::default().contains(Features::VISIT_NULL));
    }

    #[test]
    fn flags_are_independent() {
        let features = Features::VISIT_PRIMITIVES;
        assert!(features.contains(Features::VISIT_PRIMITIVES));
        assert!(!features.contains(Features::VISIT_NULL));
        assert_eq!(
            Features::all(),
            Features::VISIT_NULL | Features::VISIT_PRIMITIVES
        );
    }
}
