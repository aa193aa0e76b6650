use core::fmt;

/// Stability of a decoded result.
///
/// Combining two lifecycles keeps the less stable one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    #[default]
    Stable,
    Experimental,
    /// Deprecated since the given data version.
    Deprecated(u32),
}

impl Lifecycle {
    pub fn add(self, other: Lifecycle) -> Lifecycle {
        use Lifecycle::*;
        match (self, other) {
            (Experimental, _) | (_, Experimental) => Experimental,
            (Deprecated(a), Deprecated(b)) => Deprecated(a.min(b)),
            (Deprecated(since), Stable) | (Stable, Deprecated(since)) => Deprecated(since),
            (Stable, Stable) => Stable,
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Stable => write!(f, "stable"),
            Lifecycle::Experimental => write!(f, "experimental"),
            Lifecycle::Deprecated(since) => write!(f, "deprecated since {}", since),
        }
    }
}
