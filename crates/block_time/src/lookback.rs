use core::fmt;

/// Which block to sample when measuring block time against the chain tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackTarget {
    /// A fixed height.
    Absolute(u64),
    /// An offset from the latest height; negative values look back.
    Relative(i64),
}

impl LookbackTarget {
    /// Looks back `blocks` blocks from the tip.
    pub fn blocks_back(blocks: u64) -> Self {
        LookbackTarget::Relative(i64::try_from(blocks).map_or(i64::MIN, |b| -b))
    }

    /// Resolves the target to a concrete height.
    ///
    /// Returns `None` when the height would fall below zero, above `latest`,
    /// or below `earliest` (the first height the endpoint still serves).
    /// `None` means "skip this sample", never a failure of the whole run.
    pub fn resolve(&self, latest: u64, earliest: Option<u64>) -> Option<u64> {
        let height = match *self {
            LookbackTarget::Absolute(h) if h <= latest => h,
            LookbackTarget::Absolute(_) => return None,
            LookbackTarget::Relative(delta) if delta <= 0 => {
                latest.checked_sub(delta.unsigned_abs())?
            }
            // Blocks that do not exist yet cannot be sampled.
            LookbackTarget::Relative(_) => return None,
        };
        match earliest {
            Some(floor) if height < floor => None,
            _ => Some(height),
        }
    }
}

impl fmt::Display for LookbackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookbackTarget::Absolute(h) => write!(f, "@{h}"),
            LookbackTarget::Relative(delta) => write!(f, "Δ{}", delta.unsigned_abs()),
        }
    }
}
