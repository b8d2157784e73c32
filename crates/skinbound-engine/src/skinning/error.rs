use std::fmt;

/// Integration contract violation detected before dispatch.
///
/// The kernels have no error channel of their own: every variant here would
/// otherwise be undefined behaviour on the device (deadlock, out-of-range
/// reads) or a silently wrong box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Group size is zero or not a power of two.
    GroupSize(u32),
    /// Group size exceeds what the device allows.
    GroupSizeLimit { group_size: u32, limit: u32 },
    /// Influence count is zero or larger than the vec4 packing allows.
    Influences { requested: u32, supported: u32 },
    /// Bone table capacity is zero or does not fit a uniform binding.
    BoneCapacity { requested: u32, supported: u32 },
    /// Palette capacity differs from the configured bone table size.
    PaletteCapacity { palette: usize, expected: u32 },
    /// A vertex was given more (index, weight) pairs than the packing holds.
    TooManyInfluences { vertex: usize, count: usize },
    /// Vertex streams disagree on the vertex count.
    StreamLength { positions: usize, indices: usize, weights: usize },
    /// A bone index the kernel would read is outside the bone table.
    BoneIndex { vertex: usize, bone: u32, capacity: u32 },
    /// A vertex's weights sum to zero over the slots the kernel reads; its
    /// homogeneous divide would produce NaN.
    ZeroWeights { vertex: usize },
    /// A bone palette slot past the palette capacity.
    PaletteIndex { index: u32, capacity: usize },
    /// The dispatch would need more groups than the device can launch.
    GroupCount { groups: u64, limit: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupSize(n) => write!(f, "group size {n} is not a non-zero power of two"),
            Self::GroupSizeLimit { group_size, limit } => {
                write!(f, "group size {group_size} exceeds device limit {limit}")
            }
            Self::Influences { requested, supported } => {
                write!(f, "{requested} bone influences requested, 1..={supported} supported")
            }
            Self::BoneCapacity { requested, supported } => {
                write!(f, "bone table of {requested} entries, 1..={supported} supported")
            }
            Self::PaletteCapacity { palette, expected } => {
                write!(f, "bone palette holds {palette} transforms, kernel expects {expected}")
            }
            Self::TooManyInfluences { vertex, count } => {
                write!(f, "vertex {vertex} has {count} influences")
            }
            Self::StreamLength { positions, indices, weights } => write!(
                f,
                "vertex streams disagree: {positions} positions, {indices} index sets, {weights} weight sets"
            ),
            Self::BoneIndex { vertex, bone, capacity } => {
                write!(f, "vertex {vertex} references bone {bone}, table holds {capacity}")
            }
            Self::ZeroWeights { vertex } => write!(f, "vertex {vertex} has no bone weight"),
            Self::PaletteIndex { index, capacity } => {
                write!(f, "bone {index} is outside a palette of {capacity}")
            }
            Self::GroupCount { groups, limit } => {
                write!(f, "dispatch needs {groups} groups, device limit is {limit}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
