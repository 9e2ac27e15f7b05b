use std::fmt;

/// Terrain feature category. Declaration order is clipping priority: lower
/// discriminants claim area first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AreaType {
    AirportKeep,    // Highest priority
    AirportIgnore,  // Cut out of the mesh entirely
    Ocean,          // Also receives whatever no other type claims
    Lake,
    DryLake,
    IntLake,
    Reservoir,
    IntReservoir,
    Stream,
    Canal,
    Glacier,
    Urban,
    Marsh,
    Default,
    Void,
    Null,           // Lowest priority
}

impl AreaType {
    /// Number of area types (size of every per-type table).
    pub const COUNT: usize = 16;

    /// Category assigned to the part of a bucket no polygon claims.
    pub const BACKGROUND: AreaType = AreaType::Ocean;

    /// All area types in priority order.
    pub fn order() -> [AreaType; Self::COUNT] {
        use AreaType::*;
        [
            AirportKeep, AirportIgnore, Ocean, Lake, DryLake, IntLake, Reservoir, IntReservoir,
            Stream, Canal, Glacier, Urban, Marsh, Default, Void, Null,
        ]
    }

    #[inline] pub fn index(self) -> usize { self as usize }

    #[inline]
    pub fn from_index(i: usize) -> Option<AreaType> {
        Self::order().get(i).copied()
    }

    /// Name used in polygon source files and as the material name.
    pub fn to_str(&self) -> &'static str {
        match self {
            AreaType::AirportKeep => "AirportKeep",
            AreaType::AirportIgnore => "AirportIgnore",
            AreaType::Ocean => "Ocean",
            AreaType::Lake => "Lake",
            AreaType::DryLake => "DryLake",
            AreaType::IntLake => "IntermittentLake",
            AreaType::Reservoir => "Reservoir",
            AreaType::IntReservoir => "IntermittentReservoir",
            AreaType::Stream => "Stream",
            AreaType::Canal => "Canal",
            AreaType::Glacier => "Glacier",
            AreaType::Urban => "Urban",
            AreaType::Marsh => "Marsh",
            AreaType::Default => "Default",
            AreaType::Void => "Void",
            AreaType::Null => "Null",
        }
    }

    /// Look up a feature type by its source-file name.
    pub fn from_name(name: &str) -> Option<AreaType> {
        Self::order().into_iter().find(|t| t.to_str() == name)
    }

    /// Areas that become holes in the finished mesh.
    #[inline] pub fn is_hole(self) -> bool { self == AreaType::AirportIgnore }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
