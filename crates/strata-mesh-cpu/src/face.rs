use strata_blocks::FaceRole;
use strata_geom::Vec3;
use strata_world::Cardinal;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::from_cell(dx, dy, dz)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// Classifies the face into top/bottom/side role for material lookup.
    #[inline]
    pub fn role(self) -> FaceRole {
        match self {
            Face::PosY => FaceRole::Top,
            Face::NegY => FaceRole::Bottom,
            _ => FaceRole::Side,
        }
    }

    /// Chunk side this face points across, for the four lateral faces.
    #[inline]
    pub fn cardinal(self) -> Option<Cardinal> {
        match self {
            Face::PosX => Some(Cardinal::PosX),
            Face::NegX => Some(Cardinal::NegX),
            Face::PosZ => Some(Cardinal::PosZ),
            Face::NegZ => Some(Cardinal::NegZ),
            Face::PosY | Face::NegY => None,
        }
    }

    /// Min corner of this face's unit rectangle on the cell at `cell`.
    #[inline]
    pub fn rect_origin(self, cell: Vec3) -> Vec3 {
        match self {
            Face::PosY => cell + Vec3::new(0.0, 1.0, 0.0),
            Face::PosX => cell + Vec3::new(1.0, 0.0, 0.0),
            Face::PosZ => cell + Vec3::new(0.0, 0.0, 1.0),
            Face::NegY | Face::NegX | Face::NegZ => cell,
        }
    }
}
