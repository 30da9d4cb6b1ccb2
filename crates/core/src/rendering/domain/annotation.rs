use crate::shared::region::Region;

/// What a drawn box marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Face,
    LeftEye,
    RightEye,
}

impl Feature {
    pub fn is_eye(self) -> bool {
        matches!(self, Feature::LeftEye | Feature::RightEye)
    }
}

/// A box to draw, in full-frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub feature: Feature,
    pub region: Region,
}

impl Annotation {
    pub fn new(feature: Feature, region: Region) -> Self {
        Self { feature, region }
    }
}
