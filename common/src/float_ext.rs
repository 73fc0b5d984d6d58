pub trait FloatExt {
    /// `|self - other| <= tolerance * max(|self|, |other|)`.
    fn relative_eq(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f32 {
    fn relative_eq(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance * self.abs().max(other.abs())
    }
}

impl FloatExt for f64 {
    fn relative_eq(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance * self.abs().max(other.abs())
    }
}
