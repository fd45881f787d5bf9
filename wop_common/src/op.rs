/// Implements the standard operator traits for single-field integer newtypes.
///
/// ```rust,ignore
/// op!(binary Cents, Add, add, saturating_add);
/// op!(inplace Cents, AddAssign, add_assign, saturating_add);
/// op!(unary Cents, Neg, neg, saturating_neg);
/// ```
#[macro_export]
macro_rules! op {
    (binary $name:ty, $trait:ident, $fn:ident, $inner:ident) => {
        impl std::ops::$trait for $name {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$inner(rhs.0))
            }
        }
    };
    (inplace $name:ty, $trait:ident, $fn:ident, $inner:ident) => {
        impl std::ops::$trait for $name {
            fn $fn(&mut self, rhs: Self) {
                self.0 = self.0.$inner(rhs.0);
            }
        }
    };
    (unary $name:ty, $trait:ident, $fn:ident, $inner:ident) => {
        impl std::ops::$trait for $name {
            type Output = Self;

            fn $fn(self) -> Self::Output {
                Self(self.0.$inner())
            }
        }
    };
}
