//! An identity value paired with an associative operator.

use std::ops::Add;

/// An identity value paired with an associative binary operator.
///
/// Partitions are folded independently, each starting from the identity, and the partial results
/// are folded again in partition order. The operator must therefore be associative, and the
/// identity must be neutral on both sides. Commutativity is not required.
///
/// # Examples
///
/// ```
/// use iterative_parallelism::Monoid;
///
/// let concat = Monoid::new(String::new(), |a: String, b: String| a + &b);
/// assert_eq!(concat.fold(["x".to_string(), "y".to_string()]), "xy");
///
/// let sum = Monoid::<u64, _>::sum();
/// assert_eq!(sum.fold([1, 2, 3]), 6);
/// ```
#[derive(Clone, Debug)]
pub struct Monoid<T, F> {
    identity: T,
    operator: F,
}

impl<T, F> Monoid<T, F>
where
    T: Clone,
    F: Fn(T, T) -> T,
{
    /// Create a monoid from its identity and operator.
    pub fn new(identity: T, operator: F) -> Self {
        Self { identity, operator }
    }

    /// The identity value.
    pub fn identity(&self) -> &T {
        &self.identity
    }

    /// Apply the operator to `a` and `b`.
    pub fn combine(&self, a: T, b: T) -> T {
        (self.operator)(a, b)
    }

    /// Fold `values` left to right, starting from the identity.
    pub fn fold<I: IntoIterator<Item = T>>(&self, values: I) -> T {
        values
            .into_iter()
            .fold(self.identity.clone(), |acc, value| self.combine(acc, value))
    }
}

impl<T> Monoid<T, fn(T, T) -> T>
where
    T: Clone + Default + Add<Output = T>,
{
    /// Addition, with `T::default()` as the identity.
    pub fn sum() -> Self {
        Self::new(T::default(), <T as Add>::add)
    }
}
