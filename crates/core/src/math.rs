use num_traits::{Float as NumFloat, FromPrimitive};
use std::fmt::{Debug, Display};
use std::ops::{AddAssign, MulAssign, SubAssign};
use std::time::{Duration, Instant};

pub trait RealNumber:
    NumFloat
    + FromPrimitive
    + Debug
    + Display
    + Send
    + Sync
    + AddAssign
    + SubAssign
    + MulAssign
    + 'static
{
}

impl<T> RealNumber for T where
    T: NumFloat
        + FromPrimitive
        + Debug
        + Display
        + Send
        + Sync
        + AddAssign
        + SubAssign
        + MulAssign
        + 'static
{
}

#[cfg(not(feature = "f32"))]
pub type Scalar = f64;

#[cfg(feature = "f32")]
pub type Scalar = f32;

/// Converts an `f64` literal into `T`.
pub fn constant<T: RealNumber>(value: f64) -> T {
    T::from_f64(value).unwrap()
}

pub fn dot<T: RealNumber>(lhs: &[T], rhs: &[T]) -> T {
    assert_eq!(lhs.len(), rhs.len(), "dot product dimension mismatch");
    lhs.iter()
        .zip(rhs.iter())
        .fold(T::zero(), |acc, (a, b)| acc + (*a) * (*b))
}

pub fn norm2<T: RealNumber>(data: &[T]) -> T {
    dot(data, data).sqrt()
}

pub fn norm_inf<T: RealNumber>(data: &[T]) -> T {
    data.iter()
        .copied()
        .map(|v| v.abs())
        .fold(T::zero(), |acc, value| acc.max(value))
}

/// Euclidean distance between two vectors of equal length.
pub fn distance2<T: RealNumber>(lhs: &[T], rhs: &[T]) -> T {
    assert_eq!(lhs.len(), rhs.len(), "distance dimension mismatch");
    lhs.iter()
        .zip(rhs.iter())
        .fold(T::zero(), |acc, (a, b)| {
            let diff = *a - *b;
            acc + diff * diff
        })
        .sqrt()
}

pub fn axpy<T: RealNumber>(alpha: T, x: &[T], y: &mut [T]) {
    assert_eq!(x.len(), y.len(), "axpy dimension mismatch");
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi += alpha * (*xi);
    }
}

/// Index and value of the smallest entry. The lowest index wins on ties and
/// NaN entries are never selected.
pub fn argmin<T: RealNumber>(data: &[T]) -> Option<(usize, T)> {
    let mut best: Option<(usize, T)> = None;
    for (idx, &value) in data.iter().enumerate() {
        match best {
            Some((_, current)) if !(value < current) => {}
            _ if value.is_nan() => {}
            _ => best = Some((idx, value)),
        }
    }
    best
}

pub fn all_finite<T: RealNumber>(data: &[T]) -> bool {
    data.iter().all(|v| v.is_finite())
}

#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
    elapsed: Duration,
    running: bool,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Duration::ZERO,
            running: true,
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.elapsed += self.start.elapsed();
            self.running = false;
        }
    }

    pub fn elapsed(&self) -> Duration {
        if self.running {
            self.elapsed + self.start.elapsed()
        } else {
            self.elapsed
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}
