//! Unsigned integer types usable as binary representations of basis states

use num_traits::{PrimInt, Unsigned};
use std::fmt::{Binary, Debug};
use std::hash::Hash;

/// An unsigned integer holding one basis state as bit-packed site indices.
///
/// Site `i` occupies `bitwidth[i]` bits starting at `bitoffset[i]`, so the
/// state with local indices `n_i` is `Σ n_i << bitoffset[i]`.
pub trait BitRep:
    PrimInt + Unsigned + Hash + Debug + Binary + Default + Send + Sync + 'static
{
    /// Number of bits in the type
    const BITS: u32;

    /// Convert a (small) local index into the representation type
    fn from_index(index: usize) -> Self;

    /// Convert a masked field back into a local index
    fn as_index(self) -> usize;

    /// Mask with the lowest `width` bits set
    #[inline]
    fn mask(width: u32) -> Self {
        if width == 0 {
            Self::zero()
        } else if width >= Self::BITS {
            !Self::zero()
        } else {
            (Self::one() << width as usize) - Self::one()
        }
    }

    /// Widen to `u128` for diagnostics
    #[inline]
    fn widen(self) -> u128 {
        self.to_u128().unwrap_or(u128::MAX)
    }
}

macro_rules! impl_bitrep {
    ($($t:ty),*) => {
        $(
            impl BitRep for $t {
                const BITS: u32 = (std::mem::size_of::<$t>() * 8) as u32;

                #[inline]
                fn from_index(index: usize) -> Self {
                    index as $t
                }

                #[inline]
                fn as_index(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_bitrep!(u8, u16, u32, u64, u128, usize);
