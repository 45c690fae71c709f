// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A minimal bitflags macro.
//!
//! Generates a typed flag set over an unsigned integer with `const` flag
//! values, set operations, and the usual bit operators. Kept in-tree so
//! flag types stay dependency-free and `const`-friendly.

/// Declares a typed bitflag set.
///
/// ```
/// okhra_core::okhra_bitflags! {
///     /// Example flags.
///     pub struct Caps: u32 {
///         /// First capability.
///         const A = 1 << 0;
///         /// Second capability.
///         const B = 1 << 1;
///     }
/// }
///
/// let both = Caps::A | Caps::B;
/// assert!(both.contains(Caps::A));
/// assert!(!Caps::A.contains(Caps::B));
/// ```
#[macro_export]
macro_rules! okhra_bitflags {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $inner:ty {
            $(
                $(#[$flag_meta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name($inner);

        impl $name {
            $(
                $(#[$flag_meta])*
                pub const $flag: Self = Self($value);
            )*

            /// Returns a set with no flags.
            #[inline]
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Returns the raw bit representation.
            #[inline]
            pub const fn bits(self) -> $inner {
                self.0
            }

            /// Creates a set from raw bits.
            #[inline]
            pub const fn from_bits(bits: $inner) -> Self {
                Self(bits)
            }

            /// Returns `true` if no flag is set.
            #[inline]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Returns `true` if every flag in `other` is also set in `self`.
            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns `true` if any flag in `other` is set in `self`.
            #[inline]
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Sets all flags in `other`.
            #[inline]
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            /// Clears all flags in `other`.
            #[inline]
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl core::ops::BitOrAssign for $name {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            #[inline]
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    okhra_bitflags! {
        /// Flags used by the macro tests.
        pub struct TestFlags: u32 {
            /// Bit 0.
            const ONE = 1 << 0;
            /// Bit 1.
            const TWO = 1 << 1;
            /// Bit 2.
            const FOUR = 1 << 2;
        }
    }

    #[test]
    fn test_contains_and_ops() {
        let set = TestFlags::ONE | TestFlags::FOUR;
        assert!(set.contains(TestFlags::ONE));
        assert!(set.contains(TestFlags::FOUR));
        assert!(!set.contains(TestFlags::TWO));
        assert!(set.contains(TestFlags::ONE | TestFlags::FOUR));
        assert!(!set.contains(TestFlags::ONE | TestFlags::TWO));
        assert!(set.intersects(TestFlags::ONE | TestFlags::TWO));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = TestFlags::empty();
        assert!(set.is_empty());
        set.insert(TestFlags::TWO);
        assert_eq!(set.bits(), 2);
        set.remove(TestFlags::TWO);
        assert!(set.is_empty());
    }
}
