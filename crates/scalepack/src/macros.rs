//! Macros for stamping out codecs.
//!
//! `scale_struct!` and `scale_enum!` declare a type and its `Encode`/`Decode`
//! impls in one place, so the declared field order and the discriminant table
//! can never drift away from the type definition.

/// Every fixed-width integer with its byte width.
macro_rules! for_each_fixed {
    ($m:ident) => {
        $m!(u8, 1);
        $m!(u16, 2);
        $m!(u32, 4);
        $m!(u64, 8);
        $m!(u128, 16);
        $m!(i8, 1);
        $m!(i16, 2);
        $m!(i32, 4);
        $m!(i64, 8);
        $m!(i128, 16);
    };
}

pub(crate) use for_each_fixed;

/// Declares a record whose fields travel in declaration order.
///
/// ```
/// scalepack::scale_struct! {
///     #[derive(Debug, PartialEq)]
///     pub struct Pagination {
///         pub limit: Option<std::num::NonZeroU64>,
///         pub offset: u64,
///     }
/// }
///
/// use scalepack::Encode;
/// let page = Pagination { offset: 3, limit: None };
/// assert_eq!(page.encode(), vec![0, 3, 0, 0, 0, 0, 0, 0, 0]);
/// ```
///
/// A single-field tuple struct is encoded exactly like its field.
#[macro_export]
macro_rules! scale_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty ),*
        }

        impl $crate::Encode for $name {
            #[allow(unused_variables)]
            fn encode_to(&self, out: &mut Vec<u8>) {
                $( $crate::Encode::encode_to(&self.$field, out); )*
            }
        }

        impl $crate::Decode for $name {
            #[allow(unused_variables)]
            fn decode(cur: &mut $crate::Cursor<'_>) -> $crate::Result<Self> {
                $( let $field = <$ty as $crate::Decode>::decode(cur)?; )*
                Ok(Self { $($field),* })
            }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ( $(#[$fmeta:meta])* $fvis:vis $inner:ty ) ;
    ) => {
        $(#[$meta])*
        $vis struct $name ( $(#[$fmeta])* $fvis $inner );

        impl $crate::Encode for $name {
            fn encode_to(&self, out: &mut Vec<u8>) {
                $crate::Encode::encode_to(&self.0, out);
            }
        }

        impl $crate::Decode for $name {
            fn decode(cur: &mut $crate::Cursor<'_>) -> $crate::Result<Self> {
                <$inner as $crate::Decode>::decode(cur).map(Self)
            }
        }
    };
}

/// Declares a closed union with explicit one-byte discriminants.
///
/// Variants either carry exactly one payload or none at all. A payload-less
/// variant decodes to the bare variant: there is no placeholder payload.
/// Duplicate discriminants are rejected at compile time.
///
/// ```
/// scalepack::scale_enum! {
///     #[derive(Debug, PartialEq)]
///     pub enum Shape {
///         Dot = 0,
///         Circle(u32) = 1,
///     }
/// }
///
/// use scalepack::Encode;
/// assert_eq!(Shape::Dot.encode(), vec![0]);
/// assert_eq!(Shape::Circle(7).encode(), vec![1, 7, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! scale_enum {
    (@pat $bind:pat, $variant:ident ($payload:ty)) => { Self::$variant($bind) };
    (@pat $bind:pat, $variant:ident) => { Self::$variant };

    (@put $out:ident, $bind:ident, $variant:ident ($payload:ty)) => {
        $crate::Encode::encode_to($bind, $out)
    };
    (@put $out:ident, $bind:ident, $variant:ident) => { () };

    (@take $cur:ident, $variant:ident ($payload:ty)) => {
        Ok(Self::$variant(<$payload as $crate::Decode>::decode($cur)?))
    };
    (@take $cur:ident, $variant:ident) => { Ok(Self::$variant) };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $( ( $payload:ty ) )? = $disc:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant $( ($payload) )? ),+
        }

        impl $name {
            /// Discriminant and name of every variant, in declaration order.
            pub const VARIANTS: &'static [(u8, &'static str)] = &[
                $( ($disc, stringify!($variant)) ),+
            ];

            pub fn discriminant(&self) -> u8 {
                match self {
                    $( $crate::scale_enum!(@pat _, $variant $( ($payload) )?) => $disc, )+
                }
            }

            pub fn tag(&self) -> &'static str {
                match self {
                    $(
                        $crate::scale_enum!(@pat _, $variant $( ($payload) )?) => stringify!($variant),
                    )+
                }
            }
        }

        const _: () = {
            let discriminants: &[u8] = &[$($disc),+];
            let mut i = 0;
            while i < discriminants.len() {
                let mut j = i + 1;
                while j < discriminants.len() {
                    assert!(
                        discriminants[i] != discriminants[j],
                        concat!("duplicate discriminant in ", stringify!($name)),
                    );
                    j += 1;
                }
                i += 1;
            }
        };

        impl $crate::Encode for $name {
            fn encode_to(&self, out: &mut Vec<u8>) {
                match self {
                    $(
                        $crate::scale_enum!(@pat value, $variant $( ($payload) )?) => {
                            out.push($disc);
                            $crate::scale_enum!(@put out, value, $variant $( ($payload) )?);
                        }
                    )+
                }
            }
        }

        impl $crate::Decode for $name {
            fn decode(cur: &mut $crate::Cursor<'_>) -> $crate::Result<Self> {
                match cur.read_byte()? {
                    $( $disc => $crate::scale_enum!(@take cur, $variant $( ($payload) )?), )+
                    other => Err($crate::Error::UnknownDiscriminant {
                        ty: stringify!($name).into(),
                        discriminant: other,
                    }),
                }
            }
        }
    };
}
