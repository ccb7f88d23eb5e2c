//! Declarative macros generating the wire impls for message payloads.
//!
//! The field types carry their own encodings (see [`crate::fields`]), so a
//! payload declaration is just an ordered field list — the generated
//! [`Serializable`](crate::Serializable) impl writes fields in declaration
//! order and the [`Deserializable`](crate::Deserializable) impl reads them
//! back, tagging any failure with the field's name.

/// Declare a message payload (or nested record) with generated wire impls.
#[macro_export]
macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $fty, )*
        }

        impl $crate::Serializable for $name {
            fn serialize(&self, _buf: &mut impl Extend<u8>) {
                $( $crate::Serializable::serialize(&self.$field, _buf); )*
            }
        }

        impl $crate::Deserializable for $name {
            fn deserialize(
                _buf: $crate::deserialize::Buffer<'_, '_>,
            ) -> $crate::deserialize::Result<Self> {
                Ok(Self {
                    $(
                        $field: $crate::Deserializable::deserialize(_buf)
                            .map_err(|e| e.for_field(stringify!($field)))?,
                    )*
                })
            }
        }
    };
}

/// Declare a wire enum over a `u8` or `u16` discriminant.
///
/// An unlisted discriminant on the wire is an
/// [`UnknownDiscriminant`](crate::deserialize::Error::UnknownDiscriminant)
/// error.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $repr:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        #[repr($repr)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $crate::Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                <$repr as $crate::Serializable>::serialize(&(*self as $repr), buf);
            }
        }

        impl $crate::Deserializable for $name {
            fn deserialize(
                buf: $crate::deserialize::Buffer<'_, '_>,
            ) -> $crate::deserialize::Result<Self> {
                match <$repr as $crate::Deserializable>::deserialize(buf)? {
                    $( $value => Ok(Self::$variant), )+
                    other => Err($crate::deserialize::Error::UnknownDiscriminant {
                        value: other as u32,
                    }),
                }
            }
        }
    };
}

/// Bind a payload struct to its command word, optionally classifying it as a
/// command message (one that carries the leading `sequence` correlation byte).
#[macro_export]
macro_rules! impl_body {
    ($ty:ident, $word:literal) => {
        impl $crate::MessageBody for $ty {
            const WORD: u16 = $word;
        }
    };
    ($ty:ident, $word:literal, command) => {
        impl $crate::MessageBody for $ty {
            const WORD: u16 = $word;
            const IS_COMMAND: bool = true;

            fn command_seq(&self) -> Option<u8> {
                Some(self.sequence)
            }

            fn set_command_seq(&mut self, seq: u8) {
                self.sequence = seq;
            }
        }
    };
}
