//! String-keyed enumerations.
//!
//! Statement fields and ratios travel through spreadsheets, JSON payloads and
//! OCR text as snake_case French identifiers. `keyed_enum!` declares a closed
//! enum whose variants map one-to-one onto those identifiers, so a misspelt
//! key is rejected at the boundary instead of silently producing no data.

macro_rules! keyed_enum {
    (
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$meta:meta])* $variant:ident => $key:literal ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$meta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Canonical snake_case identifier.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $key ),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::OhadaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $key => Ok($name::$variant), )+
                    other => Err($crate::error::OhadaError::UnknownField {
                        kind: $kind,
                        name: other.to_string(),
                    }),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}
