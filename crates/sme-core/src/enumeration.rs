//! Macro for defining closed, string-backed enumerations.
//!
//! Every enumeration in the manifest schema has the same shape: a fixed set of
//! lowercase wire names, a field label used in diagnostics, and the same trait
//! impls (Display, FromStr, Serialize, Deserialize, and
//! [`Enumeration`](crate::schema::Enumeration)). This macro generates all of
//! that from a single invocation.

/// Define a closed enumeration with lowercase wire names.
///
/// Generates:
/// - The enum with `Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord`
/// - An [`Enumeration`](crate::schema::Enumeration) impl listing all variants
/// - `Display` and `FromStr` using the wire names
/// - `Serialize` as the wire name, `Deserialize` rejecting unknown names
macro_rules! define_enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis enum $Name:ident ($field:literal) {
            $(
                $(#[$vmeta:meta])*
                $Variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $Name {
            $(
                $(#[$vmeta])*
                $Variant,
            )+
        }

        impl $crate::schema::Enumeration for $Name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$($Name::$Variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($Name::$Variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(<$Name as $crate::schema::Enumeration>::as_str(self))
            }
        }

        impl std::str::FromStr for $Name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$Name as $crate::schema::Enumeration>::parse(s).ok_or_else(|| {
                    format!(
                        "unknown {} '{}', expected one of: {}",
                        $field,
                        s,
                        <$Name as $crate::schema::Enumeration>::allowed_values()
                    )
                })
            }
        }

        impl serde::Serialize for $Name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(<$Name as $crate::schema::Enumeration>::as_str(self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(<D::Error as serde::de::Error>::custom)
            }
        }
    };
}

pub(crate) use define_enumeration;
