/// Declares a setting catalogue.
///
/// Generates the enum itself plus lookups for each variant's storage key, the
/// key an older panel stored it under, its domain, its default and whether a
/// change has to be confirmed by the remote authority.
#[macro_export]
macro_rules! settings {
    (
        $( #[ $meta:meta ] )*
        pub enum $name:ident {
            $(
                $( #[ doc = $doc:expr ] )*
                $variant:ident {
                    key: $key:literal,
                    legacy_key: $legacy:expr,
                    domain: $domain:expr,
                    default: $default:expr,
                    remote: $remote:expr $(,)?
                }
            ),* $(,)?
        }
    ) => {
        #[derive($crate::_serde::Serialize, $crate::_serde::Deserialize)]
        $( #[ $meta ] )*
        pub enum $name {
            $(
                $( #[ doc = $doc ] )*
                #[serde(rename = $key)]
                $variant,
            )*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$( Self::$variant ),*];

            /// Key in the persistent store, also the display name
            pub const fn key(&self) -> &'static str {
                match self {
                    $( Self::$variant => $key, )*
                }
            }

            pub const fn legacy_key(&self) -> ::core::option::Option<&'static str> {
                match self {
                    $( Self::$variant => $legacy, )*
                }
            }

            pub const fn domain(&self) -> $crate::Domain {
                match self {
                    $( Self::$variant => $domain, )*
                }
            }

            pub const fn default_value(&self) -> $crate::SettingValue {
                match self {
                    $( Self::$variant => $default, )*
                }
            }

            /// Whether a change must be committed to the remote authority
            pub const fn is_remote(&self) -> bool {
                match self {
                    $( Self::$variant => $remote, )*
                }
            }
        }
    };
}
