/// Declares a closed enum whose wire form is a fixed string per variant.
///
/// The string table is the single source for serde, `Display` and `FromStr`;
/// strings outside the table are rejected.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    _ => Err(anyhow::anyhow!(
                        "Invalid {}: {}",
                        stringify!($name),
                        s
                    )),
                }
            }
        }
    };
}

pub mod builds;
pub mod common;
pub mod git;
pub mod teams;
pub mod work_items;

pub use builds::*;
pub use common::*;
pub use git::*;
pub use teams::*;
pub use work_items::*;
