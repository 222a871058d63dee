//! Macro for defining non-empty string newtypes used as identifiers.

/// Define a strongly-typed, non-empty string newtype.
///
/// Generates the struct (`Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
/// Serialize`), a `Deserialize` impl that rejects empty strings, `try_new()`,
/// `as_str()`, `Display`, `AsRef<str>`, `Deref<Target=str>`, `Borrow<str>`
/// and `PartialEq<&str>`.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s)
                    .ok_or_else(|| serde::de::Error::custom(concat!(stringify!($Name), " must not be empty")))
            }
        }

        impl $Name {
            /// Try to create a new instance, returning `None` if the value is empty
            /// or only whitespace.
            pub fn try_new(value: impl Into<String>) -> Option<Self> {
                let s = value.into();
                if s.trim().is_empty() { None } else { Some(Self(s)) }
            }

            /// Return the underlying value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

define_newtype_string! {
    /// Logical name of a migrated schema (e.g. `marigold`).
    ///
    /// Used for log context, prompts, and to key credential lookups.
    pub struct SchemaName;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_name_rejects_blank() {
        assert!(SchemaName::try_new("").is_none());
        assert!(SchemaName::try_new("   ").is_none());
        assert_eq!(SchemaName::try_new("marigold").unwrap(), "marigold");
    }

    #[test]
    fn test_schema_name_deserialize_rejects_empty() {
        let err = serde_yaml::from_str::<SchemaName>("''").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
        let name: SchemaName = serde_yaml::from_str("marigoldData").unwrap();
        assert_eq!(name.as_str(), "marigoldData");
    }
}
