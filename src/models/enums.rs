use serde::{Deserialize, Serialize};

/// Macro to generate a fieldless enum with a stable lowercase `as_str`
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Valence {
    Positive => "positive",
    Negative => "negative",
    Neutral => "neutral",
});

str_enum!(Tab {
    Home => "home",
    Tools => "tools",
    Learn => "learn",
    Insights => "insights",
    Me => "me",
});
