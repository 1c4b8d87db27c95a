use std::fmt;

/// A single flag value forwarded to the Shopware console
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FlagValue {
    /// Interpret the raw value of a `--key=value` argument
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() && !raw.trim().is_empty() => Self::Number(n),
            _ => Self::Text(raw.to_string()),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered set of console flags
///
/// Keys keep their insertion order; setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleFlags {
    entries: Vec<(String, FlagValue)>,
}

impl ConsoleFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FlagValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FlagValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize into command line arguments
    ///
    /// - `false` becomes `--no-<key>`, `true` becomes `--<key>`
    /// - numbers become `--<key>=<n>`
    /// - strings containing whitespace are double quoted
    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, value)| match value {
                FlagValue::Bool(false) => format!("--no-{}", key),
                FlagValue::Bool(true) => format!("--{}", key),
                FlagValue::Number(_) => format!("--{}={}", key, value),
                FlagValue::Text(s) if s.chars().any(char::is_whitespace) => {
                    format!("--{}=\"{}\"", key, s)
                }
                FlagValue::Text(s) => format!("--{}={}", key, s),
            })
            .collect()
    }
}

/// Arguments forwarded verbatim by `console` and `tools`, split into input and flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardedArgs {
    pub input: Vec<String>,
    pub flags: ConsoleFlags,
}

impl ForwardedArgs {
    /// Split raw arguments: anything starting with `--` is a flag, the rest is input
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            let Some(flag) = arg.strip_prefix("--").filter(|f| !f.is_empty()) else {
                parsed.input.push(arg.to_string());
                continue;
            };

            if let Some((key, value)) = flag.split_once('=') {
                parsed.flags.set(key, FlagValue::parse(value));
            } else if let Some(key) = flag.strip_prefix("no-") {
                parsed.flags.set(key, false);
            } else {
                parsed.flags.set(flag, true);
            }
        }
        parsed
    }
}
