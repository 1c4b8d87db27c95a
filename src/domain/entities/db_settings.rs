use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

/// Default MySQL port when a connection url does not name one
pub const DEFAULT_DB_PORT: &str = "3306";

/// Connection parameters of the shop database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub dbname: Option<String>,
}

impl DbSettings {
    /// Parse `mysql://[user[:password]@]host[:port]/[database]`
    ///
    /// The scheme is optional. Unparseable input yields empty settings.
    pub fn from_url(uri: &str) -> Self {
        let uri = uri.trim();
        if uri.is_empty() {
            return Self::default();
        }

        let with_scheme = if uri.contains("://") {
            uri.to_string()
        } else {
            format!("mysql://{}", uri)
        };

        let Ok(parsed) = Url::parse(&with_scheme) else {
            return Self::default();
        };

        let database = parsed.path().trim_start_matches('/');
        Self {
            username: Some(percent_decode(parsed.username())).filter(|u| !u.is_empty()),
            password: parsed.password().map(percent_decode),
            host: parsed.host_str().map(str::to_string).filter(|h| !h.is_empty()),
            port: Some(
                parsed
                    .port()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| DEFAULT_DB_PORT.to_string()),
            ),
            dbname: Some(percent_decode(database)).filter(|d| !d.is_empty()),
        }
    }

    /// Parse the `db` section of a Shopware `config.php`
    ///
    /// Comments are stripped, then every `'key' => 'value'` pair is picked up.
    /// Escaped quotes and backslashes inside the values are unescaped.
    pub fn from_config_php(source: &str) -> Self {
        let cleaned = strip_php_comments(source);
        let lookup = |key: &str| -> Option<String> {
            let pattern = format!(
                r#"['"]{}['"]\s*=>\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
                regex::escape(key)
            );
            let captures = Regex::new(&pattern).ok()?.captures(&cleaned)?;
            match (captures.get(1), captures.get(2)) {
                (Some(single), _) => Some(php_unescape(single.as_str(), '\'')),
                (None, Some(double)) => Some(php_unescape(double.as_str(), '"')),
                _ => None,
            }
        };

        Self {
            username: lookup("username"),
            password: lookup("password"),
            host: lookup("host"),
            port: lookup("port"),
            dbname: lookup("dbname"),
        }
    }

    /// Fill every missing key from `fallback`
    pub fn or(self, fallback: DbSettings) -> Self {
        Self {
            username: non_empty(self.username).or(fallback.username),
            password: non_empty(self.password).or(fallback.password),
            host: non_empty(self.host).or(fallback.host),
            port: non_empty(self.port).or(fallback.port),
            dbname: non_empty(self.dbname).or(fallback.dbname),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn strip_php_comments(source: &str) -> String {
    let block = Regex::new(r"(?s)/\*.*?\*/").map(|re| re.replace_all(source, "").into_owned());
    let without_blocks = block.unwrap_or_else(|_| source.to_string());

    match Regex::new(r"(?m)(^|[^:])//.*$") {
        Ok(re) => re.replace_all(&without_blocks, "$1").into_owned(),
        Err(_) => without_blocks,
    }
}

fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Undo the escaping of backslashes and of the enclosing quote in a PHP string literal
fn php_unescape(value: &str, quote: char) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next == '\\' || next == quote || (quote == '"' && next == '$') => {
                unescaped.push(next)
            }
            Some(next) => {
                unescaped.push('\\');
                unescaped.push(next);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}
