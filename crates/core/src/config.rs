use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, SeqAccess, Unexpected, Visitor},
};

use crate::{ClientOptions, ConfigError};

/// Raw strings callers use to request a server-side `DEFAULT`.
pub const DEFAULT_SENTINELS: [&str; 2] = [":default", "default"];

const FOUND_ROWS_NAME: &str = "FOUND_ROWS";

/// Protocol capability bits that may be requested by name.
const NAMED_CLIENT_FLAGS: [(&str, u32); 17] = [
    ("LONG_PASSWORD", 1),
    ("FOUND_ROWS", 1 << 1),
    ("LONG_FLAG", 1 << 2),
    ("CONNECT_WITH_DB", 1 << 3),
    ("NO_SCHEMA", 1 << 4),
    ("COMPRESS", 1 << 5),
    ("ODBC", 1 << 6),
    ("LOCAL_FILES", 1 << 7),
    ("IGNORE_SPACE", 1 << 8),
    ("PROTOCOL_41", 1 << 9),
    ("INTERACTIVE", 1 << 10),
    ("SSL", 1 << 11),
    ("IGNORE_SIGPIPE", 1 << 12),
    ("TRANSACTIONS", 1 << 13),
    ("MULTI_STATEMENTS", 1 << 16),
    ("MULTI_RESULTS", 1 << 17),
    ("PS_MULTI_RESULTS", 1 << 18),
];

/// Flags the client cannot honor; TLS settings are never configured.
const UNSUPPORTED_CLIENT_FLAGS: [&str; 1] = ["SSL"];

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Default,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(RawConfig),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn is_default_sentinel(&self) -> bool {
        match self {
            Self::Default => true,
            Self::String(value) => DEFAULT_SENTINELS.contains(&value.as_str()),
            _ => false,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u16> for ConfigValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<RawConfig> for ConfigValue {
    fn from(value: RawConfig) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Caller-supplied options in their original order and key spelling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    entries: Vec<(String, ConfigValue)>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Replaces an existing entry in place, keeping its position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}

impl<'de> Deserialize<'de> for RawConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawConfigVisitor)
    }
}

struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a configuration value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(value)
            .map(ConfigValue::Integer)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Float(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::String(value))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        ConfigValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<ConfigValue>()? {
            items.push(item);
        }
        Ok(ConfigValue::List(items))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        RawConfigVisitor.visit_map(map).map(ConfigValue::Map)
    }
}

struct RawConfigVisitor;

impl<'de> Visitor<'de> for RawConfigVisitor {
    type Value = RawConfig;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a mapping of configuration options")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawConfig::new())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut config = RawConfig::new();
        while let Some((key, value)) = map.next_entry::<String, ConfigValue>()? {
            config.insert(key, value);
        }
        Ok(config)
    }
}

/// Canonical spelling of a top-level option name: `:Wait-Timeout` -> `wait_timeout`.
pub fn canonical_key(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(':')
        .to_ascii_lowercase()
        .replace('-', "_")
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue {
    Default,
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SessionValue {
    fn from_config(name: &str, value: &ConfigValue) -> Result<Self, ConfigError> {
        if value.is_default_sentinel() {
            return Ok(Self::Default);
        }

        match value {
            ConfigValue::Null => Ok(Self::Null),
            ConfigValue::Bool(value) => Ok(Self::Bool(*value)),
            ConfigValue::Integer(value) => Ok(Self::Integer(*value)),
            ConfigValue::Float(value) => Ok(Self::Float(*value)),
            ConfigValue::String(value) => Ok(Self::Text(value.clone())),
            ConfigValue::Default => Ok(Self::Default),
            ConfigValue::List(_) | ConfigValue::Map(_) => Err(ConfigError::invalid_value(
                format!("variables.{name}"),
                "a scalar session value",
            )),
        }
    }
}

impl From<&str> for SessionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SessionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Session variables in the order the caller listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionVariables {
    entries: Vec<(String, SessionValue)>,
}

impl SessionVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces an existing variable in place, keeping its position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SessionValue>,
    ) -> Option<SessionValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<SessionValue> {
        let position = self
            .entries
            .iter()
            .position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn get(&self, name: &str) -> Option<&SessionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SessionValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_config(value: &ConfigValue) -> Result<Self, ConfigError> {
        let raw = match value {
            ConfigValue::Null => return Ok(Self::new()),
            ConfigValue::Map(raw) => raw,
            _ => return Err(ConfigError::invalid_value("variables", "a mapping")),
        };

        let mut variables = Self::new();
        for (name, value) in raw.iter() {
            let name = name.trim_start_matches(':');
            if !is_variable_name(name) {
                return Err(ConfigError::InvalidVariableName {
                    name: name.to_string(),
                });
            }
            variables.insert(name, SessionValue::from_config(name, value)?);
        }
        Ok(variables)
    }
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.'))
}

/// Capability flags as the caller expressed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFlags {
    Bits(u32),
    /// Flag names; a leading `-` clears the flag instead of setting it.
    Named(Vec<String>),
}

impl Default for ClientFlags {
    fn default() -> Self {
        Self::Bits(0)
    }
}

impl ClientFlags {
    pub const FOUND_ROWS: u32 = 1 << 1;

    /// Adds "report matched rows" in the caller's own representation.
    pub fn with_found_rows(self) -> Self {
        match self {
            Self::Bits(bits) => Self::Bits(bits | Self::FOUND_ROWS),
            Self::Named(mut names) => {
                names.push(FOUND_ROWS_NAME.to_string());
                Self::Named(names)
            }
        }
    }

    /// Resolves the mask, rejecting bits the client cannot request.
    pub fn bits(&self) -> Result<u32, ConfigError> {
        let bits = match self {
            Self::Bits(bits) if bits & !known_flag_mask() != 0 => {
                return Err(ConfigError::invalid_value(
                    "flags",
                    "a mask of known client flags",
                ));
            }
            Self::Bits(bits) => *bits,
            Self::Named(names) => {
                let mut bits = 0;
                for name in names {
                    match name.strip_prefix('-') {
                        Some(cleared) => bits &= !named_flag_bit(cleared)?,
                        None => bits |= named_flag_bit(name)?,
                    }
                }
                bits
            }
        };

        for (name, bit) in NAMED_CLIENT_FLAGS {
            if bits & bit != 0 && UNSUPPORTED_CLIENT_FLAGS.contains(&name) {
                return Err(ConfigError::UnsupportedFlag {
                    name: name.to_string(),
                });
            }
        }
        Ok(bits)
    }

    pub fn contains_found_rows(&self) -> bool {
        self.bits()
            .map(|bits| bits & Self::FOUND_ROWS != 0)
            .unwrap_or(false)
    }

    fn from_config(value: &ConfigValue) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Null => Ok(Self::default()),
            ConfigValue::Integer(bits) => u32::try_from(*bits)
                .map(Self::Bits)
                .map_err(|_| ConfigError::invalid_value("flags", "a 32-bit capability mask")),
            ConfigValue::String(raw) => Ok(Self::Named(
                raw.split(|ch: char| ch.is_whitespace() || ch == ',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            ConfigValue::List(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ConfigError::invalid_value("flags", "a list of flag names"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Named),
            _ => Err(ConfigError::invalid_value(
                "flags",
                "a capability mask or a list of flag names",
            )),
        }
    }
}

fn known_flag_mask() -> u32 {
    NAMED_CLIENT_FLAGS.iter().fold(0, |mask, (_, bit)| mask | bit)
}

fn named_flag_bit(name: &str) -> Result<u32, ConfigError> {
    let normalized = name.trim().to_ascii_uppercase();
    let normalized = normalized.strip_prefix("CLIENT_").unwrap_or(&normalized);
    NAMED_CLIENT_FLAGS
        .iter()
        .find(|(flag, _)| *flag == normalized)
        .map(|(_, bit)| *bit)
        .ok_or_else(|| ConfigError::UnknownFlag {
            name: name.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictMode {
    Enabled,
    Disabled,
    /// Leave the server's `sql_mode` untouched.
    ServerDefault,
}

impl StrictMode {
    fn from_config(value: Option<&ConfigValue>) -> Self {
        let Some(value) = value else {
            return Self::Enabled;
        };
        if value.is_default_sentinel() {
            return Self::ServerDefault;
        }

        match value {
            ConfigValue::Null | ConfigValue::Bool(false) => Self::Disabled,
            ConfigValue::String(raw) if raw == "false" => Self::Disabled,
            _ => Self::Enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub socket: Option<String>,
    pub variables: SessionVariables,
    pub flags: ClientFlags,
    pub wait_timeout: Option<ConfigValue>,
    pub encoding: Option<String>,
    pub collation: Option<String>,
    pub prepared_statements: Option<bool>,
    pub strict: StrictMode,
    pub extra: BTreeMap<String, ConfigValue>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            socket: None,
            variables: SessionVariables::new(),
            flags: ClientFlags::default(),
            wait_timeout: None,
            encoding: None,
            collation: None,
            prepared_statements: None,
            strict: StrictMode::Enabled,
            extra: BTreeMap::new(),
        }
    }
}

impl ConnectionConfig {
    /// Canonicalizes keys and casts every recognized option to its typed field.
    /// Entries apply in caller order, so the last spelling of an option wins.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let strict = raw
            .iter()
            .filter(|(key, _)| canonical_key(key) == "strict")
            .last()
            .map(|(_, value)| value);
        let mut config = Self {
            strict: StrictMode::from_config(strict),
            ..Self::default()
        };

        for (key, value) in raw.iter() {
            let key = canonical_key(key);
            let value = value.clone();
            match key.as_str() {
                "host" => config.host = string_option(&key, &value)?,
                "port" => config.port = port_option(&value)?,
                "user" | "username" => config.user = string_option(&key, &value)?,
                "password" => config.password = string_option(&key, &value)?,
                "database" | "dbname" | "db" => config.database = string_option(&key, &value)?,
                "socket" => config.socket = string_option(&key, &value)?,
                "variables" => config.variables = SessionVariables::from_config(&value)?,
                "flags" => config.flags = ClientFlags::from_config(&value)?,
                "wait_timeout" => config.wait_timeout = Some(value),
                "encoding" => config.encoding = string_option(&key, &value)?,
                "collation" => config.collation = string_option(&key, &value)?,
                "prepared_statements" => config.prepared_statements = Some(boolean_cast(&value)),
                "strict" => {}
                _ => {
                    config.extra.insert(key, value);
                }
            }
        }

        config.flags.bits()?;
        Ok(config)
    }

    /// `wait_timeout` when it is an integer or an all-digit string.
    pub fn wait_timeout_seconds(&self) -> Option<i64> {
        match self.wait_timeout.as_ref()? {
            ConfigValue::Integer(seconds) => Some(*seconds),
            ConfigValue::String(raw) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => {
                raw.parse().ok()
            }
            _ => None,
        }
    }

    /// Prepared statements stay off unless the caller configured them.
    pub fn prepared_statements(&self) -> bool {
        self.prepared_statements.unwrap_or(false)
    }

    pub fn client_options(&self) -> Result<ClientOptions, ConfigError> {
        Ok(ClientOptions {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            socket: self.socket.clone(),
            flags: self.flags.bits()?,
        })
    }
}

fn string_option(key: &str, value: &ConfigValue) -> Result<Option<String>, ConfigError> {
    match value {
        ConfigValue::Null => Ok(None),
        ConfigValue::String(value) => Ok(Some(value.clone())),
        _ => Err(ConfigError::invalid_value(key, "a string")),
    }
}

fn port_option(value: &ConfigValue) -> Result<Option<u16>, ConfigError> {
    let invalid = || ConfigError::invalid_value("port", "a TCP port number");
    match value {
        ConfigValue::Null => Ok(None),
        ConfigValue::Integer(port) => u16::try_from(*port).map(Some).map_err(|_| invalid()),
        ConfigValue::String(raw) => raw.trim().parse::<u16>().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn boolean_cast(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Null | ConfigValue::Bool(false) => false,
        ConfigValue::String(raw) => raw != "false",
        _ => true,
    }
}
