use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkcoreError {
    EmptyUrl(String),
    InvalidCustomToken(String),
    DuplicateCustomToken(String),
    StoreUnavailable(String),
    CacheUnavailable(String),
    Internal(String),
    DatabaseConfig(String),
    CachePluginNotFound(String),
    FileOperation(String),
    Serialization(String),
    DateParse(String),
}

impl LinkcoreError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkcoreError::EmptyUrl(_) => "E001",
            LinkcoreError::InvalidCustomToken(_) => "E002",
            LinkcoreError::DuplicateCustomToken(_) => "E003",
            LinkcoreError::StoreUnavailable(_) => "E004",
            LinkcoreError::CacheUnavailable(_) => "E005",
            LinkcoreError::Internal(_) => "E006",
            LinkcoreError::DatabaseConfig(_) => "E007",
            LinkcoreError::CachePluginNotFound(_) => "E008",
            LinkcoreError::FileOperation(_) => "E009",
            LinkcoreError::Serialization(_) => "E010",
            LinkcoreError::DateParse(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkcoreError::EmptyUrl(_) => "Empty URL",
            LinkcoreError::InvalidCustomToken(_) => "Invalid Custom Token",
            LinkcoreError::DuplicateCustomToken(_) => "Duplicate Custom Token",
            LinkcoreError::StoreUnavailable(_) => "Store Unavailable",
            LinkcoreError::CacheUnavailable(_) => "Cache Unavailable",
            LinkcoreError::Internal(_) => "Internal Error",
            LinkcoreError::DatabaseConfig(_) => "Database Configuration Error",
            LinkcoreError::CachePluginNotFound(_) => "Cache Plugin Not Found",
            LinkcoreError::FileOperation(_) => "File Operation Error",
            LinkcoreError::Serialization(_) => "Serialization Error",
            LinkcoreError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkcoreError::EmptyUrl(msg)
            | LinkcoreError::InvalidCustomToken(msg)
            | LinkcoreError::DuplicateCustomToken(msg)
            | LinkcoreError::StoreUnavailable(msg)
            | LinkcoreError::CacheUnavailable(msg)
            | LinkcoreError::Internal(msg)
            | LinkcoreError::DatabaseConfig(msg)
            | LinkcoreError::CachePluginNotFound(msg)
            | LinkcoreError::FileOperation(msg)
            | LinkcoreError::Serialization(msg)
            | LinkcoreError::DateParse(msg) => msg,
        }
    }

    /// Caller input errors: reported as-is, never retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LinkcoreError::EmptyUrl(_)
                | LinkcoreError::InvalidCustomToken(_)
                | LinkcoreError::DuplicateCustomToken(_)
                | LinkcoreError::DateParse(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkcoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkcoreError {}

// 便捷的构造函数
impl LinkcoreError {
    pub fn empty_url<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::EmptyUrl(msg.into())
    }

    pub fn invalid_custom_token<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::InvalidCustomToken(msg.into())
    }

    pub fn duplicate_custom_token<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::DuplicateCustomToken(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::StoreUnavailable(msg.into())
    }

    pub fn cache_unavailable<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::CacheUnavailable(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::Internal(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::DatabaseConfig(msg.into())
    }

    pub fn cache_plugin_not_found<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::CachePluginNotFound(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkcoreError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkcoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkcoreError::StoreUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for LinkcoreError {
    fn from(err: redis::RedisError) -> Self {
        LinkcoreError::CacheUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for LinkcoreError {
    fn from(err: std::io::Error) -> Self {
        LinkcoreError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkcoreError {
    fn from(err: serde_json::Error) -> Self {
        LinkcoreError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkcoreError {
    fn from(err: chrono::ParseError) -> Self {
        LinkcoreError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkcoreError>;
