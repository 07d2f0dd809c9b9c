/// 自定义错误类型
#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    /// 同一所大学中学号重复
    #[error("duplicate student id `{student_id}` in {university}")]
    DuplicateIdentifier {
        university: String,
        student_id: String,
    },
    /// 大学名称重复
    #[error("university already registered: {0}")]
    DuplicateUniversity(String),
    /// 空的或非法的参数
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// 学号不存在
    #[error("student not found: {0}")]
    NotFound(String),
    /// 未注册的大学
    #[error("unknown university: {0}")]
    UnknownUniversity(String),
    /// 文件读取失败
    #[error("failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),
    /// 不符合预期的文件,如csv文件名称不符合预期
    #[error("unexpected file: {0}")]
    UnexpectedFileError(String),
    /// csv处理错误
    #[error("failed to parse csv: {0}")]
    CsvParseError(#[from] csv::Error),
    /// csv文件中的数据不符合预期
    #[error("csv data error: {0}")]
    CsvDataError(String),
    /// regex相关错误
    #[error("failed to parse or compile a regular expression: {0}")]
    RegexError(#[from] regex::Error),
    /// json序列化错误
    #[error("failed to write json: {0}")]
    JsonError(#[from] serde_json::Error),
    /// 异步加载任务失败
    #[error("loader task failed: {0}")]
    TaskError(String),
    /// 配置错误
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CredentialError>;
