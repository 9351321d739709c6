//! 服务器启动 / 运行期错误
//!
//! 请求级错误使用 [`crate::utils::AppError`]；这里只覆盖进程级失败。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("对象存储错误: {0}")]
    Storage(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<surrealdb::Error> for ServerError {
    fn from(err: surrealdb::Error) -> Self {
        ServerError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
