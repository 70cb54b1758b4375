//! 密码哈希
//!
//! bcrypt 封装。登录失败路径也执行一次比对, 使"邮箱不存在"和
//! "密码错误"的耗时无法区分。

use crate::utils::AppError;

/// 未命中用户时用于等时比对的哈希 ("placeholder", cost 10)
const DUMMY_HASH: &str = "$2b$10$CwTycUXWue0Thq9StjUM0uJ8ZAEiJY3rFP9BJJFIPGKTteNI1a/2W";

pub fn hash(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost).map_err(|e| AppError::Internal(format!("bcrypt hash: {e}")))
}

pub fn verify(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash).map_err(|e| AppError::Internal(format!("bcrypt verify: {e}")))
}

/// 执行一次必然失败的比对, 拉平未命中路径的响应时间
pub fn equalize_timing(password: &str) {
    let _ = bcrypt::verify(password, DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash("s3cret!", 4).unwrap();
        assert!(verify("s3cret!", &hashed).unwrap());
        assert!(!verify("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_equalize_timing_does_not_panic() {
        equalize_timing("anything");
    }
}
