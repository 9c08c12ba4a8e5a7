//! 파일 필터 모듈
//!
//! 확장자(접미사) 목록과 glob 패턴을 사용한 대상 파일 선별을 담당합니다.

use glob::Pattern;

use crate::error::{CodePackError, Result};

/// 아카이브 대상 파일 판별기
///
/// 접미사는 대소문자를 구분하는 문자 그대로의 비교이며 glob이 아닙니다.
#[derive(Debug, Default, Clone)]
pub struct FileFilter {
    extensions: Option<Vec<String>>,
    pattern: Option<Pattern>,
}

impl FileFilter {
    /// 새 필터 생성
    ///
    /// # Arguments
    /// * `extensions` - 허용할 접미사 목록 (None이면 모든 파일 허용)
    /// * `pattern` - 파일 이름에 적용할 glob 패턴 (None이면 검사 안 함)
    ///
    /// # Examples
    /// ```
    /// use codepack::filter::FileFilter;
    ///
    /// let filter = FileFilter::new(Some(vec![".py".to_string()]), None).unwrap();
    /// assert!(filter.matches("a.py"));
    /// assert!(!filter.matches("a.txt"));
    /// ```
    pub fn new(extensions: Option<Vec<String>>, pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| CodePackError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self {
            extensions,
            pattern: compiled,
        })
    }

    /// 파일 이름이 필터를 통과하는지 확인
    pub fn matches(&self, file_name: &str) -> bool {
        let suffix_ok = match &self.extensions {
            Some(exts) => exts.iter().any(|ext| file_name.ends_with(ext.as_str())),
            None => true,
        };

        suffix_ok
            && self
                .pattern
                .as_ref()
                .map(|p| p.matches(file_name))
                .unwrap_or(true)
    }
}

/// 쉼표로 구분된 접미사 문자열을 목록으로 변환
///
/// 공백은 잘라내고 빈 항목은 버립니다.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_filter() {
        let filter = FileFilter::new(Some(vec![".py".to_string()]), None).unwrap();
        assert!(filter.matches("a.py"));
        assert!(!filter.matches("a.txt"));
        assert!(!filter.matches("a.pyc"));
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        let filter = FileFilter::new(Some(vec![".py".to_string()]), None).unwrap();
        assert!(!filter.matches("A.PY"));
    }

    #[test]
    fn test_suffix_is_literal_not_glob() {
        let filter = FileFilter::new(Some(vec!["*.py".to_string()]), None).unwrap();
        assert!(!filter.matches("a.py"));
        assert!(filter.matches("weird*.py"));

        // 점 없는 접미사도 그대로 비교
        let filter = FileFilter::new(Some(vec!["py".to_string()]), None).unwrap();
        assert!(filter.matches("setup.py"));
        assert!(filter.matches("happy"));
    }

    #[test]
    fn test_no_extensions_accepts_all() {
        let filter = FileFilter::new(None, None).unwrap();
        assert!(filter.matches("a.py"));
        assert!(filter.matches("a.txt"));
        assert!(filter.matches("Makefile"));
    }

    #[test]
    fn test_empty_extension_list_rejects_all() {
        let filter = FileFilter::new(Some(Vec::new()), None).unwrap();
        assert!(!filter.matches("a.py"));
    }

    #[test]
    fn test_pattern_combined_with_suffix() {
        let filter = FileFilter::new(
            Some(vec![".rs".to_string(), ".toml".to_string()]),
            Some("[a-m]*".to_string()),
        )
        .unwrap();
        assert!(filter.matches("lib.rs"));
        assert!(!filter.matches("Cargo.toml"));
        assert!(!filter.matches("main.py"));
        assert!(!filter.matches("parser.rs"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileFilter::new(None, Some("[invalid".to_string()));
        assert!(matches!(result, Err(CodePackError::InvalidPattern { .. })));
    }

    #[test]
    fn test_parse_extensions() {
        let exts = parse_extensions(".py, .rs,,  .toml ");
        assert_eq!(exts, vec![".py", ".rs", ".toml"]);
        assert!(parse_extensions(" , ").is_empty());
    }
}
