//! 레코드 모듈
//!
//! 개별 파일을 읽어 `{path, content}` 또는 `{path, error}` 레코드로 만들고,
//! 레코드 하나의 직렬화 크기를 계산합니다.

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;

/// 에러 레코드 메시지 접두어
pub const READ_ERROR_PREFIX: &str = "Unable to read file: ";

/// 파일 하나의 처리 결과
///
/// 아카이브에는 태그 없이 `path`와 `content` 또는 `error` 필드만 기록됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    /// 텍스트로 읽은 파일
    Content { path: String, content: String },
    /// 읽지 못한 파일
    Error { path: String, error: String },
}

impl Record {
    /// 성공 레코드 생성
    pub fn content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Record::Content {
            path: path.into(),
            content: content.into(),
        }
    }

    /// 읽기 실패 레코드 생성
    pub fn unreadable(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Record::Error {
            path: path.into(),
            error: format!("{}{}", READ_ERROR_PREFIX, reason),
        }
    }

    /// 스캔 루트 기준 상대 경로
    pub fn path(&self) -> &str {
        match self {
            Record::Content { path, .. } | Record::Error { path, .. } => path,
        }
    }

    /// 에러 레코드 여부
    pub fn is_error(&self) -> bool {
        matches!(self, Record::Error { .. })
    }

    /// 레코드 단독 직렬화 크기 (바이트)
    ///
    /// 아카이브 분할 기준으로 쓰이는 값입니다. `", "`/`": "` 구분자를 쓰는 압축 JSON에
    /// ASCII 이외 문자를 `\uXXXX`로 이스케이프한 길이이므로, 디스크에 쓰이는
    /// 아카이브 인코딩이나 원본 파일 크기와 다를 수 있습니다.
    pub fn serialized_size(&self) -> Result<u64> {
        let mut counter = ByteCounter::default();
        let mut ser = serde_json::Serializer::with_formatter(&mut counter, MeasureFormatter);
        self.serialize(&mut ser)?;
        Ok(counter.count)
    }
}

/// 파일 읽기 옵션
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// 단일 파일을 읽어 레코드 생성
///
/// 읽기 실패는 에러로 전파하지 않고 에러 레코드로 바꿉니다.
///
/// # Arguments
/// * `path` - 읽을 파일 경로
/// * `relative` - 레코드에 기록할 상대 경로
/// * `file_size` - 디스크 상 파일 크기
/// * `options` - 읽기 옵션
pub fn read_record(path: &Path, relative: String, file_size: u64, options: &ReadOptions) -> Record {
    let result = if file_size > 0 && file_size >= options.mmap_threshold {
        read_with_mmap(path)
    } else {
        std::fs::read_to_string(path)
    };

    match result {
        Ok(content) => Record::Content {
            path: relative,
            content,
        },
        Err(e) => Record::unreadable(relative, e),
    }
}

/// 메모리 매핑을 사용한 텍스트 읽기 (대용량 파일용)
fn read_with_mmap(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    std::str::from_utf8(&mmap)
        .map(str::to_owned)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// 쓰인 바이트 수만 세는 writer
#[derive(Default)]
struct ByteCounter {
    count: u64,
}

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 크기 측정용 포매터
///
/// `é`는 `{"path": "a", "content": "\u00e9"}` 처럼 출력됩니다.
struct MeasureFormatter;

impl Formatter for MeasureFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        for ch in fragment.chars() {
            if ch.is_ascii() && ch != '\x7f' {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_serialized_size_ascii() {
        let record = Record::content("a.py", "x = 1\n");
        let expected = r#"{"path": "a.py", "content": "x = 1\n"}"#;
        assert_eq!(record.serialized_size().unwrap(), expected.len() as u64);
    }

    #[test]
    fn test_serialized_size_escapes_non_ascii() {
        let record = Record::content("k.txt", "é");
        let expected = r#"{"path": "k.txt", "content": "\u00e9"}"#;
        assert_eq!(record.serialized_size().unwrap(), expected.len() as u64);

        // BMP 밖의 문자는 서로게이트 쌍 두 개로 계산
        let record = Record::content("e.txt", "😀");
        let expected = r#"{"path": "e.txt", "content": "\ud83d\ude00"}"#;
        assert_eq!(record.serialized_size().unwrap(), expected.len() as u64);
    }

    #[test]
    fn test_serialized_size_control_and_del() {
        let record = Record::content("c", "\u{1}\u{7f}\"\\");
        let expected = r#"{"path": "c", "content": "\u0001\u007f\"\\"}"#;
        assert_eq!(record.serialized_size().unwrap(), expected.len() as u64);
    }

    #[test]
    fn test_serialized_size_error_record() {
        let record = Record::unreadable("bad.bin", "boom");
        let expected = r#"{"path": "bad.bin", "error": "Unable to read file: boom"}"#;
        assert_eq!(record.serialized_size().unwrap(), expected.len() as u64);
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::content("a.py", "print()");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({"path": "a.py", "content": "print()"}));

        let record = Record::unreadable("b.bin", "nope");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"path": "b.bin", "error": "Unable to read file: nope"})
        );
    }

    #[test]
    fn test_record_deserialize_both_kinds() {
        let content: Record =
            serde_json::from_str(r#"{"path": "a", "content": "x"}"#).unwrap();
        assert_eq!(content, Record::content("a", "x"));

        let error: Record = serde_json::from_str(r#"{"path": "b", "error": "e"}"#).unwrap();
        assert!(error.is_error());
        assert_eq!(error.path(), "b");
    }

    #[test]
    fn test_read_record_keeps_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("crlf.txt");
        fs::write(&path, "line1\r\nline2\r\n").unwrap();

        let record = read_record(&path, "crlf.txt".to_string(), 14, &ReadOptions::default());
        assert_eq!(record, Record::content("crlf.txt", "line1\r\nline2\r\n"));
    }

    #[test]
    fn test_read_record_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bin.dat");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let record = read_record(&path, "bin.dat".to_string(), 4, &ReadOptions::default());
        match record {
            Record::Error { path, error } => {
                assert_eq!(path, "bin.dat");
                assert!(error.starts_with(READ_ERROR_PREFIX));
            }
            other => panic!("expected error record, got {:?}", other),
        }
    }

    #[test]
    fn test_read_record_with_mmap() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.txt");
        fs::write(&path, "héllo").unwrap();

        let options = ReadOptions { mmap_threshold: 1 };
        let record = read_record(&path, "big.txt".to_string(), 6, &options);
        assert_eq!(record, Record::content("big.txt", "héllo"));

        fs::write(&path, [0x61, 0xff]).unwrap();
        let record = read_record(&path, "big.txt".to_string(), 2, &options);
        assert!(record.is_error());
    }

    #[test]
    fn test_read_record_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.txt");

        let record = read_record(&path, "gone.txt".to_string(), 0, &ReadOptions::default());
        assert!(record.is_error());
    }
}
