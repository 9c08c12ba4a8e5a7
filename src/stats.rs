//! 통계 및 유틸리티 모듈
//!
//! 아카이브 작업 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 크기 제한으로 제외된 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// 스캔 루트 기준 상대 경로
    pub path: String,
    /// 디스크 상 파일 크기
    pub size: u64,
}

/// 기록된 에러 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

/// 저장된 아카이브 하나의 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    /// 아카이브 파일 경로
    pub path: PathBuf,
    /// 포함된 레코드 수
    pub records: usize,
    /// 레코드 단독 직렬화 크기의 합
    pub measured_bytes: u64,
}

/// 아카이브 작업 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 내용이 기록된 파일 수
    pub content_count: usize,
    /// 에러 레코드로 기록된 파일
    pub failed: Vec<FailedFile>,
    /// 크기 초과로 제외된 파일
    pub skipped: Vec<SkippedFile>,
    /// 읽은 총 바이트
    pub total_bytes_read: u64,
    /// 레코드 직렬화 크기 합계
    pub total_record_bytes: u64,
    /// 저장된 아카이브 목록
    pub archives: Vec<ArchiveInfo>,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 내용 레코드 추가
    pub fn add_content(&mut self, file_size: u64, record_bytes: u64) {
        self.content_count += 1;
        self.total_bytes_read += file_size;
        self.total_record_bytes += record_bytes;
    }

    /// 에러 레코드 추가
    pub fn add_failure(&mut self, path: &str, error: &str, record_bytes: u64) {
        self.failed.push(FailedFile {
            path: path.to_string(),
            error: error.to_string(),
        });
        self.total_record_bytes += record_bytes;
    }

    /// 제외된 파일 추가
    pub fn add_skipped(&mut self, path: &str, size: u64) {
        self.skipped.push(SkippedFile {
            path: path.to_string(),
            size,
        });
    }

    /// 저장된 아카이브 추가
    pub fn add_archive(&mut self, info: ArchiveInfo) {
        self.archives.push(info);
    }

    /// 저장된 아카이브 수
    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    /// 레코드로 기록된 파일 수 (내용 + 에러)
    pub fn record_count(&self) -> usize {
        self.content_count + self.failed.len()
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        let errors = self.failed.len();

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 기록된 파일:  {}",
            "📁".bright_cyan(),
            self.record_count()
        );
        println!(
            "  {} 성공:         {}",
            "✅".bright_green(),
            self.content_count.to_string().green()
        );

        if errors > 0 {
            println!(
                "  {} 읽기 실패:    {}",
                "❌".bright_red(),
                errors.to_string().red()
            );
        } else {
            println!("  {} 읽기 실패:    {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 크기 제외:    {}",
            "⏭️".bright_yellow(),
            self.skipped.len()
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.total_bytes_read)
        );
        println!(
            "  {} 레코드 용량:  {}",
            "📤".bright_magenta(),
            format_bytes(self.total_record_bytes)
        );
        println!(
            "  {} 아카이브 수:  {}",
            "📦".bright_white(),
            self.archive_count().to_string().bright_green()
        );

        for archive in &self.archives {
            println!(
                "     {} {:?} ({}개, {})",
                "•".bright_blue(),
                archive.path.file_name().unwrap_or_default(),
                archive.records,
                format_bytes(archive.measured_bytes)
            );
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use codepack::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_statistics_counters() {
        let mut stats = Statistics::new();

        stats.add_content(100, 130);
        stats.add_content(50, 70);
        stats.add_failure("bad.bin", "Unable to read file: x", 40);
        stats.add_skipped("huge.log", 9_000_000);
        stats.add_archive(ArchiveInfo {
            path: PathBuf::from("out/1_repository_code.json"),
            records: 3,
            measured_bytes: 240,
        });

        assert_eq!(stats.content_count, 2);
        assert_eq!(stats.record_count(), 3);
        assert_eq!(stats.total_bytes_read, 150);
        assert_eq!(stats.total_record_bytes, 240);
        assert_eq!(stats.skipped[0].size, 9_000_000);
        assert_eq!(stats.archive_count(), 1);
    }
}
