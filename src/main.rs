//! codepack - SOURCE TREE TO JSON ARCHIVE SPLITTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use codepack::{
    archiver::{ensure_no_archives, remove_archives, Archiver},
    cli::{Args, WriteMode},
    logger::setup_logging,
    stats::{format_bytes, Statistics},
};

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose);

    // 옵션 검증
    let options = args.to_options()?;

    // 헤더 출력
    print_header(&args);

    // 출력 폴더 모드 처리
    prepare_output(&args)?;

    println!("\n{}", "📁 파일 탐색 중...".bright_cyan());

    let pb = create_spinner();
    let stats = Archiver::new(&args.output, options)?
        .with_progress(pb.clone())
        .run(&args.input)
        .with_context(|| format!("아카이브 생성 실패: {:?}", args.input))?;
    pb.finish_and_clear();

    // 제외/에러 파일 출력
    print_skipped(&stats);
    print_errors(&stats, args.verbose);

    // 보고서 작성
    if let Some(ref log_path) = args.log {
        write_report(log_path, &stats)?;
    }

    if stats.archive_count() == 0 {
        println!("\n{}", "⚠️ 아카이브할 파일이 없습니다.".yellow());
    } else {
        // 통계 출력
        stats.print_summary();
    }

    if args.dry_run {
        println!(
            "\n{} 드라이런 완료: {} 개의 아카이브가 {:?}에 생성될 예정입니다.\n",
            "ℹ️".bright_blue(),
            stats.archive_count().to_string().bright_green(),
            args.output
        );
    } else {
        println!(
            "\n{} JSON 파일 생성 위치: {:?}\n",
            "✅".bright_green(),
            args.output
        );
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 📦 SOURCE TREE TO JSON ARCHIVE SPLITTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);
    println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    println!(
        "  {} 아카이브 최대: {} MB / 파일 제외: {} MB 초과",
        "📏".bright_white(),
        args.max_size_mb,
        args.exclude_size_mb
    );

    match args.get_extensions() {
        Some(exts) => println!("  {} 접미사: {}", "🔍".bright_magenta(), exts.join(", ")),
        None => println!("  {} 접미사: 전체", "🔍".bright_magenta()),
    }

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🎯".bright_cyan(), pattern);
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📐".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 저장 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 출력 폴더 모드 처리
fn prepare_output(args: &Args) -> Result<()> {
    match args.mode {
        WriteMode::Overwrite => {}
        WriteMode::Error => ensure_no_archives(&args.output)?,
        WriteMode::Clean if args.dry_run => {}
        WriteMode::Clean => {
            let removed = remove_archives(&args.output)?;
            if removed > 0 {
                println!(
                    "  {} 기존 아카이브 {}개 삭제",
                    "🧹".bright_yellow(),
                    removed
                );
            }
        }
    }
    Ok(())
}

/// 진행 스피너 생성
fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} 파일 {wide_msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 크기 제한으로 제외된 파일 출력
fn print_skipped(stats: &Statistics) {
    for skipped in &stats.skipped {
        println!(
            "  {} 큰 파일 건너뜀: {} ({})",
            "⏭️".bright_yellow(),
            skipped.path,
            format_bytes(skipped.size)
        );
    }
}

/// 에러 레코드 목록 출력
fn print_errors(stats: &Statistics, verbose: bool) {
    if stats.failed.is_empty() {
        return;
    }

    println!("\n{}", "❌ 읽기 실패 파일 (에러 레코드로 기록됨):".bright_red());
    for failed in &stats.failed {
        println!("  {} {}", "•".red(), failed.path);
        if verbose {
            println!("    {}", failed.error.dimmed());
        }
    }
}

/// 에러/제외 보고서 작성
fn write_report(log_path: &Path, stats: &Statistics) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("보고서 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "codepack 보고서")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "아카이브 수: {}", stats.archive_count())?;
    writeln!(log_file, "에러 레코드 수: {}", stats.failed.len())?;
    writeln!(log_file, "제외 파일 수: {}", stats.skipped.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for failed in &stats.failed {
        writeln!(log_file, "\n파일: {}", failed.path)?;
        writeln!(log_file, "에러: {}", failed.error)?;
    }

    for skipped in &stats.skipped {
        writeln!(log_file, "\n제외: {}", skipped.path)?;
        writeln!(log_file, "크기: {} 바이트", skipped.size)?;
    }

    println!("\n{} 보고서 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
