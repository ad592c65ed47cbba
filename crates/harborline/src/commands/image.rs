//! ローカルイメージ操作のコマンドハンドラ

use colored::Colorize;
use harborline::{EngineError, ImageOps};
use harborline_engine::SpinnerSink;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn engine_error(e: EngineError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

/// `KEY=VALUE` 形式のビルド引数を解析
pub fn parse_build_args(args: &[String]) -> anyhow::Result<HashMap<String, String>> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| anyhow::anyhow!("ビルド引数は KEY=VALUE 形式で指定してください: {}", arg))
        })
        .collect()
}

pub async fn handle_build(
    ops: &ImageOps,
    image: &str,
    path: &Path,
    build_args: &[String],
) -> anyhow::Result<()> {
    let args = parse_build_args(build_args)?;

    let spinner = Arc::new(SpinnerSink::new(&format!("Building {}...", image)));
    let engine = ops.engine().clone().with_sink(spinner.clone());

    let args = (!args.is_empty()).then_some(&args);
    match engine.build(image, path, args).await {
        Ok(image_id) => {
            spinner.finish("Build completed ✓");
            println!("{} {} ({})", "✓".green(), image.cyan(), image_id.dimmed());
            Ok(())
        }
        Err(e) => {
            spinner.finish_error(&e.to_string());
            Err(engine_error(e))
        }
    }
}

pub async fn handle_pull(
    ops: &ImageOps,
    image: &str,
    auth: bool,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    println!("  ↓ {}", image.cyan());
    let engine = ops.engine();
    let result = match timeout {
        Some(secs) => {
            engine
                .pull_with_timeout(image, auth, Duration::from_secs(secs))
                .await
        }
        None => engine.pull(image, auth).await,
    };
    result.map_err(engine_error)?;
    println!("  {} Pulled", "✓".green());
    Ok(())
}

pub async fn handle_push(
    ops: &ImageOps,
    image: &str,
    auth: bool,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    println!("  ↑ {}", image.cyan());
    let engine = ops.engine();
    let result = match timeout {
        Some(secs) => {
            engine
                .push_with_timeout(image, auth, Duration::from_secs(secs))
                .await
        }
        None => engine.push(image, auth).await,
    };
    result.map_err(engine_error)?;
    println!("  {} Pushed", "✓".green());
    Ok(())
}

pub async fn handle_tag(ops: &ImageOps, source: &str, target: &str) -> anyhow::Result<()> {
    ops.engine()
        .copy(source, target)
        .await
        .map_err(engine_error)?;
    println!("{} {} {} {}", "✓".green(), source, "→".dimmed(), target.cyan());
    Ok(())
}

pub async fn handle_images(ops: &ImageOps, filter: Option<&str>) -> anyhow::Result<()> {
    let images = ops
        .engine()
        .list_images(filter)
        .await
        .map_err(engine_error)?;

    if images.is_empty() {
        println!("  {}", "(なし)".dimmed());
        return Ok(());
    }

    for image in images {
        let id = image.id.trim_start_matches("sha256:");
        let short_id = &id[..id.len().min(12)];
        let created = chrono::DateTime::from_timestamp(image.created, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let names = if image.repo_tags.is_empty() {
            "<none>".to_string()
        } else {
            image.repo_tags.join(", ")
        };
        println!(
            "  {:<14} {:<18} {}",
            short_id.yellow(),
            created.dimmed(),
            names
        );
    }
    Ok(())
}

pub async fn handle_rmi(ops: &ImageOps, image: &str, by_id: bool) -> anyhow::Result<()> {
    let engine = ops.engine();
    if by_id {
        engine.remove_image_by_id(image).await
    } else {
        engine.remove_image(image).await
    }
    .map_err(engine_error)?;
    println!("{} Removed {}", "✓".green(), image);
    Ok(())
}
