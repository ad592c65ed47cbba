//! レジストリ操作のコマンドハンドラ

use colored::Colorize;
use harborline::{ImageOps, Label, RegistryClient};

fn registry(ops: &ImageOps) -> anyhow::Result<&RegistryClient> {
    ops.registry().ok_or_else(|| {
        anyhow::anyhow!(
            "レジストリが設定されていません\n\
             ヒント: registry_url / registry_username / registry_password を設定ファイルか\n\
             HARBORLINE_REGISTRY_* 環境変数で指定してください"
        )
    })
}

pub async fn handle_exists(ops: &ImageOps, image: &str) -> anyhow::Result<()> {
    if registry(ops)?.exists(image).await {
        println!("{} {} exists", "✓".green(), image.cyan());
        Ok(())
    } else {
        anyhow::bail!("{} はレジストリに存在しません", image)
    }
}

pub async fn handle_untag(ops: &ImageOps, image: &str) -> anyhow::Result<()> {
    if registry(ops)?.remove_tag(image).await {
        println!("{} Removed tag {}", "✓".green(), image.cyan());
        Ok(())
    } else {
        anyhow::bail!("タグの削除に失敗しました: {}", image)
    }
}

pub async fn handle_tags(ops: &ImageOps, namespace: &str, repository: &str) -> anyhow::Result<()> {
    let tags = registry(ops)?
        .get_tags(namespace, repository)
        .await
        .ok_or_else(|| anyhow::anyhow!("タグ一覧を取得できません: {}/{}", namespace, repository))?;

    println!("{}  {}/{}", "Tags:".bold(), namespace, repository.cyan());
    if tags.is_empty() {
        println!("  {}", "(なし)".dimmed());
    }
    for tag in tags {
        let created = tag
            .created
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<24} {}", tag.name.green(), created.dimmed());
    }
    Ok(())
}

pub async fn handle_project_id(ops: &ImageOps, name: &str) -> anyhow::Result<()> {
    let id = registry(ops)?
        .get_project_id_by_name(name)
        .await
        .ok_or_else(|| anyhow::anyhow!("プロジェクトが見つかりません: {}", name))?;
    println!("{}", id);
    Ok(())
}

pub async fn handle_label_get(
    ops: &ImageOps,
    name: &str,
    project_id: Option<i64>,
) -> anyhow::Result<()> {
    let label = registry(ops)?
        .get_label_by_name(name, project_id)
        .await
        .ok_or_else(|| anyhow::anyhow!("ラベルが見つかりません: {}", name))?;
    println!("{}", serde_json::to_string_pretty(&label)?);
    Ok(())
}

pub async fn handle_label_add(
    ops: &ImageOps,
    name: &str,
    description: Option<String>,
    project_id: Option<i64>,
) -> anyhow::Result<()> {
    let mut label = Label::new(name);
    if let Some(description) = description {
        label = label.with_description(description);
    }
    if let Some(project_id) = project_id {
        label = label.with_project_id(project_id);
    }

    if registry(ops)?.add_label(label).await {
        println!("{} Created label {}", "✓".green(), name.cyan());
        Ok(())
    } else {
        anyhow::bail!("ラベルの作成に失敗しました: {}", name)
    }
}

pub async fn handle_label_update(
    ops: &ImageOps,
    id: i64,
    name: &str,
    description: Option<String>,
) -> anyhow::Result<()> {
    let mut label = Label::new(name);
    if let Some(description) = description {
        label = label.with_description(description);
    }

    if registry(ops)?.update_label(id, &label).await {
        println!("{} Updated label #{}", "✓".green(), id);
        Ok(())
    } else {
        anyhow::bail!("ラベルの更新に失敗しました: #{}", id)
    }
}
