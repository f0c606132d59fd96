//! JSON Schema + Markdown生成ツール
//!
//! src/domain/config.rsの設定構造から以下を自動生成します：
//! 1. JSON Schema (schema/config.json)
//! 2. Markdownドキュメント (CONFIGURATION.md)
//!
//! 実行方法:
//! ```
//! cargo run --bin generate_schema
//! ```

use schemars::schema_for;
use serde_json::{Map, Value};
use std::fs;
use ZedsDead::domain::config::AppConfig;

fn main() {
    println!("JSON Schema + Markdown生成中...");

    // AppConfigからJSON Schemaを生成
    let schema = schema_for!(AppConfig);

    // JSON文字列に変換（prettify）
    let json = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema to JSON");

    // schema/ディレクトリを作成
    fs::create_dir_all("schema").expect("Failed to create schema/ directory");

    fs::write("schema/config.json", json.clone()).expect("Failed to write schema/config.json");
    println!("  ✓ schema/config.json");

    // JSON Schemaをパースしてマークダウン生成
    let schema_value: Value =
        serde_json::from_str(&json).expect("Failed to parse generated schema");
    let markdown = generate_markdown(&schema_value);

    fs::write("CONFIGURATION.md", markdown).expect("Failed to write CONFIGURATION.md");
    println!("  ✓ CONFIGURATION.md");

    println!("✅ 生成完了: schema/config.json + CONFIGURATION.md");
}

/// JSON Schemaからマークダウンドキュメントを生成
fn generate_markdown(schema: &Value) -> String {
    let mut md = String::new();

    // ヘッダー
    md.push_str("# 設定リファレンス (Configuration Reference)\n\n");

    md.push_str("## 概要\n\n");
    md.push_str("`config.toml`ファイルは、ZedsDeadスキャナの動作を制御する設定ファイルです。\n");
    md.push_str("JSON Schemaによる検証により、設定の正確性が保証されています。\n\n");

    md.push_str("**設定ファイルの場所**: `config.toml` (プロジェクトルート)  \n");
    md.push_str("**スキーマファイル**: `schema/config.json` (自動生成)  \n");
    md.push_str("**サンプル**: `config.toml.example`\n\n");

    md.push_str("⚠️ **注意**: このドキュメント（CONFIGURATION.md）は `cargo run --bin generate_schema` で自動生成されます。\n");
    md.push_str("設定項目の説明を変更する場合は、`src/domain/config.rs`のdoc commentsを編集してください。\n\n");

    md.push_str("## 設定ファイルの読み込み\n\n");
    md.push_str("- `config.toml`が存在する場合: ファイルから読み込み\n");
    md.push_str("- ファイルが存在しない場合: デフォルト値を使用（警告ログ出力）\n");
    md.push_str("- パース失敗時: デフォルト値を使用（警告ログ出力）\n\n");

    md.push_str("## 設定項目\n\n");

    // $defsを取得してマップを作成
    let defs = schema
        .get("$defs")
        .and_then(|d| d.as_object())
        .cloned()
        .unwrap_or_default();

    // トップレベルの各セクションを処理
    if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
        for (key, prop) in props {
            generate_section(&mut md, key, prop, &defs);
        }
    }

    // フッター
    md.push_str("## 参考\n\n");
    md.push_str("- `config.toml.example` - 全項目を記載したサンプル設定\n");
    md.push_str("- `cargo run --bin generate_schema` - このドキュメントの再生成\n");

    md
}

/// 1つの設定セクション（[camera]等）を生成
fn generate_section(md: &mut String, key: &str, schema: &Value, defs: &Map<String, Value>) {
    md.push_str(&format!("### [{}] - {}\n\n", key, section_title(key)));

    if let Some(desc) = schema.get("description").and_then(|d| d.as_str()) {
        md.push_str(&format!("{}\n\n", desc));
    }

    // セクションは$refで$defsを参照する
    let section_schema = resolve_ref(schema, defs).unwrap_or(schema);

    if let Some(props) = section_schema
        .get("properties")
        .and_then(|p| p.as_object())
    {
        if props.is_empty() {
            return;
        }

        md.push_str("| 設定項目 | 型 | デフォルト | 説明 |\n");
        md.push_str("|---------|-----|---------|---------|\n");

        for (prop_key, prop_schema) in props {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                prop_key,
                type_string(prop_schema),
                default_value(prop_schema),
                description(prop_schema)
            ));
        }
        md.push_str("\n");
    }
}

/// $ref参照を$defsから解決する
fn resolve_ref<'a>(schema: &Value, defs: &'a Map<String, Value>) -> Option<&'a Value> {
    let ref_str = schema.get("$ref").and_then(|r| r.as_str())?;
    let def_name = ref_str.strip_prefix("#/$defs/")?;
    defs.get(def_name)
}

/// 型名を文字列で取得
fn type_string(schema: &Value) -> String {
    if let Some(type_val) = schema.get("type").and_then(|t| t.as_str()) {
        return match type_val {
            "integer" | "number" => schema
                .get("format")
                .and_then(|f| f.as_str())
                .unwrap_or(type_val)
                .to_string(),
            "boolean" => "bool".to_string(),
            other => other.to_string(),
        };
    }

    "unknown".to_string()
}

/// デフォルト値を取得
fn default_value(schema: &Value) -> String {
    match schema.get("default") {
        Some(Value::String(s)) => format!("`\"{}\"`", s),
        Some(Value::Number(n)) => format!("`{}`", n),
        Some(Value::Bool(b)) => format!("`{}`", b),
        _ => "-".to_string(),
    }
}

/// 説明文を取得（改行・パイプはテーブル用にエスケープ）
fn description(schema: &Value) -> String {
    match schema.get("description").and_then(|d| d.as_str()) {
        Some(desc) => desc
            .replace("\n\n", "<br><br>")
            .replace("\n", " ")
            .replace("|", "\\|"),
        None => "-".to_string(),
    }
}

/// セクション名の日本語タイトル
fn section_title(key: &str) -> String {
    match key {
        "camera" => "カメラ入力設定".to_string(),
        "decoder" => "デコーダ設定".to_string(),
        "display" => "表示ウィンドウ設定".to_string(),
        "scanner" => "スキャンループ設定".to_string(),
        "keys" => "キーバインド設定".to_string(),
        _ => key.to_string(),
    }
}
