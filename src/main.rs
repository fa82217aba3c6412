use anyhow::{bail, Context};
use clap::Parser;
use psd_web_extract::{cli, config, document, export, interactive, logger, pipeline, raster, runner, scanner};
use cli::{Cli, Commands};
use config::Config;
use export::EmitterKind;
use pipeline::ExportOptions;
use raster::FontStore;
use runner::ExtractJob;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);
    let mut config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        None => {
            let Some(choices) = interactive::prompt(&config)? else {
                return Ok(());
            };

            let fonts = FontStore::from_resolved(config.resolve_font(choices.font.as_deref()).as_deref());
            let job = ExtractJob {
                input: choices.input,
                output_dir: choices.output_dir,
                // 非表示レイヤーは対話での回答を優先する
                options: ExportOptions {
                    include_invisible: choices.include_invisible,
                    ..config.export_options(false, false)
                },
                emitters: config.default_profile.emitters(),
                show_progress: !cli.verbose,
            };

            let result = runner::run_job(&job, &fonts)?;
            runner::print_result(&result);
            println!("\n✅ 書き出し完了");
        }

        Some(Commands::Extract {
            input,
            output,
            invisible,
            expand_smart,
            font,
            profile,
            emit,
            no_progress,
        }) => {
            println!("🎨 psd-web - レイヤー書き出し\n");

            // フォントは起動時に一度だけ決める
            let fonts = FontStore::from_resolved(config.resolve_font(font.as_deref()).as_deref());
            if let Some(path) = fonts.path() {
                tracing::info!("フォント: {}", path.display());
            }

            let emitters = if emit.is_empty() {
                profile.unwrap_or(config.default_profile).emitters()
            } else {
                emit
            };
            let options = config.export_options(invisible, expand_smart);

            if input.is_dir() {
                run_batch(&input, output.as_deref(), options, &emitters, &fonts, !no_progress && !cli.verbose)?;
            } else {
                let job = ExtractJob {
                    output_dir: output.unwrap_or_else(|| runner::default_output_dir(&input)),
                    input,
                    options,
                    emitters,
                    show_progress: !no_progress && !cli.verbose,
                };
                let result = runner::run_job(&job, &fonts)?;
                runner::print_result(&result);
                println!("\n✅ 書き出し完了");
            }
        }

        Some(Commands::Info { input }) => {
            let doc = document::Document::open(&input)?;
            let info = doc.info();
            let summary = doc.summary();

            println!("📄 {}", doc.file_name());
            println!("  サイズ: {} × {} px (縦横比 {:.2})", info.width, info.height, info.aspect_ratio());
            println!("  カラーモード: {}", info.color_mode);
            println!("  ビット深度: {}bit", info.bit_depth);
            println!("レイヤー構成:");
            println!("  総レイヤー: {}", summary.total_layers);
            println!("  表示: {}", summary.visible_layers);
            println!("  テキスト: {}", summary.text_layers);
            println!("  スマートオブジェクト: {}", summary.smart_objects);
            println!("  調整レイヤー: {}", summary.adjustment_layers);
            println!("  画像: {}", summary.pixel_layers);
            println!("  シェイプ: {}", summary.shape_layers);
            println!("  グループ: {}", summary.layer_groups);
        }

        Some(Commands::Config { show, add_font, reset_fonts }) => {
            let mut changed = false;

            if reset_fonts {
                config.font_fallbacks = config::default_font_fallbacks();
                changed = true;
                println!("✔ フォント候補を既定に戻しました");
            }

            if let Some(path) = add_font {
                config.add_font(path.clone())?;
                changed = true;
                println!("✔ フォントを追加しました: {}", path.display());
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  出力プロファイル: {}", config.default_profile);
                println!("  非表示レイヤー: {}", if config.include_invisible { "書き出す" } else { "書き出さない" });
                println!("  スマートオブジェクト展開: {}", if config.expand_smart_objects { "する" } else { "しない" });
                println!("  フォント候補:");
                for path in &config.font_fallbacks {
                    let mark = if path.is_file() { "✔" } else { " " };
                    println!("    {} {}", mark, path.display());
                }
                match config.resolve_font(None) {
                    Some(path) => println!("  使用フォント: {}", path.display()),
                    None => println!("  使用フォント: なし"),
                }
            }
        }
    }

    Ok(())
}

/// フォルダ内のPSDをまとめて処理する。1ファイルの失敗で全体は止めない
fn run_batch(
    folder: &Path,
    output: Option<&Path>,
    options: ExportOptions,
    emitters: &[EmitterKind],
    fonts: &FontStore,
    show_progress: bool,
) -> anyhow::Result<()> {
    let files = scanner::scan_folder(folder)?;
    println!("✔ {}個のPSDを検出\n", files.len());
    if files.is_empty() {
        return Ok(());
    }

    let root = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut failed = Vec::new();

    for (i, input) in files.iter().enumerate() {
        println!("━━ ({}/{}) {} ━━", i + 1, files.len(), input.display());
        let job = ExtractJob {
            input: input.clone(),
            output_dir: root.join(runner::default_output_dir(input)),
            options,
            emitters: emitters.to_vec(),
            show_progress,
        };

        match runner::run_job(&job, fonts) {
            Ok(result) => runner::print_result(&result),
            Err(e) => {
                println!("❌ {}: {}", input.display(), e);
                failed.push(input.clone());
            }
        }
        println!();
    }

    if !failed.is_empty() {
        bail!("{}/{} 個のファイルで失敗しました", failed.len(), files.len());
    }

    println!("✅ すべて完了");
    Ok(())
}
