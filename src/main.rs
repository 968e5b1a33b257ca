mod args;

use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;

use args::{Args, Command};
use mregion::analysis;
use mregion::annotations::handle_msg;
use mregion::calibration::format_general;
use mregion::config::AppConfig;
use mregion::domain::AnnotationSet;
use mregion::image_source::{ImageInfo, load_image_preview};
use mregion::render;
use mregion::session::{Msg, Session};
use mregion::store;
use mregion::training::TrainingSet;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = AppConfig::load();

    match args.command {
        Command::Report {
            annotations,
            image,
            json,
            output,
        } => {
            let set = read_annotations(&annotations, image.as_deref())?;
            let report = analysis::generate_report(&set)
                .with_context(|| format!("cannot report on {}", annotations.display()))?;
            let text = if json {
                serde_json::to_string_pretty(&report)?
            } else {
                report.to_string()
            };
            match output {
                Some(path) => std::fs::write(&path, text + "\n")
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{text}"),
            }
        }
        Command::Overlay {
            annotations,
            image,
            output,
            max_side,
        } => {
            let set = read_annotations(&annotations, None)?;
            let max_side = max_side.unwrap_or(config.preview_max_side);
            let (mut preview, scale, _) = load_image_preview(&image, max_side)?;
            render::image::draw_overlay(&mut preview, &set, scale);
            preview
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            log::info!("Overlay written to {}", output.display());
        }
        Command::Inspect { annotations } => {
            let set = read_annotations(&annotations, None)?;
            inspect(&config, set);
        }
        Command::Mask {
            annotations,
            label,
            output,
            image,
        } => {
            let set = read_annotations(&annotations, image.as_deref())?;
            let training = TrainingSet::from_annotations(&set);
            if training.class_index(&label).is_none() {
                bail!("{label:?} is not a label in {}", annotations.display());
            }
            if training.region_count(&label) == 0 {
                bail!("label {label:?} has no regions in {}", annotations.display());
            }
            let grid = analysis::raster_grid(&set)?;
            let mask = render::label_mask(&set, &label, grid)?;
            mask.save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            log::info!("Mask for {} written to {}", label, output.display());
        }
    }
    Ok(())
}

/// Load an annotation file, taking the image size from `image` when given
fn read_annotations(path: &Path, image: Option<&Path>) -> anyhow::Result<AnnotationSet> {
    let mut set = store::read_file(path)?;
    if let Some(image) = image {
        let info = ImageInfo::probe(image)?;
        if !set.image.sha256.is_empty() && set.image.sha256 != info.sha256 {
            log::warn!(
                "{} does not match the image the annotations were made on",
                image.display()
            );
        }
        set.image = info.identity();
    }
    Ok(set)
}

fn inspect(config: &AppConfig, set: AnnotationSet) {
    let mut session = Session::new(config);
    session.open_image(set.image.clone());
    handle_msg(&mut session, Msg::Loaded(Box::new(set)));

    let image = &session.annotations().image;
    println!("Image: {} [{}x{}]", image.path, image.size.0, image.size.1);
    println!("Labels: {}", session.labels().names().join(", "));
    match session.calibration() {
        Some(cal) => println!(
            "Scale: {} {}/px",
            format_general(cal.units_per_pixel),
            cal.unit
        ),
        None => println!("Scale: not set"),
    }
    for entry in session.lists().iter() {
        println!("{}", entry.text);
    }
}
