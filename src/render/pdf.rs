//! printpdf backend that turns a composed layout into PDF bytes
//!
//! Layout coordinates are millimetres from the page top-left; PDF user
//! space grows upward from the bottom-left, so every `y` flips through
//! the page height on the way out. Text positions are already baselines,
//! images are placed by their lower-left corner.

use std::collections::HashMap;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Rgb,
};

use crate::render::layout::{DocumentLayout, DrawOp, FontFace, PAGE_HEIGHT, PAGE_WIDTH};
use crate::render::{RenderError, RenderResult};

/// Stroke width of cell borders and rules, in points (0.2 mm)
const BORDER_THICKNESS_PT: f32 = 0.2 * 72.0 / 25.4;

pub(crate) fn materialize(layout: &DocumentLayout, title: &str) -> RenderResult<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    // Decoded once per distinct path, placed once per occurrence
    let mut images: HashMap<PathBuf, DynamicImage> = HashMap::new();

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.set_outline_thickness(BORDER_THICKNESS_PT);

        for op in &page.ops {
            match op {
                DrawOp::Text { x, y, face, size, text } => {
                    let font = match face {
                        FontFace::Regular => &regular,
                        FontFace::Bold => &bold,
                        FontFace::Italic => &italic,
                    };
                    layer.use_text(
                        text.as_str(),
                        *size as f32,
                        Mm(*x as f32),
                        Mm((PAGE_HEIGHT - y) as f32),
                        font,
                    );
                }
                DrawOp::Rule { x1, x2, y } => {
                    let height = Mm((PAGE_HEIGHT - y) as f32);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(Mm(*x1 as f32), height), false),
                            (Point::new(Mm(*x2 as f32), height), false),
                        ],
                        is_closed: false,
                    });
                }
                DrawOp::CellRect { x, y, w, h, fill, border } => {
                    draw_cell(&layer, *x, *y, *w, *h, *fill, *border);
                }
                DrawOp::Image { path, x, y, width } => {
                    let dynamic = cached_image(&mut images, path)?;
                    place_image(&layer, dynamic, *x, *y, *width);
                }
            }
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn draw_cell(
    layer: &PdfLayerReference,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    fill: Option<(u8, u8, u8)>,
    border: bool,
) {
    let left = Mm(x as f32);
    let right = Mm((x + w) as f32);
    let top = Mm((PAGE_HEIGHT - y) as f32);
    let bottom = Mm((PAGE_HEIGHT - y - h) as f32);
    let corners = vec![
        (Point::new(left, bottom), false),
        (Point::new(right, bottom), false),
        (Point::new(right, top), false),
        (Point::new(left, top), false),
    ];

    if let Some((r, g, b)) = fill {
        layer.set_fill_color(Color::Rgb(Rgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            None,
        )));
        layer.add_polygon(Polygon {
            rings: vec![corners],
            mode: if border { PaintMode::FillStroke } else { PaintMode::Fill },
            winding_order: WindingOrder::NonZero,
        });
    } else if border {
        layer.add_line(Line { points: corners, is_closed: true });
    }
}

fn cached_image<'a>(
    cache: &'a mut HashMap<PathBuf, DynamicImage>,
    path: &Path,
) -> RenderResult<&'a DynamicImage> {
    if !cache.contains_key(path) {
        if !path.exists() {
            return Err(RenderError::AssetMissing(path.to_path_buf()));
        }
        let dynamic = image_crate::open(path).map_err(|e| RenderError::ImageLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cache.insert(path.to_path_buf(), dynamic);
    }
    Ok(&cache[path])
}

/// Place `dynamic` with its top-left at (`x`, `y`), scaled so its rendered
/// width is `width` millimetres
fn place_image(layer: &PdfLayerReference, dynamic: &DynamicImage, x: f64, y: f64, width: f64) {
    let (px_w, px_h) = dynamic.dimensions();
    let dpi = f64::from(px_w) * 25.4 / width;
    let height = f64::from(px_h) * width / f64::from(px_w);
    Image::from_dynamic_image(dynamic).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x as f32)),
            translate_y: Some(Mm((PAGE_HEIGHT - y - height) as f32)),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );
}
