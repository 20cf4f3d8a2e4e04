//! Styled terminal summary of a geometry buffer

use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use objview_core::{GeometryBuffer, MaterialColor};
use std::io::Write;

pub fn write_summary<W: Write>(
    writer: &mut W,
    source: &str,
    model: &GeometryBuffer,
) -> std::io::Result<()> {
    writer.queue(SetForegroundColor(Color::Yellow))?;
    writer.queue(Print(format!("objview | {}\n", source)))?;
    writer.queue(ResetColor)?;

    writer.queue(Print(format!(
        "  {} positions, {} normals, {} texcoords, {} triangles\n",
        model.positions.len(),
        model.normals.len(),
        model.texcoords.len(),
        model.triangle_count()
    )))?;
    writer.queue(Print(format!(
        "  corner normals: {}, corner texcoords: {}\n",
        presence(model.normal_indices.is_some()),
        presence(model.texcoord_indices.is_some())
    )))?;

    match model.bounds() {
        Some((min, max)) => writer.queue(Print(format!(
            "  bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})\n",
            min.x, min.y, min.z, max.x, max.y, max.z
        )))?,
        None => writer.queue(Print("  bounds: empty\n"))?,
    };

    let color = model.material_color;
    writer.queue(Print(format!(
        "  material: rgba({:.2}, {:.2}, {:.2}, {:.2}) ",
        color.r, color.g, color.b, color.a
    )))?;
    writer.queue(SetBackgroundColor(swatch(color)))?;
    writer.queue(Print("    "))?;
    writer.queue(ResetColor)?;
    writer.queue(Print('\n'))?;

    writer.flush()
}

fn presence(present: bool) -> &'static str {
    if present {
        "yes"
    } else {
        "no"
    }
}

/// Terminal color for a material, alpha dropped
fn swatch(color: MaterialColor) -> Color {
    Color::Rgb {
        r: (color.r * 255.0).round() as u8,
        g: (color.g * 255.0).round() as u8,
        b: (color.b * 255.0).round() as u8,
    }
}
