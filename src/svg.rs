use crate::{
    palette::hex_color,
    render::{Primitive, VectorImage},
};

/// Serialize to SVG text, one `<rect>` per primitive.
pub fn to_svg(image: &VectorImage) -> String {
    let size = image.size;
    let mut svg = format!(
        r#"<svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" xmlns="http://www.w3.org/2000/svg""#
    );
    if image.crisp_edges {
        svg.push_str(r#" shape-rendering="crispEdges""#);
    }
    svg.push('>');
    for p in &image.primitives {
        match p {
            Primitive::Background { color } => {
                svg.push_str(&format!(
                    r##"<rect width="100%" height="100%" fill="#{}" />"##,
                    hex_color(*color)
                ));
            }
            Primitive::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                svg.push_str(&format!(
                    r##"<rect width="{}" height="{}" x="{}" y="{}" fill="#{}" />"##,
                    width,
                    height,
                    x,
                    y,
                    hex_color(*color)
                ));
            }
        }
    }
    svg.push_str("</svg>");
    svg
}
