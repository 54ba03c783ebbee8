//! SVG output with nested node groups
//!
//! Every node becomes a `<g class="node">` holding its own shape in a
//! `node-self` group and, for directories, a `subtree` group with the edges to
//! its children followed by the children's groups. Hiding a `subtree` hides
//! the whole descendant drawing, which is what collapsing relies on.

use std::f64::consts::TAU;

use crate::error::RenderError;
use crate::layout::{AngleRange, EPSILON, Extent, Geometry, LayoutStrategy, Point};
use crate::tree::{Node, NodeStatus};

use super::Scene;
use super::utils::{label, num, tooltip, xml_escape};

const TOGGLE_SCRIPT: &str = r#"(function () {
  var selfs = document.querySelectorAll('g.node.directory > g.node-self');
  Array.prototype.forEach.call(selfs, function (self) {
    self.addEventListener('click', function (event) {
      event.stopPropagation();
      var group = self.parentNode;
      var collapsed = group.getAttribute('data-collapsed') !== 'true';
      group.setAttribute('data-collapsed', collapsed ? 'true' : 'false');
      group.classList.toggle('collapsed', collapsed);
      var subtree = group.querySelector(':scope > g.subtree');
      if (subtree) {
        subtree.style.display = collapsed ? 'none' : '';
      }
    });
  });
})();"#;

/// SVG formatter; accumulates the document in a string.
struct SvgFormatter<'s, 'a> {
    scene: &'s Scene<'a>,
    interactive: bool,
    output: String,
    next_index: usize,
}

pub(super) fn render(scene: &Scene<'_>, interactive: bool) -> Result<String, RenderError> {
    let mut formatter = SvgFormatter {
        scene,
        interactive,
        output: String::new(),
        next_index: 0,
    };
    formatter.write_document()?;
    Ok(formatter.output)
}

impl SvgFormatter<'_, '_> {
    fn write_document(&mut self) -> Result<(), RenderError> {
        let viewport = self.scene.geometry.viewport;
        let strategy = self.scene.geometry.strategy;
        let theme = &self.scene.config.theme;

        self.output.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" class=\"treeviz treeviz-{s}\" data-strategy=\"{s}\">\n",
            w = num(viewport.width),
            h = num(viewport.height),
            s = strategy,
        ));
        self.output.push_str(&format!(
            "<title>{}</title>\n",
            xml_escape(self.scene.title())
        ));

        let edge_opacity = match strategy {
            LayoutStrategy::Treemap | LayoutStrategy::Sunburst => 0.25,
            _ => 1.0,
        };
        let cursor = if self.interactive {
            "g.node.directory > g.node-self { cursor: pointer; }\n"
        } else {
            ""
        };
        self.output.push_str(&format!(
            "<style>\n\
             .node-self .shape {{ stroke-width: 1px; }}\n\
             .directory > .node-self .shape {{ fill: {df}; stroke: {ds}; stroke-width: 2px; }}\n\
             .file > .node-self .shape {{ fill: {ff}; stroke: {fs}; }}\n\
             .partial > .node-self .shape {{ fill: {pf}; stroke: {ps}; stroke-dasharray: 4 2; }}\n\
             .edge {{ fill: none; stroke: {e}; stroke-opacity: {eo}; }}\n\
             text {{ font-family: {font}; font-size: {fsz}px; fill: {t}; }}\n\
             {cursor}</style>\n",
            df = theme.directory_fill,
            ds = theme.directory_stroke,
            ff = theme.file_fill,
            fs = theme.file_stroke,
            pf = theme.partial_fill,
            ps = theme.partial_stroke,
            e = theme.edge,
            eo = edge_opacity,
            font = theme.font_family,
            fsz = num(theme.font_size),
            t = theme.text,
            cursor = cursor,
        ));
        self.output.push_str(&format!(
            "<rect class=\"background\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            num(viewport.width),
            num(viewport.height),
            theme.background
        ));

        self.output.push_str("<g class=\"tree\">\n");
        self.write_node(self.scene.root, 1)?;
        self.output.push_str("</g>\n");

        if self.interactive {
            self.output.push_str("<script type=\"application/ecmascript\"><![CDATA[\n");
            self.output.push_str(TOGGLE_SCRIPT);
            self.output.push_str("\n]]></script>\n");
        }
        self.output.push_str("</svg>\n");
        Ok(())
    }

    fn write_node(&mut self, node: &Node, level: usize) -> Result<(), RenderError> {
        let geometry = self.scene.geometry_of(node)?;
        let indent = "  ".repeat(level);
        let index = self.next_index;
        self.next_index += 1;

        let collapsed = node.is_dir() && self.scene.is_collapsed(node);
        let mut classes = String::from(if node.is_dir() { "node directory" } else { "node file" });
        if !matches!(node.status, NodeStatus::Complete) {
            classes.push_str(" partial");
        }
        if collapsed {
            classes.push_str(" collapsed");
        }

        self.output.push_str(&format!(
            "{indent}<g class=\"{classes}\" id=\"tv-{index}\" data-node-id=\"{id}\" data-path=\"{path}\"",
            id = xml_escape(node.id.as_str()),
            path = xml_escape(&node.path.to_string_lossy()),
        ));
        if node.is_dir() {
            self.output
                .push_str(&format!(" data-collapsed=\"{}\"", collapsed));
        }
        self.output.push_str(">\n");

        self.output.push_str(&format!("{indent}  <g class=\"node-self\">\n"));
        self.output.push_str(&format!(
            "{indent}    {}\n",
            self.shape(geometry)
        ));
        let (tx, ty, anchor) = self.label_anchor(geometry);
        self.output.push_str(&format!(
            "{indent}    <text x=\"{}\" y=\"{}\" text-anchor=\"{}\">{}</text>\n",
            num(tx),
            num(ty),
            anchor,
            xml_escape(&label(node, self.scene.config.show_sizes))
        ));
        self.output.push_str(&format!(
            "{indent}    <title>{}</title>\n",
            xml_escape(&tooltip(node))
        ));
        self.output.push_str(&format!("{indent}  </g>\n"));

        if node.is_dir() {
            let style = if collapsed { " style=\"display:none\"" } else { "" };
            self.output
                .push_str(&format!("{indent}  <g class=\"subtree\"{style}>\n"));
            for child in node.children() {
                let cg = self.scene.geometry_of(child)?;
                self.output.push_str(&format!(
                    "{indent}    <path class=\"edge\" data-source=\"{}\" data-target=\"{}\" d=\"{}\"/>\n",
                    xml_escape(node.id.as_str()),
                    xml_escape(child.id.as_str()),
                    self.edge_path(geometry.position, cg.position)
                ));
            }
            for child in node.children() {
                self.write_node(child, level + 2)?;
            }
            self.output.push_str(&format!("{indent}  </g>\n"));
        }

        self.output.push_str(&format!("{indent}</g>\n"));
        Ok(())
    }

    fn shape(&self, g: &Geometry) -> String {
        match g.extent {
            Extent::Radius { radius } => format!(
                "<circle class=\"shape\" cx=\"{}\" cy=\"{}\" r=\"{}\"/>",
                num(g.position.x),
                num(g.position.y),
                num(radius)
            ),
            Extent::Rect { width, height } => format!(
                "<rect class=\"shape\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                num(g.position.x - width / 2.0),
                num(g.position.y - height / 2.0),
                num(width),
                num(height)
            ),
            Extent::Arc {
                inner_radius,
                outer_radius,
            } => {
                let range = g.angle_range.unwrap_or(AngleRange::FULL);
                format!(
                    "<path class=\"shape\" d=\"{}\"/>",
                    arc_path(
                        self.scene.geometry.center,
                        inner_radius,
                        outer_radius,
                        range.start,
                        range.end
                    )
                )
            }
        }
    }

    fn label_anchor(&self, g: &Geometry) -> (f64, f64, &'static str) {
        let font = self.scene.config.theme.font_size;
        match g.extent {
            Extent::Radius { radius } => (g.position.x, g.position.y + radius + font, "middle"),
            Extent::Rect { width, height } => (
                g.position.x - width / 2.0 + 3.0,
                g.position.y - height / 2.0 + font,
                "start",
            ),
            Extent::Arc { .. } => (g.position.x, g.position.y + font / 3.0, "middle"),
        }
    }

    fn edge_path(&self, from: Point, to: Point) -> String {
        match self.scene.geometry.strategy {
            // Elbow connector between levels
            LayoutStrategy::Tree => {
                let mid = (from.y + to.y) / 2.0;
                format!(
                    "M{} {} C{} {} {} {} {} {}",
                    num(from.x),
                    num(from.y),
                    num(from.x),
                    num(mid),
                    num(to.x),
                    num(mid),
                    num(to.x),
                    num(to.y)
                )
            }
            _ => format!(
                "M{} {} L{} {}",
                num(from.x),
                num(from.y),
                num(to.x),
                num(to.y)
            ),
        }
    }
}

/// SVG path for an annular sector, clockwise from 12 o'clock.
fn arc_path(center: Point, inner: f64, outer: f64, start: f64, end: f64) -> String {
    let span = end - start;
    if span <= EPSILON {
        let p = center.polar(outer, start);
        return format!("M{} {}", num(p.x), num(p.y));
    }
    if span >= TAU - EPSILON {
        // Full ring: two half arcs per circle, inner one reversed to cut the hole
        let top = center.polar(outer, 0.0);
        let bottom = center.polar(outer, TAU / 2.0);
        let mut d = format!(
            "M{} {} A{r} {r} 0 1 1 {} {} A{r} {r} 0 1 1 {} {} Z",
            num(top.x),
            num(top.y),
            num(bottom.x),
            num(bottom.y),
            num(top.x),
            num(top.y),
            r = num(outer)
        );
        if inner > EPSILON {
            let itop = center.polar(inner, 0.0);
            let ibottom = center.polar(inner, TAU / 2.0);
            d.push_str(&format!(
                " M{} {} A{r} {r} 0 1 0 {} {} A{r} {r} 0 1 0 {} {} Z",
                num(itop.x),
                num(itop.y),
                num(ibottom.x),
                num(ibottom.y),
                num(itop.x),
                num(itop.y),
                r = num(inner)
            ));
        }
        return d;
    }

    let large = if span > TAU / 2.0 { 1 } else { 0 };
    let o0 = center.polar(outer, start);
    let o1 = center.polar(outer, end);
    let mut d = format!(
        "M{} {} A{r} {r} 0 {large} 1 {} {}",
        num(o0.x),
        num(o0.y),
        num(o1.x),
        num(o1.y),
        r = num(outer),
        large = large
    );
    if inner > EPSILON {
        let i1 = center.polar(inner, end);
        let i0 = center.polar(inner, start);
        d.push_str(&format!(
            " L{} {} A{r} {r} 0 {large} 0 {} {} Z",
            num(i1.x),
            num(i1.y),
            num(i0.x),
            num(i0.y),
            r = num(inner),
            large = large
        ));
    } else {
        d.push_str(&format!(" L{} {} Z", num(center.x), num(center.y)));
    }
    d
}
