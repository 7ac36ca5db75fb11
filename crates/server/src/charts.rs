//! Inline SVG charts for the analytics and results pages

use breedmatch_common::schema::TRAIT_MAX;
use breedmatch_common::{Trait, TraitScores};
use breedmatch_vector::{BreedRecord, Dataset, Recommendation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write;

use crate::analytics::{self, SUMMARY_TRAITS};

const PALETTE: [&str; 9] = [
    "#f77189", "#d58c32", "#a4a031", "#50b131", "#36ada4", "#38a9c5", "#6e9bf4", "#cc7af4", "#f565cc",
];
const SCALE_MAX: f64 = TRAIT_MAX as f64;

const SIZE_COLORS: [&str; 5] = ["#FF6B6B", "#FFA07A", "#4ECDC4", "#45B7D1", "#95E1D3"];
const SIZE_LABELS: [&str; 5] = ["Very small", "Small", "Medium", "Large", "Very large"];
const RADAR_COLORS: [&str; 4] = ["#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A"];

/// Breeds compared on the radar chart, in order of preference; names from
/// both the AKC table and the built-in dataset are listed
const RADAR_CANDIDATES: [&str; 8] = [
    "Retrievers (Labrador)",
    "Labrador Retriever",
    "German Shepherd Dogs",
    "German Shepherd",
    "Bulldogs",
    "French Bulldog",
    "Yorkshire Terriers",
    "Yorkshire Terrier",
];
const RADAR_TRAITS: [Trait; 6] = [
    Trait::EnergyLevel,
    Trait::Trainability,
    Trait::GoodWithKids,
    Trait::ExerciseNeeds,
    Trait::BarkingTendency,
    Trait::WatchdogAbility,
];

/// Minimal SVG document writer
struct Svg {
    width: f64,
    height: f64,
    body: String,
}

impl Svg {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, w.max(0.0), h.max(0.0), fill
        );
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let _ = write!(
            self.body,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            x1, y1, x2, y2, stroke
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        let _ = write!(
            self.body,
            r##"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="{:.2}" stroke="#333" stroke-width="0.5"/>"##,
            cx, cy, r, fill, opacity
        );
    }

    fn polygon(&mut self, points: &[(f64, f64)], color: &str, fill_opacity: f64) {
        let pts: Vec<String> = points.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect();
        let _ = write!(
            self.body,
            r#"<polygon points="{}" fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="2"/>"#,
            pts.join(" "),
            color,
            fill_opacity,
            color
        );
    }

    fn path(&mut self, d: &str, fill: &str) {
        let _ = write!(self.body, r##"<path d="{}" fill="{}" stroke="#fff" stroke-width="2"/>"##, d, fill);
    }

    fn text(&mut self, x: f64, y: f64, size: f64, anchor: &str, content: &str) {
        let _ = write!(
            self.body,
            r#"<text x="{:.1}" y="{:.1}" font-size="{}" text-anchor="{}">{}</text>"#,
            x,
            y,
            size,
            anchor,
            escape(content)
        );
    }

    fn title(&mut self, content: &str) {
        let x = self.width / 2.0;
        self.text(x, 24.0, 16.0, "middle", content);
    }

    fn finish(self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="100%" font-family="sans-serif">{body}</svg>"#,
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Piecewise linear color ramp over `stops`, `t` in [0, 1]
fn ramp(stops: &[(u8, u8, u8)], t: f64) -> String {
    let t = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let i = (t.floor() as usize).min(stops.len() - 2);
    let f = t - i as f64;
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    let (a, b) = (stops[i], stops[i + 1]);
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn viridis(t: f64) -> String {
    ramp(
        &[(68, 1, 84), (59, 82, 139), (33, 145, 140), (94, 201, 98), (253, 231, 37)],
        t,
    )
}

/// Blue for -1, white for 0, red for +1
fn coolwarm(r: f64) -> String {
    ramp(&[(59, 76, 192), (221, 221, 221), (180, 4, 38)], (r + 1.0) / 2.0)
}

/// Histogram of every non-size trait on a 3 x 3 grid
pub fn feature_distributions(dataset: &Dataset) -> String {
    let (cell_w, cell_h) = (300.0, 220.0);
    let mut svg = Svg::new(cell_w * 3.0, cell_h * 3.0 + 40.0);
    svg.title("Distribution of breed characteristics");

    for (idx, &t) in SUMMARY_TRAITS.iter().enumerate() {
        let ox = (idx % 3) as f64 * cell_w;
        let oy = 40.0 + (idx / 3) as f64 * cell_h;
        let counts = analytics::value_counts(dataset, t);
        let max = counts.values().copied().max().unwrap_or(1).max(1) as f64;

        let (left, bottom, plot_h, bar_w) = (ox + 30.0, oy + cell_h - 40.0, cell_h - 80.0, 40.0);
        svg.line(left, bottom, left + 5.0 * (bar_w + 10.0), bottom, "#999");
        for score in 1..=5u8 {
            let x = left + f64::from(score - 1) * (bar_w + 10.0) + 5.0;
            let count = counts.get(&score).copied().unwrap_or(0);
            let h = count as f64 / max * plot_h;
            svg.rect(x, bottom - h, bar_w, h, PALETTE[idx]);
            svg.text(x + bar_w / 2.0, bottom - h - 4.0, 10.0, "middle", &count.to_string());
            svg.text(x + bar_w / 2.0, bottom + 14.0, 10.0, "middle", &score.to_string());
        }
        svg.text(ox + cell_w / 2.0, bottom + 30.0, 12.0, "middle", &t.label());
    }
    svg.finish()
}

/// Annotated heatmap of a correlation matrix; undefined cells are grey
pub fn correlation_heatmap(traits: &[Trait], matrix: &[Vec<Option<f64>>]) -> String {
    let cell = 60.0;
    let margin = 150.0;
    let size = margin + cell * traits.len() as f64 + 20.0;
    let mut svg = Svg::new(size, size + 20.0);
    svg.title("Correlation between characteristics");

    for (i, t) in traits.iter().enumerate() {
        let offset = margin + cell * i as f64 + cell / 2.0;
        svg.text(margin - 8.0, offset + 4.0, 11.0, "end", &t.label());
        svg.text(offset, margin - 8.0, 9.0, "middle", &t.label());
    }
    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let (x, y) = (margin + cell * j as f64, margin + cell * i as f64);
            match value {
                Some(r) => {
                    svg.rect(x, y, cell - 1.0, cell - 1.0, &coolwarm(*r));
                    svg.text(x + cell / 2.0, y + cell / 2.0 + 4.0, 11.0, "middle", &format!("{:.2}", r));
                }
                None => {
                    svg.rect(x, y, cell - 1.0, cell - 1.0, "#bbbbbb");
                    svg.text(x + cell / 2.0, y + cell / 2.0 + 4.0, 11.0, "middle", "n/a");
                }
            }
        }
    }
    svg.finish()
}

/// Pie chart of breeds per size score
pub fn size_pie(distribution: &BTreeMap<u8, usize>) -> String {
    let mut svg = Svg::new(600.0, 420.0);
    svg.title("Breed size distribution");

    let total: usize = distribution.values().sum();
    let (cx, cy, r) = (220.0, 220.0, 160.0);
    if total == 0 {
        return svg.finish();
    }

    let mut angle = -PI / 2.0;
    for (row, (&size, &count)) in distribution.iter().enumerate() {
        let idx = usize::from(size.clamp(1, 5) - 1);
        let sweep = count as f64 / total as f64 * 2.0 * PI;

        if count == total {
            svg.circle(cx, cy, r, SIZE_COLORS[idx], 1.0);
        } else {
            let (x1, y1) = (cx + r * angle.cos(), cy + r * angle.sin());
            let end = angle + sweep;
            let (x2, y2) = (cx + r * end.cos(), cy + r * end.sin());
            let large = if sweep > PI { 1 } else { 0 };
            let d = format!(
                "M {:.1} {:.1} L {:.1} {:.1} A {r} {r} 0 {} 1 {:.1} {:.1} Z",
                cx, cy, x1, y1, large, x2, y2
            );
            svg.path(&d, SIZE_COLORS[idx]);
        }

        let mid = angle + sweep / 2.0;
        let pct = count as f64 / total as f64 * 100.0;
        svg.text(cx + r * 0.65 * mid.cos(), cy + r * 0.65 * mid.sin() + 4.0, 13.0, "middle", &format!("{:.1}%", pct));

        let ly = 80.0 + row as f64 * 24.0;
        svg.rect(410.0, ly - 11.0, 14.0, 14.0, SIZE_COLORS[idx]);
        svg.text(430.0, ly, 12.0, "start", &format!("{}: {} breeds", SIZE_LABELS[idx], count));
        angle += sweep;
    }
    svg.finish()
}

/// Horizontal bars for the highest-scoring breeds, best on top
pub fn top_breeds_chart(t: Trait, rows: &[(String, u8)]) -> String {
    let bar_h = 28.0;
    let (left, width) = (220.0, 360.0);
    let mut svg = Svg::new(left + width + 60.0, 60.0 + bar_h * rows.len() as f64 + 30.0);
    svg.title(&format!("Top {} breeds - {}", rows.len(), t.label()));

    for (i, (breed, value)) in rows.iter().enumerate() {
        let y = 50.0 + i as f64 * bar_h;
        let w = f64::from(*value) / SCALE_MAX * width;
        svg.text(left - 8.0, y + bar_h / 2.0 + 4.0, 12.0, "end", breed);
        svg.rect(left, y + 3.0, w, bar_h - 6.0, &viridis(f64::from(*value) / SCALE_MAX));
        svg.text(left + w + 6.0, y + bar_h / 2.0 + 4.0, 12.0, "start", &format!("{:.1}", f64::from(*value)));
    }
    svg.finish()
}

/// Energy against trainability; radius follows size, color follows
/// good_with_kids
pub fn energy_trainability_scatter(dataset: &Dataset) -> String {
    let (left, top, plot) = (60.0, 50.0, 400.0);
    let mut svg = Svg::new(left + plot + 140.0, top + plot + 60.0);
    svg.title("Energy vs trainability (color = good with kids, radius = size)");

    // axis range 0.5..5.5
    let project = |v: f64| (v - 0.5) / 5.0 * plot;
    for score in 1..=5u8 {
        let p = project(f64::from(score));
        svg.line(left + p, top, left + p, top + plot, "#e5e5e5");
        svg.line(left, top + plot - p, left + plot, top + plot - p, "#e5e5e5");
        svg.text(left + p, top + plot + 16.0, 11.0, "middle", &score.to_string());
        svg.text(left - 8.0, top + plot - p + 4.0, 11.0, "end", &score.to_string());
    }
    svg.text(left + plot / 2.0, top + plot + 40.0, 13.0, "middle", "Energy Level");
    svg.text(20.0, top + plot / 2.0, 13.0, "middle", "Trainability");

    for record in dataset.records() {
        let t = &record.traits;
        let x = left + project(f64::from(t.energy_level));
        let y = top + plot - project(f64::from(t.trainability));
        let color = viridis(f64::from(t.good_with_kids - 1) / 4.0);
        svg.circle(x, y, 4.0 + 2.5 * f64::from(t.size), &color, 0.6);
    }

    for score in 1..=5u8 {
        let y = top + 20.0 + f64::from(score - 1) * 22.0;
        svg.circle(left + plot + 30.0, y, 7.0, &viridis(f64::from(score - 1) / 4.0), 0.8);
        svg.text(left + plot + 45.0, y + 4.0, 11.0, "start", &format!("kids {}", score));
    }
    svg.finish()
}

/// Well-known breeds present in the dataset, at most four
pub fn radar_breeds(dataset: &Dataset) -> Vec<&BreedRecord> {
    RADAR_CANDIDATES
        .iter()
        .filter_map(|name| dataset.get(name))
        .take(RADAR_COLORS.len())
        .collect()
}

/// Overlaid trait profiles on a radar chart
pub fn radar_chart(breeds: &[&BreedRecord]) -> String {
    let (cx, cy, r) = (260.0, 270.0, 180.0);
    let mut svg = Svg::new(720.0, 520.0);
    svg.title("Profiles of popular breeds");

    let n = RADAR_TRAITS.len() as f64;
    let point = |i: usize, value: f64| {
        let a = -PI / 2.0 + 2.0 * PI * i as f64 / n;
        (cx + r * value / SCALE_MAX * a.cos(), cy + r * value / SCALE_MAX * a.sin())
    };

    for ring in 1..=5 {
        let pts: Vec<(f64, f64)> = (0..RADAR_TRAITS.len()).map(|i| point(i, f64::from(ring))).collect();
        svg.polygon(&pts, "#cccccc", 0.0);
    }
    for (i, t) in RADAR_TRAITS.iter().enumerate() {
        let (x, y) = point(i, SCALE_MAX);
        svg.line(cx, cy, x, y, "#cccccc");
        let (lx, ly) = point(i, SCALE_MAX + 0.6);
        svg.text(lx, ly + 4.0, 11.0, "middle", &t.label());
    }

    for (idx, breed) in breeds.iter().enumerate() {
        let color = RADAR_COLORS[idx % RADAR_COLORS.len()];
        let pts: Vec<(f64, f64)> = RADAR_TRAITS
            .iter()
            .enumerate()
            .map(|(i, &t)| point(i, f64::from(breed.traits.get(t))))
            .collect();
        svg.polygon(&pts, color, 0.15);

        let ly = 70.0 + idx as f64 * 24.0;
        svg.rect(500.0, ly - 11.0, 14.0, 14.0, color);
        svg.text(520.0, ly, 12.0, "start", &breed.breed);
    }
    svg.finish()
}

/// Grouped bars of the user's preferences next to the best match
pub fn comparison_chart(user: &TraitScores, best: Option<&Recommendation>) -> String {
    let (left, top, plot_h, group) = (50.0, 60.0, 260.0, 64.0);
    let mut svg = Svg::new(left + group * Trait::ALL.len() as f64 + 20.0, top + plot_h + 90.0);
    svg.title("Your profile vs the recommended breed");

    let bottom = top + plot_h;
    for score in 1..=5u8 {
        let y = bottom - f64::from(score) / SCALE_MAX * plot_h;
        svg.line(left, y, left + group * Trait::ALL.len() as f64, y, "#e5e5e5");
        svg.text(left - 6.0, y + 4.0, 10.0, "end", &score.to_string());
    }

    for (i, &t) in Trait::ALL.iter().enumerate() {
        let x = left + group * i as f64 + 8.0;
        let h = f64::from(user.get(t)) / SCALE_MAX * plot_h;
        svg.rect(x, bottom - h, 22.0, h, "skyblue");
        if let Some(best) = best {
            let h = f64::from(best.characteristics.get(t)) / SCALE_MAX * plot_h;
            svg.rect(x + 24.0, bottom - h, 22.0, h, "lightcoral");
        }
        svg.text(x + 23.0, bottom + 16.0, 9.0, "middle", &t.label());
    }

    svg.rect(left, bottom + 40.0, 14.0, 14.0, "skyblue");
    svg.text(left + 20.0, bottom + 52.0, 12.0, "start", "Your profile");
    if let Some(best) = best {
        svg.rect(left + 160.0, bottom + 40.0, 14.0, 14.0, "lightcoral");
        svg.text(left + 180.0, bottom + 52.0, 12.0, "start", &best.breed);
    }
    svg.finish()
}

/// Every chart of the analytics page
///
/// The dataset never changes while serving, so the set is rendered once.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsCharts {
    pub distributions: String,
    pub correlation: String,
    pub size_pie: String,
    pub top_energy: String,
    pub top_trainability: String,
    pub scatter: String,
    /// Absent when none of the well-known breeds is in the dataset
    pub radar: Option<String>,
}

impl AnalyticsCharts {
    pub fn build(dataset: &Dataset) -> Self {
        let correlation = analytics::correlation_matrix(dataset, &SUMMARY_TRAITS);
        let radar = radar_breeds(dataset);

        Self {
            distributions: feature_distributions(dataset),
            correlation: correlation_heatmap(&SUMMARY_TRAITS, &correlation),
            size_pie: size_pie(&analytics::value_counts(dataset, Trait::Size)),
            top_energy: top_breeds_chart(
                Trait::EnergyLevel,
                &analytics::top_breeds(dataset, Trait::EnergyLevel, 10),
            ),
            top_trainability: top_breeds_chart(
                Trait::Trainability,
                &analytics::top_breeds(dataset, Trait::Trainability, 10),
            ),
            scatter: energy_trainability_scatter(dataset),
            radar: (!radar.is_empty()).then(|| radar_chart(&radar)),
        }
    }
}
